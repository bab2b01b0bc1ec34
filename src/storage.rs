use std::path::Path;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::StorageError;

/// Client for the hosted object store that keeps user avatars
#[derive(Debug, Clone)]
pub struct AvatarStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl AvatarStore {
    pub fn new(base_url: &str, api_key: &str, bucket: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            bucket: bucket.to_string(),
        }
    }

    /// `None` when the object store is not configured
    pub fn from_config(config: &Config) -> Option<Self> {
        match (&config.supabase_url, &config.supabase_key) {
            (Some(url), Some(key)) => Some(Self::new(url, key, &config.avatar_bucket)),
            _ => None,
        }
    }

    pub fn public_url(&self, file_name: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, self.bucket, file_name)
    }

    fn upload_url(&self, file_name: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, file_name)
    }

    /// Uploads `path` for `user_id` and returns its public URL
    pub async fn upload(&self, user_id: Uuid, path: &Path) -> Result<String, StorageError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| StorageError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let file_name = avatar_file_name(user_id, path, Utc::now().timestamp_millis());
        let response = self
            .http
            .post(self.upload_url(&file_name))
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .header("x-upsert", "true")
            .header("cache-control", "3600")
            .header(reqwest::header::CONTENT_TYPE, content_type(path).as_ref())
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StorageError::Rejected(response.status().as_u16()));
        }

        info!(%user_id, file = %file_name, "avatar uploaded");
        Ok(self.public_url(&file_name))
    }
}

/// `{user_id}-{millis}.{ext}`
pub fn avatar_file_name(user_id: Uuid, path: &Path, millis: i64) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}-{}.{}", user_id, millis, ext),
        None => format!("{}-{}", user_id, millis),
    }
}

pub fn content_type(path: &Path) -> mime::Mime {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => mime::IMAGE_PNG,
        Some("jpg") | Some("jpeg") => mime::IMAGE_JPEG,
        Some("gif") => mime::IMAGE_GIF,
        Some("svg") => mime::IMAGE_SVG,
        Some("bmp") => mime::IMAGE_BMP,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_keeps_extension() {
        let id = Uuid::nil();
        assert_eq!(
            avatar_file_name(id, Path::new("/home/amit/me.png"), 42),
            "00000000-0000-0000-0000-000000000000-42.png"
        );
        assert_eq!(
            avatar_file_name(id, Path::new("photo"), 7),
            "00000000-0000-0000-0000-000000000000-7"
        );
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(content_type(Path::new("a.PNG")), mime::IMAGE_PNG);
        assert_eq!(content_type(Path::new("a.jpeg")), mime::IMAGE_JPEG);
        assert_eq!(content_type(Path::new("a.webp")), mime::APPLICATION_OCTET_STREAM);
    }

    #[test]
    fn urls_are_built_from_base() {
        let store = AvatarStore::new("https://example.supabase.co/", "key", "avatars");
        assert_eq!(
            store.public_url("x.png"),
            "https://example.supabase.co/storage/v1/object/public/avatars/x.png"
        );
        assert_eq!(
            store.upload_url("x.png"),
            "https://example.supabase.co/storage/v1/object/avatars/x.png"
        );
    }
}
