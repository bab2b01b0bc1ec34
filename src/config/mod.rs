use std::path::PathBuf;

use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

use crate::hours::HoursWeighting;

/// Configuration for the application
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Shared access password checked at login
    pub app_password: String,

    /// Whether an event's hours are multiplied by its assignee count
    #[serde(default)]
    pub hours_weighting: HoursWeighting,

    /// Object store endpoint used for avatar uploads
    pub supabase_url: Option<String>,

    /// API key sent with object store requests
    pub supabase_key: Option<String>,

    #[serde(default = "default_avatar_bucket")]
    pub avatar_bucket: String,

    /// Base URL used when building shareable project links
    pub share_base_url: Option<String>,

    pub session_file: Option<PathBuf>,

    pub log_file: Option<PathBuf>,
}

fn default_avatar_bucket() -> String {
    "avatars".to_string()
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize environment variables into Config struct
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::from_env::<Config>()?;

        Ok(config)
    }

    /// Get a direct reference to the database URL
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Where the logged-in user id is kept between runs
    pub fn session_path(&self) -> PathBuf {
        self.session_file.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("luzon")
                .join("session")
        })
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("luzon")
                .join("luzon.log")
        })
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    dotenv().ok();

    let config = Config::load()?;

    Ok(config)
}
