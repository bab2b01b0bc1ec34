use std::future::Future;

use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::LoginError;
use crate::models::User;
use crate::session::SessionStore;

pub const ALLOWED_NAMES: [&str; 2] = ["Amit", "Kiper"];

/// Where login looks users up. Implemented by `Database`.
pub trait UserDirectory {
    fn find_user_by_name(&self, name: &str) -> impl Future<Output = anyhow::Result<Option<User>>> + Send;
    fn find_user_by_id(&self, id: Uuid) -> impl Future<Output = anyhow::Result<Option<User>>> + Send;
}

pub fn validate_credentials(name: &str, password: &str, configured: &str) -> Result<(), LoginError> {
    if name.trim().is_empty() {
        return Err(LoginError::MissingName);
    }
    if password.is_empty() {
        return Err(LoginError::MissingPassword);
    }
    if password != configured {
        return Err(LoginError::IncorrectPassword);
    }
    if !ALLOWED_NAMES.contains(&name.trim()) {
        return Err(LoginError::NameNotAllowed);
    }
    Ok(())
}

/// Checks the credentials, resolves the existing user and remembers them.
/// Users are never created here.
pub async fn login<D: UserDirectory>(
    directory: &D,
    session: &SessionStore,
    name: &str,
    password: &str,
    configured: &str,
) -> Result<User, LoginError> {
    validate_credentials(name, password, configured)?;

    let user = match directory.find_user_by_name(name.trim()).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(LoginError::UserNotFound),
        Err(e) => {
            warn!(error = %e, "user lookup failed");
            return Err(LoginError::Unavailable);
        }
    };

    if let Err(e) = session.store(user.id) {
        warn!(error = %e, "could not persist session");
        return Err(LoginError::Unavailable);
    }
    info!(user = %user.name, "logged in");
    Ok(user)
}

/// The user from the stored session, if it still resolves
pub async fn restore<D: UserDirectory>(directory: &D, session: &SessionStore) -> anyhow::Result<Option<User>> {
    let Some(id) = session.load()? else {
        return Ok(None);
    };
    let user = directory.find_user_by_id(id).await?;
    if user.is_none() {
        warn!(%id, "stored session points at a missing user");
    }
    Ok(user)
}

pub fn logout(session: &SessionStore) -> anyhow::Result<()> {
    session.clear()?;
    info!("logged out");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_order() {
        assert_eq!(validate_credentials("", "", "pw"), Err(LoginError::MissingName));
        assert_eq!(validate_credentials("Amit", "", "pw"), Err(LoginError::MissingPassword));
        assert_eq!(validate_credentials("Bob", "wrong", "pw"), Err(LoginError::IncorrectPassword));
        assert_eq!(validate_credentials("Bob", "pw", "pw"), Err(LoginError::NameNotAllowed));
        assert_eq!(validate_credentials("amit", "pw", "pw"), Err(LoginError::NameNotAllowed));
        assert_eq!(validate_credentials("Kiper", "pw", "pw"), Ok(()));
        assert_eq!(validate_credentials(" Amit ", "pw", "pw"), Ok(()));
    }
}
