mod common;

use common::{MemoryDirectory, PASSWORD};
use luzon::auth::{self, ALLOWED_NAMES};
use luzon::errors::LoginError;
use luzon::session::SessionStore;

fn session() -> (tempfile::TempDir, SessionStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("luzon").join("session"));
    (dir, store)
}

#[tokio::test]
async fn allowed_names_with_password_log_in_and_persist() {
    let directory = MemoryDirectory::with_users(&["Amit", "Kiper", "Guest"]);

    for name in ALLOWED_NAMES {
        let (_dir, store) = session();
        let user = auth::login(&directory, &store, name, PASSWORD, PASSWORD).await.unwrap();

        assert_eq!(user.name, name);
        assert_eq!(store.load().unwrap(), Some(directory.id_of(name)));
    }
}

#[tokio::test]
async fn every_other_pair_fails_without_a_session() {
    let directory = MemoryDirectory::with_users(&["Amit", "Kiper", "Guest"]);
    let attempts = [
        ("", PASSWORD, LoginError::MissingName),
        ("Amit", "", LoginError::MissingPassword),
        ("Amit", "wrong", LoginError::IncorrectPassword),
        ("Guest", PASSWORD, LoginError::NameNotAllowed),
        ("kiper", PASSWORD, LoginError::NameNotAllowed),
    ];

    for (name, password, expected) in attempts {
        let (_dir, store) = session();
        let err = auth::login(&directory, &store, name, password, PASSWORD).await.unwrap_err();

        assert_eq!(err, expected, "{:?}/{:?}", name, password);
        assert!(!err.to_string().is_empty());
        assert_eq!(store.load().unwrap(), None);
    }
}

#[tokio::test]
async fn allowed_name_missing_from_directory_is_not_created() {
    let directory = MemoryDirectory::with_users(&["Amit"]);
    let (_dir, store) = session();

    let err = auth::login(&directory, &store, "Kiper", PASSWORD, PASSWORD).await.unwrap_err();

    assert_eq!(err, LoginError::UserNotFound);
    assert_eq!(err.to_string(), "User not found. Only Amit and Kiper can login.");
    assert_eq!(store.load().unwrap(), None);
}

#[tokio::test]
async fn restore_and_logout_round() {
    let directory = MemoryDirectory::with_users(&["Amit", "Kiper"]);
    let (_dir, store) = session();
    assert!(auth::restore(&directory, &store).await.unwrap().is_none());

    auth::login(&directory, &store, "Kiper", PASSWORD, PASSWORD).await.unwrap();
    let restored = auth::restore(&directory, &store).await.unwrap();
    assert_eq!(restored.map(|u| u.name), Some("Kiper".to_string()));

    auth::logout(&store).unwrap();
    assert!(auth::restore(&directory, &store).await.unwrap().is_none());
}
