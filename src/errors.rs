//! Domain errors. Database and terminal failures travel as `anyhow::Error`;
//! these are the failures the screens show to the user as inline messages.

use std::io;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    #[error("Please enter your name")]
    MissingName,

    #[error("Please enter the access password")]
    MissingPassword,

    #[error("Incorrect password")]
    IncorrectPassword,

    #[error("Only Amit and Kiper are allowed to login")]
    NameNotAllowed,

    #[error("User not found. Only Amit and Kiper can login.")]
    UserNotFound,

    #[error("Something went wrong. Please try again.")]
    Unavailable,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session file error: {0}")]
    Io(#[from] io::Error),

    #[error("Stored session is not a valid user id: {0}")]
    Corrupt(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Avatar storage is not configured")]
    NotConfigured,

    #[error("Could not read {path}: {source}")]
    Read { path: String, source: io::Error },

    #[error("Upload failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upload rejected with status {0}")]
    Rejected(u16),
}

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Change feed connection error: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("Malformed change payload: {0}")]
    Payload(#[from] serde_json::Error),
}
