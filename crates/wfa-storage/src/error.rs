//! Storage error types.
//!
//! The specification recognizes two error kinds: *not-found*, which is
//! surfaced as `Option::None` rather than an error, and *backend-error*,
//! raised as [`StorageError`] so the caller (the engine, or an API
//! handler) decides whether to retry or fail.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
