// File: ./src/error.rs
//! Error taxonomy for the deadline engine.
//!
//! None of these are fatal: every one of them has a local recovery path
//! (unspecified instant, local fallback, empty tag set, default selection).
//! Application plumbing (config, context, CLI) uses `anyhow` instead.
use thiserror::Error;

/// A raw deadline expression could not be turned into an instant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),
    #[error("local time '{0}' does not exist in timezone {1}")]
    NonexistentLocalTime(String, String),
}

/// The remote deadline store could not deliver a usable payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("no remote store configured")]
    Offline,
    #[error("invalid remote url: {0}")]
    InvalidUrl(String),
    #[error("TLS setup failed: {0}")]
    Tls(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("remote store answered HTTP {0}")]
    Status(u16),
    #[error("remote store timed out after {0}s")]
    Timeout(u64),
    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// A record's `tags` field could not be decoded into a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed tags field: {0}")]
pub struct MalformedTagError(pub String);

/// Local key-value persistence failed.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored value under '{key}' is malformed: {reason}")]
    Malformed { key: String, reason: String },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub fn malformed(key: &str, reason: impl ToString) -> Self {
        Self::Malformed {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}
