//! Application error types
//!
//! No error here is fatal to the process: backend errors surface as
//! transient notices, decode problems degrade to safe defaults, and
//! validation errors block the one submission they belong to. The worst
//! case is a stale or empty view.

use hub_client::{ClientError, FeedError};

/// Application error enumeration
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Remote table operation failed
    #[error("Backend error: {0}")]
    Client(#[from] ClientError),

    /// Change feed failed
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    /// Guarded mutation did not complete in time; the gate was
    /// force-cleared
    #[error("Mutation timed out after {0} ms")]
    Timeout(u64),

    /// Pre-submission validation failed
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Entity missing from the local mirror
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

/// Result type for application operations
pub type AppResult<T> = Result<T, AppError>;
