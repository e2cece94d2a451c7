//! Hub Client - typed client for the hosted backend
//!
//! Provides REST table operations against the backend's row API and the
//! realtime change feed used to keep local mirrors live.

pub mod config;
pub mod error;
pub mod feed;
pub mod http;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use feed::{ChangeFeed, FeedError};
pub use http::{RestTableClient, TableClient};

// Re-export shared types for convenience
pub use shared::feed::{ChangeEvent, ChangeKind};
