//! Realtime change feed
//!
//! An owned subscription resource with an explicit lifecycle: [`ChangeFeed::open`]
//! connects and spawns the reader task, [`ChangeFeed::subscribe`] hands out
//! receivers, [`ChangeFeed::close`] cancels the reader and releases the
//! connection. Events are re-broadcast strictly in arrival order; lagged
//! subscribers observe `RecvError::Lagged` and should refetch.

pub mod transport;

use std::sync::Arc;

use shared::feed::ChangeEvent;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
pub use transport::{FeedTransport, MemoryTransport, TcpTransport, TlsTransport};

/// Capacity of the event broadcast channel
const CHANNEL_CAPACITY: usize = 1024;

/// Feed error type
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Feed closed")]
    Closed,

    #[error("Feed not configured: {0}")]
    NotConfigured(String),
}

/// Realtime change feed handle
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    events_tx: broadcast::Sender<ChangeEvent>,
    shutdown: CancellationToken,
}

impl ChangeFeed {
    /// Connect to the configured feed endpoint and start the reader task
    pub async fn open(config: &ClientConfig) -> Result<Self, FeedError> {
        let addr = config
            .feed_addr
            .as_deref()
            .ok_or_else(|| FeedError::NotConfigured("feed_addr is not set".to_string()))?;

        let transport: Arc<dyn FeedTransport> = if config.feed_tls {
            Arc::new(TlsTransport::connect(addr).await?)
        } else {
            Arc::new(TcpTransport::connect(addr).await?)
        };
        Ok(Self::with_transport(transport))
    }

    /// Start a feed over an already-connected transport
    pub fn with_transport(transport: Arc<dyn FeedTransport>) -> Self {
        let (events_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let shutdown = CancellationToken::new();

        let feed = Self {
            events_tx: events_tx.clone(),
            shutdown: shutdown.clone(),
        };

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    result = transport.read_event() => match result {
                        Ok(event) => {
                            // No receivers is fine; events before the first
                            // subscribe are simply dropped.
                            let _ = events_tx.send(event);
                        }
                        Err(FeedError::Decode(e)) => {
                            // A malformed frame degrades to a skipped event,
                            // not a dead feed.
                            tracing::debug!(error = %e, "skipping undecodable feed frame");
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "change feed reader stopped");
                            break;
                        }
                    }
                }
            }
            if let Err(e) = transport.close().await {
                tracing::warn!(error = %e, "error closing feed transport");
            }
        });

        feed
    }

    /// Subscribe to the event stream (arrival order preserved)
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events_tx.subscribe()
    }

    /// Stop the reader task and release the connection
    pub fn close(&self) {
        self.shutdown.cancel();
    }
}
