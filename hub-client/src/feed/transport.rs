//! Feed transport implementations
//!
//! The change feed arrives as length-prefixed JSON frames: a `u32` little-
//! endian payload length followed by one serialized [`ChangeEvent`]. The
//! subscription is read-only; this side never writes frames.

use std::sync::Arc;

use async_trait::async_trait;
use rustls_pki_types::ServerName;
use shared::feed::ChangeEvent;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, broadcast};
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;

use super::FeedError;

/// Transport abstraction for the change feed
#[async_trait]
pub trait FeedTransport: Send + Sync + std::fmt::Debug {
    async fn read_event(&self) -> Result<ChangeEvent, FeedError>;
    async fn close(&self) -> Result<(), FeedError>;
}

async fn read_frame<R>(reader: &mut R) -> Result<ChangeEvent, FeedError>
where
    R: tokio::io::AsyncRead + Unpin,
{
    // Read payload length (4 bytes)
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await.map_err(FeedError::Io)?;
    let len = u32::from_le_bytes(len_buf) as usize;

    // Read payload
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await.map_err(FeedError::Io)?;

    serde_json::from_slice(&payload).map_err(FeedError::Decode)
}

/// TCP Transport Implementation
#[derive(Debug)]
pub struct TcpTransport {
    reader: Mutex<TcpStream>,
}

impl TcpTransport {
    pub async fn connect(addr: &str) -> Result<Self, FeedError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| FeedError::Connection(e.to_string()))?;
        Ok(Self {
            reader: Mutex::new(stream),
        })
    }
}

#[async_trait]
impl FeedTransport for TcpTransport {
    async fn read_event(&self) -> Result<ChangeEvent, FeedError> {
        let mut reader = self.reader.lock().await;
        read_frame(&mut *reader).await
    }

    async fn close(&self) -> Result<(), FeedError> {
        // Dropping the stream closes the connection
        Ok(())
    }
}

/// TLS Transport Implementation
#[derive(Debug)]
pub struct TlsTransport {
    reader: Mutex<TlsStream<TcpStream>>,
}

impl TlsTransport {
    pub async fn connect(addr: &str) -> Result<Self, FeedError> {
        let host = addr.rsplit_once(':').map(|(h, _)| h).unwrap_or(addr);

        let mut root_store = rustls::RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let connector = TlsConnector::from(Arc::new(config));
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| FeedError::Connection(e.to_string()))?;

        let domain = ServerName::try_from(host.to_string())
            .map_err(|e| FeedError::Connection(format!("Invalid domain: {}", e)))?;

        let stream = connector
            .connect(domain, stream)
            .await
            .map_err(|e| FeedError::Connection(format!("TLS handshake failed: {}", e)))?;

        Ok(Self {
            reader: Mutex::new(stream),
        })
    }
}

#[async_trait]
impl FeedTransport for TlsTransport {
    async fn read_event(&self) -> Result<ChangeEvent, FeedError> {
        let mut reader = self.reader.lock().await;
        read_frame(&mut *reader).await
    }

    async fn close(&self) -> Result<(), FeedError> {
        Ok(())
    }
}

/// In-process memory transport
///
/// Backed by a tokio broadcast channel; used by tests and by in-process
/// event sources. Lagged receivers skip to the next available event.
#[derive(Debug)]
pub struct MemoryTransport {
    rx: Mutex<broadcast::Receiver<ChangeEvent>>,
}

impl MemoryTransport {
    /// Create from an event sender (subscribes immediately)
    pub fn new(tx: &broadcast::Sender<ChangeEvent>) -> Self {
        Self {
            rx: Mutex::new(tx.subscribe()),
        }
    }
}

#[async_trait]
impl FeedTransport for MemoryTransport {
    async fn read_event(&self) -> Result<ChangeEvent, FeedError> {
        let mut rx = self.rx.lock().await;
        loop {
            match rx.recv().await {
                Ok(event) => return Ok(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "memory feed lagged, skipping ahead");
                }
                Err(broadcast::error::RecvError::Closed) => return Err(FeedError::Closed),
            }
        }
    }

    async fn close(&self) -> Result<(), FeedError> {
        Ok(())
    }
}
