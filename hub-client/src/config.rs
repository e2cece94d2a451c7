//! Client configuration

/// Client configuration for connecting to the hosted backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (e.g., "https://project.example.co")
    pub base_url: String,

    /// API key, sent as both `apikey` and bearer token
    pub api_key: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Change feed address (host:port of the push endpoint)
    pub feed_addr: Option<String>,

    /// Connect to the feed over TLS
    pub feed_tls: bool,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout: 30,
            feed_addr: None,
            feed_tls: false,
        }
    }

    /// Set the change feed address
    pub fn with_feed_addr(mut self, addr: impl Into<String>) -> Self {
        self.feed_addr = Some(addr.into());
        self
    }

    /// Connect to the change feed over TLS
    pub fn with_feed_tls(mut self, enabled: bool) -> Self {
        self.feed_tls = enabled;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }
}
