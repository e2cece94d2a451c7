use chrono_tz::Tz;
use hub_client::ClientConfig;

/// Dashboard configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | BACKEND_URL | http://localhost:54321 | Hosted backend base URL |
/// | BACKEND_API_KEY | (empty) | API key for the row API |
/// | FEED_ADDR | (unset) | Change feed address (host:port) |
/// | FEED_TLS | false | Connect to the feed over TLS |
/// | BUSINESS_TZ | Asia/Kolkata | Timezone for the revenue day key |
/// | MUTATION_TIMEOUT_MS | 10000 | Timeout for one guarded remote mutation |
/// | NOTICE_TTL_MS | 3000 | Lifetime of a transient operator notice |
/// | REQUEST_TIMEOUT_SECS | 30 | HTTP request timeout |
/// | LOG_LEVEL | info | Log level |
/// | LOG_DIR | (unset) | Directory for daily-rolling log files |
#[derive(Debug, Clone)]
pub struct Config {
    /// Hosted backend base URL
    pub backend_url: String,
    /// API key for the row API
    pub api_key: String,
    /// Change feed address (host:port)
    pub feed_addr: Option<String>,
    /// Connect to the feed over TLS
    pub feed_tls: bool,
    /// Business timezone, used when computing the revenue day key
    pub business_tz: Tz,
    /// Timeout for one guarded remote mutation (milliseconds)
    pub mutation_timeout_ms: u64,
    /// Lifetime of a transient operator notice (milliseconds)
    pub notice_ttl_ms: u64,
    /// HTTP request timeout (seconds)
    pub request_timeout_secs: u64,
    /// Log level: trace | debug | info | warn | error
    pub log_level: String,
    /// Directory for daily-rolling log files
    pub log_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:54321".into(),
            api_key: String::new(),
            feed_addr: None,
            feed_tls: false,
            business_tz: chrono_tz::Asia::Kolkata,
            mutation_timeout_ms: 10_000,
            notice_ttl_ms: 3_000,
            request_timeout_secs: 30,
            log_level: "info".into(),
            log_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset
    pub fn from_env() -> Self {
        Self {
            backend_url: std::env::var("BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:54321".into()),
            api_key: std::env::var("BACKEND_API_KEY").unwrap_or_default(),
            feed_addr: std::env::var("FEED_ADDR").ok(),
            feed_tls: std::env::var("FEED_TLS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            business_tz: std::env::var("BUSINESS_TZ")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(chrono_tz::Asia::Kolkata),
            mutation_timeout_ms: std::env::var("MUTATION_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            notice_ttl_ms: std::env::var("NOTICE_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3_000),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    /// Client configuration for the hosted backend
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(&self.backend_url, &self.api_key)
            .with_timeout(self.request_timeout_secs)
            .with_feed_tls(self.feed_tls);
        if let Some(ref addr) = self.feed_addr {
            config = config.with_feed_addr(addr);
        }
        config
    }

}
