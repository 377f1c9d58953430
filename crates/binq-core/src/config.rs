//! HTTP client configuration for one invocation.

use std::time::Duration;

use reqwest::Client;

use crate::USER_AGENT;

/// Environment variable naming the default index server.
pub const SERVER_ENV: &str = "BINQ_SERVER";

/// Index server used when neither `--server` nor [`SERVER_ENV`] is set.
pub const DEFAULT_SERVER: &str = "https://binqry.github.io/index/";

/// Timeouts and server location for index lookups and downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Index server base URL, without a trailing `/`.
    pub server: String,
    /// Whole-request limit for artifact downloads.
    pub download_timeout: Duration,
    /// Whole-request limit for index and item queries.
    pub index_timeout: Duration,
    /// TCP connect (and TLS handshake) limit.
    pub connect_timeout: Duration,
    /// How long an idle pooled connection is kept.
    pub idle_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: normalize_server(DEFAULT_SERVER),
            download_timeout: Duration::from_secs(300),
            index_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Default timeouts with the given server.
    ///
    /// A missing or blank server falls back to [`DEFAULT_SERVER`].
    pub fn new(server: Option<String>) -> Self {
        let server = server
            .map(|s| normalize_server(&s))
            .filter(|s| !s.is_empty());
        match server {
            Some(server) => Self {
                server,
                ..Self::default()
            },
            None => Self::default(),
        }
    }

    /// Client for artifact downloads.
    pub fn download_client(&self) -> reqwest::Result<Client> {
        self.build(self.download_timeout)
    }

    /// Client for index and item queries.
    pub fn index_client(&self) -> reqwest::Result<Client> {
        self.build(self.index_timeout)
    }

    fn build(&self, timeout: Duration) -> reqwest::Result<Client> {
        Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(self.connect_timeout)
            .pool_idle_timeout(self.idle_timeout)
            .build()
    }
}

fn normalize_server(server: &str) -> String {
    server.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_normalized() {
        let cfg = ClientConfig::new(Some("https://idx.example.com/".into()));
        assert_eq!(cfg.server, "https://idx.example.com");
        assert_eq!(cfg.download_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_unset_server_uses_default() {
        let fallback = "https://binqry.github.io/index";
        assert_eq!(ClientConfig::new(None).server, fallback);
        assert_eq!(ClientConfig::new(Some("  ".into())).server, fallback);
        assert_eq!(ClientConfig::default().server, fallback);
    }
}
