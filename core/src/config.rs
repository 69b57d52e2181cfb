//! Client Configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Default endpoint of the assistant service.
pub const DEFAULT_URL: &str = "ws://localhost:3001";

/// Connection settings for a [`Session`](crate::Session).
///
/// Environment variables:
/// - `CHATLINK_URL`: `ws://` or `wss://` endpoint address
/// - `CHATLINK_AUTOCONNECT`: "0" or "false" to keep interactive hosts from
///   connecting at startup
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Endpoint address; the scheme must be `ws` or `wss`.
    pub url: String,

    /// Whether an interactive host should connect immediately at startup.
    ///
    /// Consumed by hosts, not by the session itself.
    pub auto_connect: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            auto_connect: true,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything unset.
    #[must_use]
    pub fn from_env() -> Self {
        let url = std::env::var("CHATLINK_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        let auto_connect = std::env::var("CHATLINK_AUTOCONNECT")
            .map(|v| v != "0" && v.to_lowercase() != "false")
            .unwrap_or(true);
        Self { url, auto_connect }
    }

    /// Parse and validate the endpoint address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] when the address does not parse,
    /// or [`ConfigError::UnsupportedScheme`] when the scheme is not a
    /// WebSocket scheme.
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.url).map_err(|source| ConfigError::InvalidUrl {
            url: self.url.clone(),
            source,
        })?;
        match url.scheme() {
            "ws" | "wss" => Ok(url),
            other => Err(ConfigError::UnsupportedScheme {
                scheme: other.to_string(),
            }),
        }
    }
}

/// Errors from configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The endpoint address does not parse as a URL.
    #[error("invalid endpoint url {url:?}: {source}")]
    InvalidUrl {
        /// The offending address.
        url: String,
        /// Underlying parse failure.
        source: url::ParseError,
    },

    /// The endpoint scheme is not `ws` or `wss`.
    #[error("unsupported endpoint scheme {scheme:?} (expected ws or wss)")]
    UnsupportedScheme {
        /// The offending scheme.
        scheme: String,
    },
}
