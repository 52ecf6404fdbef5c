//! Client configuration.
//!
//! Everything the adapter needs to reach a Docling Serve instance lives in
//! [`ClientConfig`], built via [`ClientConfig::builder()`]. The struct is
//! deliberately small: the adapter forwards requests, it does not own
//! conversion behaviour, so per-document knobs travel in the records instead.

use crate::error::{DoclingError, Result};
use serde::{Deserialize, Serialize};

/// Default Docling Serve base URL (the service's own default port).
pub const DEFAULT_ENDPOINT_URL: &str = "http://localhost:5001";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for a [`DoclingClient`](crate::client::DoclingClient).
///
/// # Example
/// ```rust
/// use docling_serve_client::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .endpoint_url("http://docling.internal:5001")
///     .timeout_secs(300)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the Docling Serve instance, without the `/v1/...` path.
    /// Default: `http://localhost:5001`.
    ///
    /// The `/v1/convert/source` or `/v1/convert/file` path is appended per
    /// request depending on the payload kind. Trailing slashes are trimmed
    /// at build time so the join stays predictable.
    pub endpoint_url: String,

    /// Per-request timeout in seconds. Default: 120.
    ///
    /// Docling Serve converts synchronously, so a large scanned PDF with OCR
    /// enabled can hold the connection open for minutes. Raise this before
    /// touching OCR settings if conversions time out.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint_url = url.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs.max(1);
        self
    }

    /// Build the configuration, validating the endpoint URL.
    pub fn build(mut self) -> Result<ClientConfig> {
        self.config.endpoint_url = normalize_endpoint(&self.config.endpoint_url)?;
        if self.config.timeout_secs == 0 {
            return Err(DoclingError::InvalidConfig(
                "Timeout must be at least 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Validate and normalise an endpoint base URL.
///
/// Accepts only `http://` / `https://` URLs with a non-empty host part and
/// returns the URL with surrounding whitespace and trailing slashes removed.
/// Also used for per-record endpoint overrides, so a bad override fails at
/// request construction rather than mid-batch inside the HTTP client.
pub fn normalize_endpoint(url: &str) -> Result<String> {
    let trimmed = url.trim();
    let rest = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"));
    match rest {
        None => Err(DoclingError::InvalidEndpointUrl {
            url: trimmed.to_string(),
            reason: "scheme must be http or https".into(),
        }),
        Some(host) if host.trim_matches('/').is_empty() => Err(DoclingError::InvalidEndpointUrl {
            url: trimmed.to_string(),
            reason: "missing host".into(),
        }),
        Some(_) => Ok(trimmed.trim_end_matches('/').to_string()),
    }
}
