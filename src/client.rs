//! HTTP client: one POST per request, verbatim relay of the reply.
//!
//! [`DoclingClient`] is the only place in the crate that touches the
//! network. It never inspects or re-shapes what the service returns beyond
//! parsing the body as JSON; whatever Docling Serve says is what the caller
//! gets.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::{DoclingError, Result};
use crate::payload::{file, source, ConversionRequest, RequestPayload};

/// The service's reply to one request.
#[derive(Debug, Clone)]
pub struct ConversionResponse {
    /// HTTP status the service answered with. Always 2xx here; other
    /// statuses surface as [`DoclingError::Api`] instead.
    pub status: u16,
    /// Parsed response body, relayed without re-shaping.
    pub body: Value,
}

/// Client for a Docling Serve instance.
///
/// Owns one connection pool; build it once and reuse it across a batch.
///
/// # Example
/// ```rust,no_run
/// use docling_serve_client::{ClientConfig, DoclingClient};
///
/// # async fn demo() -> docling_serve_client::Result<()> {
/// let client = DoclingClient::new(ClientConfig::default())?;
/// # Ok(())
/// # }
/// ```
pub struct DoclingClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl DoclingClient {
    /// Build a client from the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Forward one request and relay the service's reply.
    ///
    /// Exactly one POST is issued per call, against the request's own
    /// endpoint URL. Non-2xx replies become [`DoclingError::Api`] carrying
    /// the raw response text; client and server statuses are treated
    /// identically. A 2xx reply whose body is not JSON becomes
    /// [`DoclingError::InvalidResponseBody`].
    pub async fn convert(&self, request: &ConversionRequest) -> Result<ConversionResponse> {
        let url = request.url();
        info!(url = %url, "Forwarding conversion request");

        let builder = match &request.payload {
            RequestPayload::Source { urls, inline } => {
                let body = source::build_body(
                    &request.from_formats,
                    &request.to_formats,
                    &request.extra_options,
                    urls,
                    inline.as_ref(),
                );
                self.http.post(&url).json(&body)
            }
            RequestPayload::File(upload) => {
                let fields = file::build_form_fields(
                    &request.from_formats,
                    &request.to_formats,
                    &request.extra_options,
                    upload.clone(),
                );
                self.http.post(&url).multipart(fields.into_form()?)
            }
        };

        let resp = builder.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(DoclingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = resp.text().await?;
        let body: Value =
            serde_json::from_str(&text).map_err(|e| DoclingError::InvalidResponseBody {
                status: status.as_u16(),
                detail: e.to_string(),
            })?;
        debug!(status = status.as_u16(), "Conversion response received");
        Ok(ConversionResponse {
            status: status.as_u16(),
            body,
        })
    }
}
