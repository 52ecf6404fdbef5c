//! # docling-serve-client
//!
//! Forward document-conversion requests to a [Docling Serve] instance and
//! relay its responses.
//!
//! ## Why this crate?
//!
//! Document conversion is heavy: a converter that reads PDF, Office and
//! image formats drags in OCR, layout analysis and table-structure models.
//! Docling Serve hosts all of that behind a small HTTP API, so the natural
//! integration is a thin adapter that forwards work instead of embedding an
//! engine. This crate is that adapter: it collects per-record parameters,
//! builds the request shape the service expects (JSON for remote or embedded
//! sources, multipart for raw uploads), issues exactly one POST per record,
//! and relays the parsed response unmodified. Conversion semantics stay
//! entirely server-side.
//!
//! ## Request Flow
//!
//! ```text
//! record
//!  │
//!  ├─ 1. Resolve  apply defaults, read attachment bytes, parse options
//!  ├─ 2. Build    JSON body (source) or multipart form (file)
//!  ├─ 3. POST     {base}/v1/convert/source or {base}/v1/convert/file
//!  └─ 4. Relay    parsed response, verbatim, 1:1 with input records
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docling_serve_client::{
//!     ClientConfig, ConversionRecord, DoclingClient, RecordDefaults,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DoclingClient::new(ClientConfig::default())?;
//!     let record = ConversionRecord {
//!         source_urls: Some("https://example.com/paper.pdf".into()),
//!         ..Default::default()
//!     };
//!     let request = record.resolve(&RecordDefaults::default()).await?;
//!     let response = client.convert(&request).await?;
//!     println!("{}", response.body);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docling-convert` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! docling-serve-client = { version = "0.3", default-features = false }
//! ```
//!
//! [Docling Serve]: https://github.com/docling-project/docling-serve

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod payload;
pub mod record;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{run_batch, BatchProgress, NoopBatchProgress};
pub use client::{ConversionResponse, DoclingClient};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_ENDPOINT_URL, DEFAULT_TIMEOUT_SECS};
pub use error::{DoclingError, Result};
pub use format::{InputFormat, OutputFormat};
pub use payload::{ConversionRequest, FileSource, FileUpload, RequestPayload};
pub use record::{AdvancedOptions, ConversionRecord, EndpointKind, RecordDefaults};
