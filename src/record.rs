//! Host-facing input records and their resolution into requests.
//!
//! A [`ConversionRecord`] is one unit of work as a host supplies it: a CLI
//! invocation, one entry of a JSON manifest, or a struct built in code.
//! Records are declarative and loosely typed (comma-separated URL lists,
//! free-form options, file paths); [`ConversionRecord::resolve`] turns one
//! into a validated [`ConversionRequest`] or fails before any HTTP traffic.
//!
//! Record fields are per-record overrides; anything left unset falls back to
//! the batch-wide [`RecordDefaults`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::{ClientConfig, DEFAULT_ENDPOINT_URL};
use crate::error::{DoclingError, Result};
use crate::format::{InputFormat, OutputFormat};
use crate::payload::source::split_urls;
use crate::payload::{
    options, ConversionRequest, FileSource, FileUpload, RequestPayload, DEFAULT_FILENAME,
};

/// Which convert endpoint a record targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    /// `/v1/convert/source`: JSON body, documents by URL or embedded base64.
    #[default]
    Source,
    /// `/v1/convert/file`: multipart body, document bytes uploaded directly.
    File,
}

/// One unit of conversion work, as supplied by a host.
///
/// All fields are optional in serialised form; a minimal source-mode record
/// is just `{"source_urls": "https://example.com/doc.pdf"}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionRecord {
    /// Endpoint selector. Default: [`EndpointKind::Source`].
    pub endpoint: EndpointKind,

    /// Per-record endpoint base URL, overriding the batch default.
    pub endpoint_url: Option<String>,

    /// Comma-separated document URLs (source mode).
    pub source_urls: Option<String>,

    /// Base64 document payload. In source mode it is embedded in the JSON
    /// body as-is; in file mode it is decoded and uploaded when no
    /// attachment is given.
    pub base64: Option<String>,

    /// Filename attached to the base64 payload. Default: `file.bin`.
    /// An attachment keeps its own filename; this field does not rename it.
    pub filename: Option<String>,

    /// Path to a local file to upload (file mode).
    pub attachment: Option<PathBuf>,

    /// Input formats the service should accept. Empty: batch default.
    pub from_formats: Vec<InputFormat>,

    /// Output formats to request. Empty: batch default.
    pub to_formats: Vec<OutputFormat>,

    /// Extra service options, either raw JSON text or an inline object.
    pub advanced_options: Option<AdvancedOptions>,
}

/// Free-form service options as they appear in a record.
///
/// Accepts both the raw text form (`"{\"do_ocr\": true}"`) and an inline
/// JSON object; either way the value must resolve to an object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdvancedOptions {
    Text(String),
    Object(Map<String, Value>),
}

impl AdvancedOptions {
    /// Resolve to the parsed options map.
    pub fn to_map(&self) -> Result<Map<String, Value>> {
        match self {
            Self::Text(raw) => options::parse_extra_options(raw),
            Self::Object(map) => Ok(map.clone()),
        }
    }
}

/// Batch-wide fallbacks a record does not have to repeat.
#[derive(Debug, Clone)]
pub struct RecordDefaults {
    pub endpoint_url: String,
    pub from_formats: Vec<InputFormat>,
    pub to_formats: Vec<OutputFormat>,
}

impl Default for RecordDefaults {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            from_formats: InputFormat::ALL.to_vec(),
            to_formats: vec![OutputFormat::Md],
        }
    }
}

impl RecordDefaults {
    /// Defaults pointing at the given client configuration's endpoint.
    pub fn for_config(config: &ClientConfig) -> Self {
        Self {
            endpoint_url: config.endpoint_url.clone(),
            ..Self::default()
        }
    }
}

impl ConversionRecord {
    /// Resolve the record into a validated [`ConversionRequest`].
    ///
    /// This is where every pre-flight failure surfaces: attachment reads,
    /// base64 decoding, advanced-option parsing, and the request invariants
    /// checked by [`ConversionRequest::new`]. A record that resolves cleanly
    /// will produce exactly one POST.
    pub async fn resolve(self, defaults: &RecordDefaults) -> Result<ConversionRequest> {
        let endpoint_url = self
            .endpoint_url
            .as_deref()
            .unwrap_or(&defaults.endpoint_url);
        let from_formats = if self.from_formats.is_empty() {
            defaults.from_formats.clone()
        } else {
            self.from_formats.clone()
        };
        let to_formats = if self.to_formats.is_empty() {
            defaults.to_formats.clone()
        } else {
            self.to_formats.clone()
        };
        let extra_options = match &self.advanced_options {
            None => Map::new(),
            Some(opts) => opts.to_map()?,
        };
        let filename = self
            .filename
            .clone()
            .unwrap_or_else(|| DEFAULT_FILENAME.to_string());

        let payload = match self.endpoint {
            EndpointKind::Source => {
                let urls = self.source_urls.as_deref().map(split_urls).unwrap_or_default();
                let inline = self.base64.clone().map(|base64_string| FileSource {
                    base64_string,
                    filename: filename.clone(),
                });
                debug!(
                    urls = urls.len(),
                    inline = inline.is_some(),
                    "Resolved source-mode record"
                );
                RequestPayload::Source { urls, inline }
            }
            EndpointKind::File => {
                let upload = match (&self.attachment, &self.base64) {
                    (Some(path), _) => load_attachment(path).await?,
                    (None, Some(b64)) => FileUpload::from_base64(b64, filename.clone())?,
                    (None, None) => return Err(DoclingError::MissingFileData),
                };
                debug!(
                    filename = %upload.filename,
                    bytes = upload.bytes.len(),
                    "Resolved file-mode record"
                );
                RequestPayload::File(upload)
            }
        };

        ConversionRequest::new(endpoint_url, from_formats, to_formats, extra_options, payload)
    }
}

/// Read a local attachment into an upload, keeping its own filename and a
/// content type guessed from the extension.
async fn load_attachment(path: &Path) -> Result<FileUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| DoclingError::AttachmentRead {
            path: path.to_path_buf(),
            source,
        })?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_FILENAME)
        .to_string();
    Ok(FileUpload::new(bytes, filename))
}
