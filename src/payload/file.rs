//! Multipart body for the `/v1/convert/file` endpoint.
//!
//! File mode uploads the document bytes themselves. Everything that is a
//! JSON value in source mode becomes a form field here: one part per format
//! list entry, one part per extra option, and a `files` part carrying the
//! payload. No Content-Type header is set by hand; the HTTP client derives
//! the multipart boundary itself.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::multipart::{Form, Part};
use serde_json::{Map, Value};

use crate::error::{DoclingError, Result};
use crate::format::{guess_content_type, InputFormat, OutputFormat};

/// Form part name Docling Serve expects the upload under.
pub const FILE_PART_NAME: &str = "files";

/// Fallback name for payloads that arrive without one.
pub const DEFAULT_FILENAME: &str = "file.bin";

/// The document bytes to upload, with their part metadata.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

impl FileUpload {
    /// Wrap raw bytes, guessing the content type from the filename.
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let content_type = guess_content_type(&filename).to_string();
        Self {
            bytes,
            filename,
            content_type,
        }
    }

    /// Decode a base64 payload into an upload.
    ///
    /// This is the one place base64 is decoded: file mode uploads raw bytes,
    /// while source mode embeds the string as-is. Whitespace anywhere in the
    /// payload is ignored — `base64(1)` wraps its output at 76 columns —
    /// but any other non-alphabet symbol is still rejected.
    pub fn from_base64(data: &str, filename: impl Into<String>) -> Result<Self> {
        let cleaned: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = STANDARD
            .decode(cleaned)
            .map_err(|e| DoclingError::InvalidBase64 {
                reason: e.to_string(),
            })?;
        Ok(Self::new(bytes, filename))
    }
}

/// The form fields for one upload, in emit order.
///
/// Kept as plain data so tests can assert on the exact field sequence
/// without decoding a multipart stream.
#[derive(Debug, Clone)]
pub struct FormFields {
    pub texts: Vec<(String, String)>,
    pub file: FileUpload,
}

impl FormFields {
    /// Convert into a reqwest multipart form, the file part last.
    pub fn into_form(self) -> Result<Form> {
        let mut form = Form::new();
        for (key, value) in self.texts {
            form = form.text(key, value);
        }
        let part = Part::bytes(self.file.bytes)
            .file_name(self.file.filename)
            .mime_str(&self.file.content_type)?;
        Ok(form.part(FILE_PART_NAME, part))
    }
}

/// Assemble the form fields from the request parts.
///
/// List fields repeat: one `from_formats` / `to_formats` part per entry.
/// Extra options become one part each, string values bare and everything
/// else as its JSON text form.
pub fn build_form_fields(
    from: &[InputFormat],
    to: &[OutputFormat],
    extra: &Map<String, Value>,
    file: FileUpload,
) -> FormFields {
    let mut texts = Vec::new();
    for f in from {
        texts.push(("from_formats".to_string(), f.as_str().to_string()));
    }
    for t in to {
        texts.push(("to_formats".to_string(), t.as_str().to_string()));
    }
    for (key, value) in extra {
        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        texts.push((key.clone(), text));
    }
    FormFields { texts, file }
}
