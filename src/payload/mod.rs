//! Request construction: everything between a record's fields and the wire.
//!
//! Each submodule owns exactly one body shape, so either shape can be tested
//! without the other and without a running service.
//!
//! ## Data Flow
//!
//! ```text
//!                      ┌─▶ source ──▶ POST {base}/v1/convert/source
//! record ──▶ options ──┤    (JSON)
//! (fields)  (merge)    └─▶ file ────▶ POST {base}/v1/convert/file
//!                           (multipart)
//! ```
//!
//! 1. [`options`] — parse the free-form extra options and merge them with
//!    the typed format lists
//! 2. [`source`]  — JSON body naming documents by URL or embedded base64
//! 3. [`file`]    — multipart form carrying the document bytes

pub mod file;
pub mod options;
pub mod source;

pub use file::{FileUpload, FormFields, DEFAULT_FILENAME, FILE_PART_NAME};
pub use source::{FileSource, SourceBody, SourceSpec};

use serde_json::{Map, Value};

use crate::config::normalize_endpoint;
use crate::error::{DoclingError, Result};
use crate::format::{InputFormat, OutputFormat};

/// Which body shape a request takes, with the matching material.
///
/// The two variants mirror the two Docling Serve convert endpoints. Every
/// request is exactly one of them, fixed when the record is resolved.
#[derive(Debug, Clone)]
pub enum RequestPayload {
    /// JSON body: documents named by URL and/or embedded as base64 text.
    Source {
        urls: Vec<String>,
        inline: Option<FileSource>,
    },
    /// Multipart body: document bytes uploaded as a `files` part.
    File(FileUpload),
}

impl RequestPayload {
    /// Path appended to the endpoint base URL for this payload kind.
    pub fn convert_path(&self) -> &'static str {
        match self {
            Self::Source { .. } => "/v1/convert/source",
            Self::File(_) => "/v1/convert/file",
        }
    }
}

/// A validated conversion request, good for exactly one POST.
///
/// Built from a [`ConversionRecord`](crate::record::ConversionRecord) or
/// assembled directly by library callers; either way [`ConversionRequest::new`]
/// enforces the invariants, so a value of this type always maps to one
/// well-formed HTTP call. Requests are not reused across calls.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Normalised endpoint base URL, no trailing slash.
    pub endpoint_url: String,
    pub from_formats: Vec<InputFormat>,
    pub to_formats: Vec<OutputFormat>,
    /// Extra service options, already parsed to a JSON object.
    pub extra_options: Map<String, Value>,
    pub payload: RequestPayload,
}

impl ConversionRequest {
    /// Validate and assemble a request.
    ///
    /// Fails without any I/O when the endpoint URL is unusable, a format
    /// list is empty, or a source payload names no document at all.
    pub fn new(
        endpoint_url: &str,
        from_formats: Vec<InputFormat>,
        to_formats: Vec<OutputFormat>,
        extra_options: Map<String, Value>,
        payload: RequestPayload,
    ) -> Result<Self> {
        let endpoint_url = normalize_endpoint(endpoint_url)?;
        if from_formats.is_empty() {
            return Err(DoclingError::MissingFormats {
                field: "from_formats",
            });
        }
        if to_formats.is_empty() {
            return Err(DoclingError::MissingFormats {
                field: "to_formats",
            });
        }
        if let RequestPayload::Source { urls, inline } = &payload {
            if urls.is_empty() && inline.is_none() {
                return Err(DoclingError::EmptySourceRequest);
            }
        }
        Ok(Self {
            endpoint_url,
            from_formats,
            to_formats,
            extra_options,
            payload,
        })
    }

    /// Full URL this request posts to.
    pub fn url(&self) -> String {
        format!("{}{}", self.endpoint_url, self.payload.convert_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_payload() -> RequestPayload {
        RequestPayload::Source {
            urls: vec!["https://example.com/a.pdf".into()],
            inline: None,
        }
    }

    #[test]
    fn url_joins_base_and_convert_path() {
        let req = ConversionRequest::new(
            "http://localhost:5001/",
            vec![InputFormat::Pdf],
            vec![OutputFormat::Md],
            Map::new(),
            source_payload(),
        )
        .unwrap();
        assert_eq!(req.url(), "http://localhost:5001/v1/convert/source");
    }

    #[test]
    fn file_payload_posts_to_file_path() {
        let req = ConversionRequest::new(
            "http://localhost:5001",
            vec![InputFormat::Pdf],
            vec![OutputFormat::Md],
            Map::new(),
            RequestPayload::File(FileUpload::new(vec![1], "a.pdf")),
        )
        .unwrap();
        assert_eq!(req.url(), "http://localhost:5001/v1/convert/file");
    }

    #[test]
    fn empty_format_lists_are_rejected() {
        let err = ConversionRequest::new(
            "http://localhost:5001",
            vec![],
            vec![OutputFormat::Md],
            Map::new(),
            source_payload(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DoclingError::MissingFormats {
                field: "from_formats"
            }
        ));

        let err = ConversionRequest::new(
            "http://localhost:5001",
            vec![InputFormat::Pdf],
            vec![],
            Map::new(),
            source_payload(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DoclingError::MissingFormats {
                field: "to_formats"
            }
        ));
    }

    #[test]
    fn source_payload_without_documents_is_rejected() {
        let err = ConversionRequest::new(
            "http://localhost:5001",
            vec![InputFormat::Pdf],
            vec![OutputFormat::Md],
            Map::new(),
            RequestPayload::Source {
                urls: vec![],
                inline: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, DoclingError::EmptySourceRequest));
    }

    #[test]
    fn bad_endpoint_is_rejected_before_any_io() {
        let err = ConversionRequest::new(
            "not-a-url",
            vec![InputFormat::Pdf],
            vec![OutputFormat::Md],
            Map::new(),
            source_payload(),
        )
        .unwrap_err();
        assert!(matches!(err, DoclingError::InvalidEndpointUrl { .. }));
    }
}
