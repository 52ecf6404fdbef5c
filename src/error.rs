//! Error types for the docling-serve-client library.
//!
//! One fatal error enum, [`DoclingError`]. The adapter forwards each record
//! as exactly one HTTP call, so there is no partial-success layer: the first
//! failure of any kind aborts the record, and in batch runs the whole batch.
//! Variants group by where the failure happens:
//!
//! * **Configuration** — the client or a record was set up wrong (bad
//!   endpoint URL, malformed advanced options, empty format lists). Detected
//!   before any network traffic.
//! * **Input** — a record is missing the material it needs (no file bytes in
//!   file mode, no sources at all in source mode). Also detected before any
//!   network traffic.
//! * **Transport** — the POST itself failed, the service answered with a
//!   non-2xx status, or the response body was not valid JSON.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DoclingError>;

/// All errors returned by the docling-serve-client library.
#[derive(Debug, Error)]
pub enum DoclingError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// The endpoint URL is not a usable HTTP/HTTPS URL.
    #[error("Invalid endpoint URL '{url}': {reason}\nExpected something like http://localhost:5001")]
    InvalidEndpointUrl { url: String, reason: String },

    /// Advanced options were given but could not be used as a JSON object.
    ///
    /// Raised both for unparseable text and for valid JSON that is not an
    /// object (arrays, bare strings, numbers). Never downgraded to an empty
    /// options map: a silently dropped OCR or table setting would change the
    /// conversion result with no signal to the caller.
    #[error("Invalid advanced options: {detail}\nPass a JSON object, e.g. '{{\"do_ocr\": true}}'")]
    InvalidAdvancedOptions { detail: String },

    /// `from_formats` or `to_formats` resolved to an empty list.
    #[error("Empty {field} list: at least one format is required")]
    MissingFormats { field: &'static str },

    /// A format name is outside the accepted vocabulary.
    #[error("Unknown {kind} format '{value}'\nAccepted values: {accepted}")]
    UnknownFormat {
        kind: &'static str,
        value: String,
        accepted: &'static str,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// File mode: the record carries neither a binary attachment nor a
    /// base64 payload.
    #[error("No binary or base64 file supplied for file upload\nAttach a file or set the base64 field.")]
    MissingFileData,

    /// Source mode: the record names no source at all.
    #[error("Source request has no sources\nProvide at least one URL or a base64 payload.")]
    EmptySourceRequest,

    /// The base64 payload could not be decoded. Only file mode decodes;
    /// source mode passes the string through untouched.
    #[error("Invalid base64 payload: {reason}")]
    InvalidBase64 { reason: String },

    /// A local attachment path could not be read.
    #[error("Failed to read attachment '{path}': {source}\nCheck the path exists and is readable.")]
    AttachmentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Transport errors ──────────────────────────────────────────────────
    /// The HTTP request failed below the protocol level (connection refused,
    /// DNS, TLS, timeout).
    #[error("Request to Docling Serve failed: {0}\nIs the service running and reachable?")]
    Network(#[from] reqwest::Error),

    /// Docling Serve answered with a non-success status.
    ///
    /// Client (4xx) and server (5xx) statuses are reported identically; the
    /// message carries the raw response text.
    #[error("Docling Serve returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The status was 2xx but the body was not valid JSON.
    #[error("Docling Serve returned an unparseable body (HTTP {status}): {detail}")]
    InvalidResponseBody { status: u16, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_display_carries_status_and_text() {
        let e = DoclingError::Api {
            status: 422,
            message: "unsupported format".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("422"), "got: {msg}");
        assert!(msg.contains("unsupported format"));
    }

    #[test]
    fn missing_file_data_names_both_inputs() {
        let msg = DoclingError::MissingFileData.to_string();
        assert!(msg.contains("binary"));
        assert!(msg.contains("base64"));
    }

    #[test]
    fn unknown_format_lists_accepted_values() {
        let e = DoclingError::UnknownFormat {
            kind: "input",
            value: "csv".into(),
            accepted: "docx, pptx, html, image, pdf, asciidoc, md, xlsx",
        };
        let msg = e.to_string();
        assert!(msg.contains("'csv'"));
        assert!(msg.contains("asciidoc"));
    }

    #[test]
    fn invalid_advanced_options_hints_at_object() {
        let e = DoclingError::InvalidAdvancedOptions {
            detail: "expected value at line 1 column 1".into(),
        };
        assert!(e.to_string().contains("JSON object"));
    }

    #[test]
    fn missing_formats_display() {
        let e = DoclingError::MissingFormats {
            field: "to_formats",
        };
        assert!(e.to_string().contains("to_formats"));
    }
}
