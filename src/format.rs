//! Format vocabulary for conversion requests.
//!
//! Docling Serve accepts a fixed set of input and output format names, sent
//! lowercase on the wire (`from_formats` / `to_formats` in both the JSON and
//! the multipart body). The enums here pin that vocabulary so a typo fails at
//! parse time instead of as an HTTP 422 from the service.

use crate::error::DoclingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Accepted input format names, as listed in CLI help and parse errors.
pub const INPUT_FORMATS: &str = "docx, pptx, html, image, pdf, asciidoc, md, xlsx";

/// Accepted output format names.
pub const OUTPUT_FORMATS: &str = "md, json, html, text, doctags";

/// A document format Docling Serve can read.
///
/// Raster formats (png, jpeg, tiff, ...) are collapsed into [`Image`]:
/// the service distinguishes them by content, not by format name.
///
/// [`Image`]: InputFormat::Image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Docx,
    Pptx,
    Html,
    Image,
    Pdf,
    Asciidoc,
    Md,
    Xlsx,
}

impl InputFormat {
    /// Every accepted input format, in wire order.
    pub const ALL: [InputFormat; 8] = [
        Self::Docx,
        Self::Pptx,
        Self::Html,
        Self::Image,
        Self::Pdf,
        Self::Asciidoc,
        Self::Md,
        Self::Xlsx,
    ];

    /// Wire name, as serialised into request bodies.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Pptx => "pptx",
            Self::Html => "html",
            Self::Image => "image",
            Self::Pdf => "pdf",
            Self::Asciidoc => "asciidoc",
            Self::Md => "md",
            Self::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputFormat {
    type Err = DoclingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "docx" => Ok(Self::Docx),
            "pptx" => Ok(Self::Pptx),
            "html" | "htm" => Ok(Self::Html),
            "image" => Ok(Self::Image),
            "pdf" => Ok(Self::Pdf),
            "asciidoc" | "adoc" => Ok(Self::Asciidoc),
            "md" | "markdown" => Ok(Self::Md),
            "xlsx" => Ok(Self::Xlsx),
            _ => Err(DoclingError::UnknownFormat {
                kind: "input",
                value: s.to_string(),
                accepted: INPUT_FORMATS,
            }),
        }
    }
}

/// A representation Docling Serve can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Md,
    Json,
    Html,
    Text,
    Doctags,
}

impl OutputFormat {
    /// Wire name, as serialised into request bodies.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Md => "md",
            Self::Json => "json",
            Self::Html => "html",
            Self::Text => "text",
            Self::Doctags => "doctags",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = DoclingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "md" | "markdown" => Ok(Self::Md),
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            "text" | "txt" => Ok(Self::Text),
            "doctags" => Ok(Self::Doctags),
            _ => Err(DoclingError::UnknownFormat {
                kind: "output",
                value: s.to_string(),
                accepted: OUTPUT_FORMATS,
            }),
        }
    }
}

/// Guess a MIME type for an uploaded file from its name.
///
/// Used for the multipart `files` part when the caller did not supply a
/// content type. Unknown extensions fall back to `application/octet-stream`,
/// which Docling Serve resolves by sniffing the bytes.
pub fn guess_content_type(filename: &str) -> &'static str {
    let ext = filename.rsplit('.').next().unwrap_or("");
    match ext.to_lowercase().as_str() {
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "html" | "htm" => "text/html",
        "md" | "markdown" => "text/markdown",
        "asciidoc" | "adoc" => "text/asciidoc",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "tif" | "tiff" => "image/tiff",
        "bmp" => "image/bmp",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
