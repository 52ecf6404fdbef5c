//! JSON body for the `/v1/convert/source` endpoint.
//!
//! Source mode ships no form data. Documents are named either by URL, which
//! the service fetches itself, or as base64 text embedded in the JSON body.
//! The base64 string is relayed exactly as supplied; only file mode ever
//! decodes it.

use serde::Serialize;
use serde_json::{Map, Value};

use super::options;
use crate::format::{InputFormat, OutputFormat};

/// One remote document reference.
///
/// Serialises with a `kind` tag: `{"kind": "http", "url": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceSpec {
    Http { url: String },
}

/// One document embedded as base64 text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSource {
    pub base64_string: String,
    pub filename: String,
}

/// The complete request body for `/v1/convert/source`.
///
/// Empty lists are omitted from the JSON entirely, never sent as `[]`.
#[derive(Debug, Clone, Serialize)]
pub struct SourceBody {
    pub options: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub file_sources: Vec<FileSource>,
}

/// Split a comma-separated URL list into clean entries.
///
/// Entries are trimmed; blank segments from doubled or trailing commas are
/// dropped.
pub fn split_urls(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Assemble the JSON body from its parts.
pub fn build_body(
    from: &[InputFormat],
    to: &[OutputFormat],
    extra: &Map<String, Value>,
    urls: &[String],
    inline: Option<&FileSource>,
) -> SourceBody {
    SourceBody {
        options: options::build_options(from, to, extra),
        sources: urls
            .iter()
            .map(|url| SourceSpec::Http { url: url.clone() })
            .collect(),
        file_sources: inline.cloned().into_iter().collect(),
    }
}
