//! Options-map assembly shared by both body shapes.
//!
//! Docling Serve takes conversion options the same way on both convert
//! endpoints: the `from_formats` / `to_formats` lists plus any number of
//! service options (`do_ocr`, `table_mode`, `pdf_backend`, ...). This module
//! parses the free-form extra options and merges everything into one map.

use serde_json::{Map, Value};

use crate::error::{DoclingError, Result};
use crate::format::{InputFormat, OutputFormat};

/// Parse user-supplied extra options from their raw JSON text form.
///
/// Blank input means "no extra options". Anything else must parse to a JSON
/// object; malformed JSON and non-object values are rejected, never
/// downgraded to an empty map.
pub fn parse_extra_options(raw: &str) -> Result<Map<String, Value>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Map::new());
    }
    let value: Value =
        serde_json::from_str(trimmed).map_err(|e| DoclingError::InvalidAdvancedOptions {
            detail: e.to_string(),
        })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(DoclingError::InvalidAdvancedOptions {
            detail: format!("expected a JSON object, got {}", json_type_name(&other)),
        }),
    }
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Merge the format lists and the extra options into the wire options map.
///
/// The typed lists go in first, then the extra options, so a caller-supplied
/// `from_formats` / `to_formats` key replaces the typed value.
pub fn build_options(
    from: &[InputFormat],
    to: &[OutputFormat],
    extra: &Map<String, Value>,
) -> Map<String, Value> {
    let mut options = Map::new();
    options.insert(
        "from_formats".into(),
        Value::Array(
            from.iter()
                .map(|f| Value::String(f.as_str().into()))
                .collect(),
        ),
    );
    options.insert(
        "to_formats".into(),
        Value::Array(
            to.iter()
                .map(|f| Value::String(f.as_str().into()))
                .collect(),
        ),
    );
    for (key, value) in extra {
        options.insert(key.clone(), value.clone());
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_input_is_no_options() {
        assert!(parse_extra_options("").unwrap().is_empty());
        assert!(parse_extra_options("   \n\t").unwrap().is_empty());
    }

    #[test]
    fn object_text_parses() {
        let map = parse_extra_options(r#"{"do_ocr": true, "image_export_mode": "placeholder"}"#)
            .unwrap();
        assert_eq!(map.get("do_ocr"), Some(&json!(true)));
        assert_eq!(map.get("image_export_mode"), Some(&json!("placeholder")));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = parse_extra_options("{not json").unwrap_err();
        assert!(matches!(
            err,
            DoclingError::InvalidAdvancedOptions { .. }
        ));
    }

    #[test]
    fn non_object_json_is_rejected() {
        for raw in [r#"["do_ocr"]"#, r#""do_ocr""#, "42", "null"] {
            let err = parse_extra_options(raw).unwrap_err();
            assert!(
                matches!(err, DoclingError::InvalidAdvancedOptions { .. }),
                "input {raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn build_options_serialises_formats_lowercase() {
        let options = build_options(
            &[InputFormat::Pdf, InputFormat::Docx],
            &[OutputFormat::Md],
            &Map::new(),
        );
        assert_eq!(options.get("from_formats"), Some(&json!(["pdf", "docx"])));
        assert_eq!(options.get("to_formats"), Some(&json!(["md"])));
    }

    #[test]
    fn extra_keys_land_next_to_formats() {
        let extra = parse_extra_options(r#"{"do_ocr": false}"#).unwrap();
        let options = build_options(&[InputFormat::Pdf], &[OutputFormat::Md], &extra);
        assert_eq!(options.len(), 3);
        assert_eq!(options.get("do_ocr"), Some(&json!(false)));
    }

    #[test]
    fn extra_options_override_typed_formats() {
        let extra = parse_extra_options(r#"{"to_formats": ["html", "text"]}"#).unwrap();
        let options = build_options(&[InputFormat::Pdf], &[OutputFormat::Md], &extra);
        assert_eq!(options.get("to_formats"), Some(&json!(["html", "text"])));
        assert_eq!(options.get("from_formats"), Some(&json!(["pdf"])));
    }
}
