//! Integration tests for the request adapter, against a mock HTTP server.
//!
//! Every test spins up a local [`mockito`] server and points the client at
//! it, so the full path is exercised: record resolution, body construction,
//! the POST itself, and response relay. No real Docling Serve instance is
//! needed; see `tests/live.rs` for the gated live-service checks.

use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

use docling_serve_client::{
    run_batch, AdvancedOptions, ClientConfig, ConversionRecord, DoclingClient, DoclingError,
    EndpointKind, InputFormat, NoopBatchProgress, OutputFormat, RecordDefaults,
};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Client + defaults wired to a mock server.
fn client_for(server: &ServerGuard) -> (DoclingClient, RecordDefaults) {
    let config = ClientConfig::builder()
        .endpoint_url(server.url())
        .build()
        .expect("mock server URL should be valid");
    let defaults = RecordDefaults::for_config(&config);
    let client = DoclingClient::new(config).expect("client should build");
    (client, defaults)
}

/// A source-mode record with typed formats, the common case.
fn pdf_to_md_record(urls: &str) -> ConversionRecord {
    ConversionRecord {
        source_urls: Some(urls.to_string()),
        from_formats: vec![InputFormat::Pdf],
        to_formats: vec![OutputFormat::Md],
        ..Default::default()
    }
}

async fn convert_one(
    server: &ServerGuard,
    record: ConversionRecord,
) -> docling_serve_client::Result<serde_json::Value> {
    let (client, defaults) = client_for(server);
    let request = record.resolve(&defaults).await?;
    client.convert(&request).await.map(|r| r.body)
}

// ── Source mode: JSON body shapes ────────────────────────────────────────────

#[tokio::test]
async fn source_urls_become_one_http_source_each() {
    let mut server = Server::new_async().await;
    // Two comma-separated URLs, trimmed, each tagged "http", with the
    // format lists inside "options".
    let m = server
        .mock("POST", "/v1/convert/source")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "options": {"from_formats": ["pdf"], "to_formats": ["md"]},
            "sources": [
                {"kind": "http", "url": "http://x/a.pdf"},
                {"kind": "http", "url": "http://x/b.pdf"}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r##"{"document": {"md_content": "# A"}}"##)
        .expect(1)
        .create_async()
        .await;

    let body = convert_one(&server, pdf_to_md_record("http://x/a.pdf, http://x/b.pdf"))
        .await
        .expect("conversion should succeed");

    m.assert_async().await;
    assert_eq!(body, json!({"document": {"md_content": "# A"}}));
}

#[tokio::test]
async fn base64_payload_is_relayed_unmodified() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("POST", "/v1/convert/source")
        .match_body(Matcher::Json(json!({
            "options": {"from_formats": ["pdf"], "to_formats": ["md"]},
            "file_sources": [
                {"base64_string": "JVBERi0xLjQ=", "filename": "inline.pdf"}
            ]
        })))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let record = ConversionRecord {
        base64: Some("JVBERi0xLjQ=".into()),
        filename: Some("inline.pdf".into()),
        from_formats: vec![InputFormat::Pdf],
        to_formats: vec![OutputFormat::Md],
        ..Default::default()
    };
    convert_one(&server, record)
        .await
        .expect("conversion should succeed");

    m.assert_async().await;
}

#[tokio::test]
async fn advanced_options_land_inside_options_and_override_formats() {
    let mut server = Server::new_async().await;
    // User-supplied keys win on collision: to_formats here comes from the
    // advanced options, not the typed list.
    let m = server
        .mock("POST", "/v1/convert/source")
        .match_body(Matcher::Json(json!({
            "options": {
                "from_formats": ["pdf"],
                "to_formats": ["html", "text"],
                "do_ocr": true
            },
            "sources": [{"kind": "http", "url": "http://x/a.pdf"}]
        })))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let record = ConversionRecord {
        advanced_options: Some(AdvancedOptions::Text(
            r#"{"do_ocr": true, "to_formats": ["html", "text"]}"#.into(),
        )),
        ..pdf_to_md_record("http://x/a.pdf")
    };
    convert_one(&server, record)
        .await
        .expect("conversion should succeed");

    m.assert_async().await;
}

// ── File mode: multipart body ────────────────────────────────────────────────

#[tokio::test]
async fn attachment_bytes_are_uploaded_as_files_part() {
    let mut server = Server::new_async().await;
    // Multipart bodies are matched textually: the part headers and the raw
    // payload must all appear, and the content type must carry a boundary.
    let m = server
        .mock("POST", "/v1/convert/file")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=.+".into()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="files""#.into()),
            Matcher::Regex(r#"filename="note.md""#.into()),
            Matcher::Regex("text/markdown".into()),
            Matcher::Regex("# hello from disk".into()),
            Matcher::Regex(r#"name="from_formats"(?s:.)*?md"#.into()),
            Matcher::Regex(r#"name="to_formats"(?s:.)*?json"#.into()),
        ]))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.md");
    std::fs::write(&path, "# hello from disk").unwrap();

    let record = ConversionRecord {
        endpoint: EndpointKind::File,
        attachment: Some(path),
        from_formats: vec![InputFormat::Md],
        to_formats: vec![OutputFormat::Json],
        ..Default::default()
    };
    convert_one(&server, record)
        .await
        .expect("upload should succeed");

    m.assert_async().await;
}

#[tokio::test]
async fn base64_fallback_is_decoded_before_upload() {
    let mut server = Server::new_async().await;
    // "aGVsbG8gZG9jbGluZw==" is "hello docling": the multipart body must
    // carry the decoded bytes, not the base64 text.
    let m = server
        .mock("POST", "/v1/convert/file")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("hello docling".into()),
            Matcher::Regex(r#"filename="file.bin""#.into()),
        ]))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let record = ConversionRecord {
        endpoint: EndpointKind::File,
        base64: Some("aGVsbG8gZG9jbGluZw==".into()),
        from_formats: vec![InputFormat::Pdf],
        to_formats: vec![OutputFormat::Md],
        ..Default::default()
    };
    convert_one(&server, record)
        .await
        .expect("upload should succeed");

    m.assert_async().await;
}

#[tokio::test]
async fn advanced_options_become_form_fields_in_file_mode() {
    let mut server = Server::new_async().await;
    // Non-string option values are serialised to their JSON text form.
    let m = server
        .mock("POST", "/v1/convert/file")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="do_ocr"(?s:.)*?true"#.into()),
            Matcher::Regex(r#"name="table_mode"(?s:.)*?accurate"#.into()),
        ]))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let record = ConversionRecord {
        endpoint: EndpointKind::File,
        base64: Some("JVBERi0=".into()),
        from_formats: vec![InputFormat::Pdf],
        to_formats: vec![OutputFormat::Md],
        advanced_options: Some(AdvancedOptions::Text(
            r#"{"do_ocr": true, "table_mode": "accurate"}"#.into(),
        )),
        ..Default::default()
    };
    convert_one(&server, record)
        .await
        .expect("upload should succeed");

    m.assert_async().await;
}

// ── Pre-flight failures: zero HTTP calls ─────────────────────────────────────

#[tokio::test]
async fn file_mode_without_material_makes_no_call() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("POST", "/v1/convert/file")
        .expect(0)
        .create_async()
        .await;

    let record = ConversionRecord {
        endpoint: EndpointKind::File,
        from_formats: vec![InputFormat::Pdf],
        to_formats: vec![OutputFormat::Md],
        ..Default::default()
    };
    let err = convert_one(&server, record).await.unwrap_err();
    assert!(matches!(err, DoclingError::MissingFileData));

    m.assert_async().await;
}

#[tokio::test]
async fn malformed_advanced_options_make_no_call() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("POST", "/v1/convert/source")
        .expect(0)
        .create_async()
        .await;

    let record = ConversionRecord {
        advanced_options: Some(AdvancedOptions::Text("{not json".into())),
        ..pdf_to_md_record("http://x/a.pdf")
    };
    let err = convert_one(&server, record).await.unwrap_err();
    assert!(matches!(err, DoclingError::InvalidAdvancedOptions { .. }));

    m.assert_async().await;
}

// ── Transport failures ───────────────────────────────────────────────────────

#[tokio::test]
async fn client_and_server_errors_propagate_identically() {
    for status in [422usize, 500] {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/v1/convert/source")
            .with_status(status)
            .with_body("conversion rejected")
            .create_async()
            .await;

        let err = convert_one(&server, pdf_to_md_record("http://x/a.pdf"))
            .await
            .unwrap_err();
        match err {
            DoclingError::Api { status: got, message } => {
                assert_eq!(got, status as u16);
                assert_eq!(message, "conversion rejected");
            }
            other => panic!("expected Api error for {status}, got: {other:?}"),
        }
    }
}

#[tokio::test]
async fn non_json_success_body_is_an_error() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("POST", "/v1/convert/source")
        .with_status(200)
        .with_body("<html>proxy page</html>")
        .create_async()
        .await;

    let err = convert_one(&server, pdf_to_md_record("http://x/a.pdf"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DoclingError::InvalidResponseBody { status: 200, .. }
    ));
}

#[tokio::test]
async fn response_body_is_relayed_verbatim() {
    let mut server = Server::new_async().await;
    // Unknown fields, nulls and nesting must all survive the relay.
    let payload = json!({
        "document": {"md_content": "# Title", "json_content": null},
        "status": "success",
        "processing_time": 1.52,
        "timings": {"layout": [0.3, 0.4]}
    });
    let _m = server
        .mock("POST", "/v1/convert/source")
        .with_status(200)
        .with_body(payload.to_string())
        .create_async()
        .await;

    let body = convert_one(&server, pdf_to_md_record("http://x/a.pdf"))
        .await
        .expect("conversion should succeed");
    assert_eq!(body, payload);
}

// ── Batch driver ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn batch_returns_one_response_per_record_in_order() {
    let mut server = Server::new_async().await;
    // Distinguish records by their URL so the response order is checkable.
    let m_a = server
        .mock("POST", "/v1/convert/source")
        .match_body(Matcher::PartialJson(json!({
            "sources": [{"kind": "http", "url": "http://x/a.pdf"}]
        })))
        .with_status(200)
        .with_body(r#"{"doc": "a"}"#)
        .expect(1)
        .create_async()
        .await;
    let m_b = server
        .mock("POST", "/v1/convert/source")
        .match_body(Matcher::PartialJson(json!({
            "sources": [{"kind": "http", "url": "http://x/b.pdf"}]
        })))
        .with_status(200)
        .with_body(r#"{"doc": "b"}"#)
        .expect(1)
        .create_async()
        .await;

    let (client, defaults) = client_for(&server);
    let records = vec![
        pdf_to_md_record("http://x/a.pdf"),
        pdf_to_md_record("http://x/b.pdf"),
    ];
    let responses = run_batch(&client, &defaults, records, &NoopBatchProgress)
        .await
        .expect("batch should succeed");

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].body, json!({"doc": "a"}));
    assert_eq!(responses[1].body, json!({"doc": "b"}));
    m_a.assert_async().await;
    m_b.assert_async().await;
}

#[tokio::test]
async fn failing_record_aborts_the_batch() {
    let mut server = Server::new_async().await;
    let m_fail = server
        .mock("POST", "/v1/convert/source")
        .match_body(Matcher::PartialJson(json!({
            "sources": [{"kind": "http", "url": "http://x/bad.pdf"}]
        })))
        .with_status(500)
        .with_body("backend exploded")
        .expect(1)
        .create_async()
        .await;
    // The second record must never be attempted.
    let m_never = server
        .mock("POST", "/v1/convert/source")
        .match_body(Matcher::PartialJson(json!({
            "sources": [{"kind": "http", "url": "http://x/good.pdf"}]
        })))
        .expect(0)
        .create_async()
        .await;

    let (client, defaults) = client_for(&server);
    let records = vec![
        pdf_to_md_record("http://x/bad.pdf"),
        pdf_to_md_record("http://x/good.pdf"),
    ];
    let err = run_batch(&client, &defaults, records, &NoopBatchProgress)
        .await
        .unwrap_err();

    assert!(matches!(err, DoclingError::Api { status: 500, .. }));
    m_fail.assert_async().await;
    m_never.assert_async().await;
}

#[tokio::test]
async fn per_record_endpoint_override_wins_over_defaults() {
    // Default endpoint points at a server that must stay silent; the
    // record's own endpoint_url receives the call.
    let mut silent = Server::new_async().await;
    let m_silent = silent
        .mock("POST", "/v1/convert/source")
        .expect(0)
        .create_async()
        .await;

    let mut target = Server::new_async().await;
    let m_target = target
        .mock("POST", "/v1/convert/source")
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let record = ConversionRecord {
        endpoint_url: Some(target.url()),
        ..pdf_to_md_record("http://x/a.pdf")
    };
    convert_one(&silent, record)
        .await
        .expect("conversion should succeed");

    m_silent.assert_async().await;
    m_target.assert_async().await;
}
