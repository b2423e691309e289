mod common;

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use cloud_ocr::{
    service::ocr::vision::{VisionOcr, VisionOcrConfig},
    ImageTextExtractor, OcrError,
};
use common::{image_file, init_logging, FakeServer};
use serde_json::Value;

fn extractor(endpoint: String) -> ImageTextExtractor {
    let config = VisionOcrConfig {
        endpoint,
        api_key: "vision-key".to_owned(),
        ..Default::default()
    };
    ImageTextExtractor::new(Box::new(
        VisionOcr::new(config, Duration::from_secs(5)).expect("Failed to build VisionOcr"),
    ))
}

#[test]
fn sends_base64_envelope() {
    init_logging();
    let server = FakeServer::respond(
        200,
        r#"{"responses":[{"textAnnotations":[{"description":"HELLO WORLD"},{"description":"HELLO"},{"description":"WORLD"}]}]}"#,
    );
    let dir = tempfile::tempdir().unwrap();
    let image = image_file(&dir, b"some image");

    let words = extractor(server.url()).extract_words(&image).unwrap();
    assert_eq!(words.0, vec!["HELLO", "WORLD"]);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.target, "/v1/images:annotate");
    assert_eq!(
        request.headers.get("content-type").map(String::as_str),
        Some("application/json")
    );
    assert_eq!(
        request.headers.get("x-goog-api-key").map(String::as_str),
        Some("vision-key")
    );

    let payload: Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(
        payload["requests"][0]["image"]["content"],
        STANDARD.encode(b"some image")
    );
    assert_eq!(
        payload["requests"][0]["features"][0]["type"],
        "TEXT_DETECTION"
    );
    assert_eq!(payload["requests"][0]["features"][0]["maxResults"], 1);
}

#[test]
fn error_in_body_is_a_provider_error() {
    let server = FakeServer::respond(
        200,
        r#"{"responses":[{"error":{"code":3,"message":"Bad image data."}}]}"#,
    );
    let dir = tempfile::tempdir().unwrap();
    let image = image_file(&dir, b"img");

    let err = extractor(server.url()).extract_text(&image).unwrap_err();
    assert!(matches!(err, OcrError::Provider { .. }), "{err:?}");
}

#[test]
fn forbidden_is_an_http_error() {
    let server = FakeServer::respond(403, r#"{"error":{"code":403,"message":"denied"}}"#);
    let dir = tempfile::tempdir().unwrap();
    let image = image_file(&dir, b"img");

    let err = extractor(server.url()).extract_text(&image).unwrap_err();
    assert!(
        matches!(err, OcrError::Http { status: 403, .. }),
        "{err:?}"
    );
}
