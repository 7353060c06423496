//! Integration tests for ComparisonClient over HTTP.
//!
//! Uses wiremock for HTTP mocking. Tests cover the happy path, status and
//! service error mapping (no face/rejected/throttled/5xx), malformed bodies,
//! timeout and retry behavior.

use std::time::{Duration, Instant};

use facematch::{
    CompareConfig, ComparisonClient, ComparisonError, ImageReference, MALFORMED_RESPONSE,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REGION: &str = "us-east-1";

fn test_config(mock_server: &MockServer) -> CompareConfig {
    CompareConfig::default()
        .with_endpoint_url(mock_server.uri())
        .with_backoff(Duration::from_millis(10), Duration::from_millis(50))
}

fn create_test_client(config: CompareConfig) -> ComparisonClient {
    ComparisonClient::new(config).expect("failed to create client")
}

fn source() -> ImageReference {
    ImageReference::object("b1", "target.jpg")
}

fn target() -> ImageReference {
    ImageReference::object("b1", "teste.jpg")
}

fn service_error(error_type: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_json(json!({
        "__type": error_type,
        "Message": message
    }))
}

#[tokio::test]
async fn test_compare_faces_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("x-amz-target", "RekognitionService.CompareFaces"))
        .and(header("content-type", "application/x-amz-json-1.1"))
        .and(header(
            "user-agent",
            concat!("facematch/", env!("CARGO_PKG_VERSION")),
        ))
        .and(body_partial_json(json!({
            "SourceImage": {"S3Object": {"Bucket": "b1", "Name": "target.jpg"}},
            "TargetImage": {"S3Object": {"Bucket": "b1", "Name": "teste.jpg"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "SourceImageFace": {
                "BoundingBox": {"Width": 0.31, "Height": 0.42, "Left": 0.33, "Top": 0.18},
                "Confidence": 99.9
            },
            "FaceMatches": [{
                "Similarity": 97.5,
                "Face": {
                    "BoundingBox": {"Width": 0.2, "Height": 0.3, "Left": 0.4, "Top": 0.1},
                    "Confidence": 99.1
                }
            }],
            "UnmatchedFaces": []
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(test_config(&mock_server));
    let result = client
        .compare(&source(), &target(), REGION)
        .await
        .expect("compare failed");

    assert_eq!(result.source_face.confidence, 99.9);
    assert_eq!(result.matches.len(), 1);
    assert_eq!(result.matches[0].similarity, 97.5);
    assert_eq!(result.matches[0].matched_face.confidence, 99.1);
    assert_eq!(
        result.source_face.bounding_box.map(|b| b.width),
        Some(0.31)
    );
    assert!(result.unmatched_faces.is_empty());
}

#[tokio::test]
async fn test_compare_faces_zero_matches() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "SourceImageFace": {"Confidence": 99.2},
            "FaceMatches": [],
            "UnmatchedFaces": [{"Confidence": 98.7}, {"Confidence": 97.0}]
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(test_config(&mock_server));
    let result = client.compare(&source(), &target(), REGION).await.unwrap();

    assert!(result.matches.is_empty());
    assert_eq!(result.unmatched_faces.len(), 2);
    assert_eq!(result.unmatched_faces[1].confidence, 97.0);
}

#[tokio::test]
async fn test_match_order_is_preserved() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "SourceImageFace": {"Confidence": 99.0},
            "FaceMatches": [
                {"Similarity": 81.0, "Face": {"Confidence": 99.0}},
                {"Similarity": 99.8, "Face": {"Confidence": 98.0}},
                {"Similarity": 90.4, "Face": {"Confidence": 97.0}}
            ]
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(test_config(&mock_server));
    let result = client.compare(&source(), &target(), REGION).await.unwrap();

    let similarities: Vec<f32> = result.matches.iter().map(|m| m.similarity).collect();
    assert_eq!(similarities, vec![81.0, 99.8, 90.4]);
}

#[tokio::test]
async fn test_inline_bytes_are_sent_base64() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "SourceImage": {"Bytes": "aGVsbG8="},
            "SimilarityThreshold": 90.0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "SourceImageFace": {"Confidence": 99.0},
            "FaceMatches": []
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(test_config(&mock_server).with_similarity_threshold(90.0));
    client
        .compare(&ImageReference::inline(b"hello".to_vec()), &target(), REGION)
        .await
        .expect("compare failed");
}

#[tokio::test]
async fn test_no_face_detected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(service_error(
            "InvalidParameterException",
            "Request has invalid parameters",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(test_config(&mock_server).with_max_retries(3));
    let result = client.compare(&source(), &target(), REGION).await;

    match result {
        Err(ComparisonError::NoFaceDetected { message }) => {
            assert_eq!(message, "Request has invalid parameters");
        }
        other => panic!("expected NoFaceDetected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_null_source_face_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "SourceImageFace": null,
            "FaceMatches": []
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(test_config(&mock_server));
    let result = client.compare(&source(), &target(), REGION).await;

    assert!(matches!(
        result,
        Err(ComparisonError::RemoteRejected { ref code, .. }) if code == MALFORMED_RESPONSE
    ));
}

#[tokio::test]
async fn test_undecodable_body_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(test_config(&mock_server));
    let result = client.compare(&source(), &target(), REGION).await;

    assert!(matches!(
        result,
        Err(ComparisonError::RemoteRejected { ref code, .. }) if code == MALFORMED_RESPONSE
    ));
}

#[tokio::test]
async fn test_rejection_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(service_error(
            "com.amazonaws.rekognition#InvalidS3ObjectException",
            "Unable to get object metadata from S3. Check object key, region and/or access permissions.",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(test_config(&mock_server).with_max_retries(3));
    let result = client.compare(&source(), &target(), REGION).await;

    match result {
        Err(ComparisonError::RemoteRejected { code, message }) => {
            assert_eq!(code, "InvalidS3ObjectException");
            assert!(message.starts_with("Unable to get object metadata"));
        }
        other => panic!("expected RemoteRejected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_access_denied_via_error_type_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("x-amzn-ErrorType", "AccessDeniedException:http://internal/")
                .set_body_string(""),
        )
        .mount(&mock_server)
        .await;

    let client = create_test_client(test_config(&mock_server));
    let result = client.compare(&source(), &target(), REGION).await;

    assert!(matches!(
        result,
        Err(ComparisonError::RemoteRejected { ref code, .. }) if code == "AccessDeniedException"
    ));
}

#[tokio::test]
async fn test_server_error_without_retries_is_single_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(test_config(&mock_server));
    let result = client.compare(&source(), &target(), REGION).await;

    assert!(matches!(result, Err(ComparisonError::RemoteUnavailable { .. })));
}

#[tokio::test]
async fn test_max_retries_exceeded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "__type": "InternalServerError",
            "message": "internal failure"
        })))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = create_test_client(test_config(&mock_server).with_max_retries(2));
    let result = client.compare(&source(), &target(), REGION).await;

    assert!(
        matches!(result, Err(ComparisonError::RemoteUnavailable { .. })),
        "Should fail with RemoteUnavailable after max retries"
    );
}

#[tokio::test]
async fn test_throttling_then_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(service_error("ThrottlingException", "Rate exceeded"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "SourceImageFace": {"Confidence": 99.0},
            "FaceMatches": [{"Similarity": 95.0, "Face": {"Confidence": 99.5}}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(test_config(&mock_server).with_max_retries(1));
    let result = client
        .compare(&source(), &target(), REGION)
        .await
        .expect("retry should recover");

    assert_eq!(result.matches[0].similarity, 95.0);
}

#[tokio::test]
async fn test_rate_limited_with_retry_after() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "5"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(test_config(&mock_server));
    let result = client.compare(&source(), &target(), REGION).await;

    match result {
        Err(ComparisonError::RemoteUnavailable { retry_after, .. }) => {
            assert_eq!(retry_after, Some(Duration::from_secs(5)));
        }
        other => panic!("expected RemoteUnavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_timeout_fails_fast() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "SourceImageFace": {"Confidence": 99.0},
                    "FaceMatches": []
                }))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&mock_server)
        .await;

    let client =
        create_test_client(test_config(&mock_server).with_timeout(Duration::from_millis(300)));

    let start = Instant::now();
    let result = client.compare(&source(), &target(), REGION).await;
    let elapsed = start.elapsed();

    assert!(
        matches!(result, Err(ComparisonError::RemoteUnavailable { .. })),
        "expected RemoteUnavailable, got {:?}",
        result
    );
    assert!(
        elapsed < Duration::from_secs(5),
        "timeout was not honoured, elapsed: {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_invalid_input_never_reaches_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_test_client(test_config(&mock_server).with_max_retries(2));

    let empty_source = client
        .compare(&ImageReference::object("b1", ""), &target(), REGION)
        .await;
    let empty_target = client
        .compare(&source(), &ImageReference::object("", "teste.jpg"), REGION)
        .await;
    let empty_region = client.compare(&source(), &target(), "").await;

    for result in [empty_source, empty_target, empty_region] {
        assert!(matches!(result, Err(ComparisonError::InvalidInput { .. })));
    }
}

#[tokio::test]
async fn test_unreachable_endpoint_is_unavailable() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();
    drop(mock_server);

    let client = create_test_client(
        CompareConfig::default()
            .with_endpoint_url(uri)
            .with_timeout(Duration::from_secs(2)),
    );
    let result = client.compare(&source(), &target(), REGION).await;

    assert!(matches!(result, Err(ComparisonError::RemoteUnavailable { .. })));
}
