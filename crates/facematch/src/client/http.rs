//! HTTP backend: endpoint selection, status and service error mapping.
//!
//! This is the ONLY place for status code handling. client/mod.rs never
//! interprets status codes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, RETRY_AFTER, USER_AGENT};
use reqwest::StatusCode;
use tracing::debug;

use crate::backend::CompareBackend;
use crate::error::{CompareResult, ComparisonError};
use crate::types::CompareConfig;
use crate::wire::{CompareFacesRequest, CompareFacesResponse};

use super::helpers::parse_service_error;

const USER_AGENT_VALUE: &str = concat!("facematch/", env!("CARGO_PKG_VERSION"));
const AMZ_JSON: &str = "application/x-amz-json-1.1";
const TARGET_HEADER: &str = "x-amz-target";
const COMPARE_FACES_TARGET: &str = "RekognitionService.CompareFaces";
const ERROR_TYPE_HEADER: &str = "x-amzn-errortype";

/// Service error types that signal a transient condition.
const TRANSIENT_ERRORS: &[&str] = &[
    "ThrottlingException",
    "ProvisionedThroughputExceededException",
    "LimitExceededException",
    "InternalServerError",
    "ServiceUnavailableException",
];

/// Error type the service uses when it cannot find a face to compare.
const NO_FACE_ERROR: &str = "InvalidParameterException";

/// HTTP backend speaking the `CompareFaces` JSON protocol.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    endpoint_url: Option<String>,
}

impl HttpBackend {
    pub fn new(config: &CompareConfig) -> CompareResult<Self> {
        let endpoint_url = match &config.endpoint_url {
            Some(raw) => {
                validate_endpoint(raw)?;
                Some(raw.trim_end_matches('/').to_string())
            }
            None => None,
        };

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(default_headers)
            .build()
            .map_err(|e| {
                ComparisonError::invalid_input(
                    "http_client",
                    format!("failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self {
            client,
            endpoint_url,
        })
    }

    /// Endpoint for `region`, unless an override is configured.
    pub fn endpoint_for(&self, region: &str) -> String {
        match &self.endpoint_url {
            Some(url) => url.clone(),
            None => format!("https://rekognition.{}.amazonaws.com", region),
        }
    }
}

#[async_trait]
impl CompareBackend for HttpBackend {
    async fn compare_faces(
        &self,
        region: &str,
        request: &CompareFacesRequest,
    ) -> CompareResult<CompareFacesResponse> {
        let url = format!("{}/", self.endpoint_for(region));
        let body = serde_json::to_vec(request).map_err(|e| {
            ComparisonError::invalid_input("request", format!("failed to encode request: {}", e))
        })?;

        debug!(url = %url, bytes = body.len(), "sending CompareFaces request");

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, AMZ_JSON)
            .header(TARGET_HEADER, COMPARE_FACES_TARGET)
            .body(body)
            .send()
            .await?;
        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await?;
            return serde_json::from_slice(&bytes).map_err(|e| {
                ComparisonError::malformed_response(format!(
                    "failed to decode CompareFaces response: {}",
                    e
                ))
            });
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let header_type = response
            .headers()
            .get(ERROR_TYPE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let text = response.text().await.unwrap_or_default();
        let (error_type, message) = parse_service_error(&text, header_type.as_deref());

        debug!(
            status = status.as_u16(),
            error_type = error_type.as_deref().unwrap_or("-"),
            "CompareFaces request failed"
        );

        Err(classify(status, error_type, message, retry_after))
    }
}

/// Endpoint overrides must be absolute `http`/`https` URLs with a host.
fn validate_endpoint(raw: &str) -> CompareResult<()> {
    let url = url::Url::parse(raw).map_err(|e| {
        ComparisonError::invalid_input(
            "endpoint_url",
            format!("'{}' is not a valid URL: {}", raw, e),
        )
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ComparisonError::invalid_input(
            "endpoint_url",
            format!("'{}' must use http or https, got '{}'", raw, url.scheme()),
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ComparisonError::invalid_input(
            "endpoint_url",
            format!("'{}' has no host", raw),
        ));
    }
    Ok(())
}

/// Map a failed response onto the error taxonomy.
///
/// The service reports a face-less source or target image as
/// `InvalidParameterException`; its message is passed through unchanged so
/// callers can tell which image it was.
fn classify(
    status: StatusCode,
    error_type: Option<String>,
    message: String,
    retry_after: Option<Duration>,
) -> ComparisonError {
    match error_type {
        Some(t) if t == NO_FACE_ERROR => ComparisonError::NoFaceDetected { message },

        Some(t) if TRANSIENT_ERRORS.contains(&t.as_str()) => ComparisonError::RemoteUnavailable {
            message: format!("{}: {}", t, message),
            retry_after,
        },

        _ if status == StatusCode::TOO_MANY_REQUESTS
            || status == StatusCode::REQUEST_TIMEOUT
            || status.is_server_error() =>
        {
            ComparisonError::RemoteUnavailable {
                message: format!("HTTP {}: {}", status.as_u16(), message),
                retry_after,
            }
        }

        Some(code) => ComparisonError::RemoteRejected { code, message },

        None => ComparisonError::RemoteRejected {
            code: format!("HTTP{}", status.as_u16()),
            message,
        },
    }
}
