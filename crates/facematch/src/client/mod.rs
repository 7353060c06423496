//! Comparison client.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.

use tracing::{debug, warn};

use crate::backend::CompareBackend;
use crate::error::{CompareResult, ComparisonError};
use crate::types::{CompareConfig, ComparisonResult, ImageReference};
use crate::wire::{CompareFacesRequest, CompareFacesResponse};

mod helpers;
mod http;
mod retry;

pub use http::HttpBackend;

use helpers::{normalize, validate_inputs};
use retry::RetryPolicy;

/// Client for one-shot face comparisons.
///
/// Holds no per-call state; clones share the underlying connection pool and
/// a single client may serve concurrent callers.
#[derive(Debug, Clone)]
pub struct ComparisonClient<B = HttpBackend> {
    backend: B,
    config: CompareConfig,
    retry: RetryPolicy,
}

impl ComparisonClient<HttpBackend> {
    pub fn new(config: CompareConfig) -> CompareResult<Self> {
        let backend = HttpBackend::new(&config)?;
        Ok(Self::with_backend(backend, config))
    }

    pub fn from_env() -> CompareResult<Self> {
        Self::new(CompareConfig::from_env())
    }
}

impl<B: CompareBackend> ComparisonClient<B> {
    /// Create a client over a custom transport.
    pub fn with_backend(backend: B, config: CompareConfig) -> Self {
        let retry = RetryPolicy::from_config(&config);
        Self {
            backend,
            config,
            retry,
        }
    }

    /// Compare the face in `source` against the faces in `target`.
    ///
    /// Inputs are validated before anything is sent. Without retries
    /// configured this issues exactly one remote call, bounded by the
    /// configured timeout.
    pub async fn compare(
        &self,
        source: &ImageReference,
        target: &ImageReference,
        region: &str,
    ) -> CompareResult<ComparisonResult> {
        validate_inputs(source, target, region, &self.config)?;

        let request = CompareFacesRequest::new(source, target, &self.config);
        debug!(
            source = %source.location(),
            target = %target.location(),
            region = region,
            "comparing faces"
        );

        let response = self.send(region, &request).await?;
        let result = normalize(response)?;

        debug!(
            source_confidence = result.source_face.confidence,
            matches = result.matches.len(),
            unmatched = result.unmatched_faces.len(),
            "comparison complete"
        );
        Ok(result)
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Send with bounded retry of transient failures.
    async fn send(
        &self,
        region: &str,
        request: &CompareFacesRequest,
    ) -> CompareResult<CompareFacesResponse> {
        let mut retries = 0;
        let max_retries = self.retry.max_retries;

        loop {
            match self.send_once(region, request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && retries < max_retries => {
                    retries += 1;
                    let backoff = self.retry.backoff(retries, &e);

                    warn!(
                        error = %e,
                        retry = retries,
                        max_retries = max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "retrying comparison"
                    );

                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(
        &self,
        region: &str,
        request: &CompareFacesRequest,
    ) -> CompareResult<CompareFacesResponse> {
        let timeout = self.config.timeout();
        match tokio::time::timeout(timeout, self.backend.compare_faces(region, request)).await {
            Ok(result) => result,
            Err(_) => Err(ComparisonError::unavailable(format!(
                "no response within {} ms",
                timeout.as_millis()
            ))),
        }
    }
}
