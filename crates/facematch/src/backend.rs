//! Seam between the client and the remote comparison capability.

use async_trait::async_trait;

use crate::error::CompareResult;
use crate::wire::{CompareFacesRequest, CompareFacesResponse};

/// Transport to the remote comparison capability.
///
/// Implementations issue exactly one remote call per invocation and classify
/// failures into [`ComparisonError`](crate::ComparisonError) variants. Retry,
/// timeout and response validation are the client's job.
#[async_trait]
pub trait CompareBackend: Send + Sync {
    async fn compare_faces(
        &self,
        region: &str,
        request: &CompareFacesRequest,
    ) -> CompareResult<CompareFacesResponse>;
}

#[async_trait]
impl<T: CompareBackend + ?Sized> CompareBackend for std::sync::Arc<T> {
    async fn compare_faces(
        &self,
        region: &str,
        request: &CompareFacesRequest,
    ) -> CompareResult<CompareFacesResponse> {
        (**self).compare_faces(region, request).await
    }
}
