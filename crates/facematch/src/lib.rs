//! Remote face-comparison client.
//!
//! This crate wraps a remote `CompareFaces` capability, providing:
//!
//! - Local validation of image references, region and options
//! - One remote call per comparison, bounded by a timeout
//! - Opt-in retry with exponential backoff for transient failures
//! - Explicit response decoding that fails closed on missing fields
//! - A four-way failure taxonomy ([`ComparisonError`])
//!
//! # Quick Start
//!
//! ```no_run
//! use facematch::{CompareConfig, ComparisonClient, ImageReference};
//!
//! # async fn example() -> Result<(), facematch::ComparisonError> {
//! let client = ComparisonClient::new(CompareConfig::default())?;
//!
//! let result = client
//!     .compare(
//!         &ImageReference::object("photos", "target.jpg"),
//!         &ImageReference::object("photos", "group.jpg"),
//!         "us-east-1",
//!     )
//!     .await?;
//!
//! println!("source face confidence: {}", result.source_face.confidence);
//! for m in &result.matches {
//!     println!("match at {}% similarity", m.similarity);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Transport
//!
//! [`ComparisonClient::new`] talks JSON over HTTP to the regional endpoint
//! (or `endpoint_url`). Request signing is not performed; point
//! `endpoint_url` at a signing proxy, or supply your own
//! [`CompareBackend`] through [`ComparisonClient::with_backend`].
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `FACEMATCH_ENDPOINT_URL` | Endpoint override (default: derived from region) |
//! | `FACEMATCH_TIMEOUT_MS` | Per-attempt timeout in milliseconds (default: 30000) |
//! | `FACEMATCH_MAX_RETRIES` | Max retries for transient failures (default: 0) |
//! | `FACEMATCH_SIMILARITY_THRESHOLD` | Minimum similarity for a match |
//! | `FACEMATCH_QUALITY_FILTER` | Service-side quality filter |

pub mod backend;
pub mod client;
pub mod error;
pub mod reference;
pub mod types;
pub mod wire;

// Re-export main types
pub use backend::CompareBackend;
pub use client::{ComparisonClient, HttpBackend};
pub use error::{CompareResult, ComparisonError, MALFORMED_RESPONSE};
pub use types::{
    BoundingBox, CompareConfig, ComparisonResult, FaceMatch, FaceObservation, ImageKind,
    ImageReference, QualityFilter,
};
pub use wire::{CompareFacesRequest, CompareFacesResponse};
