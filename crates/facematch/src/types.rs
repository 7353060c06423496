//! Data model and client configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ComparisonError;

/// An image to compare.
///
/// The client never resolves, caches or mutates the referenced image; the
/// remote service reads it at call time.
#[derive(Clone, PartialEq, Eq)]
pub enum ImageReference {
    /// Object in a storage bucket, optionally pinned to an object version.
    ObjectStore {
        bucket: String,
        key: String,
        version: Option<String>,
    },

    /// Raw image bytes sent with the request.
    InlineBytes(Vec<u8>),
}

/// Kind of an [`ImageReference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageKind {
    ObjectStoreReference,
    InlineBytes,
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ObjectStoreReference => f.write_str("object-store-reference"),
            Self::InlineBytes => f.write_str("inline-bytes"),
        }
    }
}

impl ImageReference {
    /// Reference an object by bucket and key.
    pub fn object(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self::ObjectStore {
            bucket: bucket.into(),
            key: key.into(),
            version: None,
        }
    }

    /// Reference a specific version of an object.
    pub fn object_version(
        bucket: impl Into<String>,
        key: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::ObjectStore {
            bucket: bucket.into(),
            key: key.into(),
            version: Some(version.into()),
        }
    }

    /// Send the image bytes inline.
    pub fn inline(bytes: impl Into<Vec<u8>>) -> Self {
        Self::InlineBytes(bytes.into())
    }

    pub fn kind(&self) -> ImageKind {
        match self {
            Self::ObjectStore { .. } => ImageKind::ObjectStoreReference,
            Self::InlineBytes(_) => ImageKind::InlineBytes,
        }
    }

    /// Human-readable location, safe to log (never contains image bytes).
    pub fn location(&self) -> String {
        match self {
            Self::ObjectStore {
                bucket,
                key,
                version: Some(version),
            } => format!("s3://{}/{}?versionId={}", bucket, key, version),
            Self::ObjectStore { bucket, key, .. } => format!("s3://{}/{}", bucket, key),
            Self::InlineBytes(bytes) => format!("<{} inline bytes>", bytes.len()),
        }
    }
}

impl fmt::Debug for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ObjectStore {
                bucket,
                key,
                version,
            } => f
                .debug_struct("ObjectStore")
                .field("bucket", bucket)
                .field("key", key)
                .field("version", version)
                .finish(),
            Self::InlineBytes(bytes) => f
                .debug_tuple("InlineBytes")
                .field(&format_args!("{} bytes", bytes.len()))
                .finish(),
        }
    }
}

/// Face position as ratios of the image width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub width: f32,
    pub height: f32,
    pub left: f32,
    pub top: f32,
}

/// One detected face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceObservation {
    /// Certainty (0-100) that the region is a face.
    pub confidence: f32,

    /// Where the face is, when the service reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

/// A target face matched to the source face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceMatch {
    pub matched_face: FaceObservation,

    /// Similarity (0-100) between this face and the source face.
    pub similarity: f32,
}

/// Normalized output of one comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub source_face: FaceObservation,

    /// Matches in the order the service returned them.
    pub matches: Vec<FaceMatch>,

    /// Target faces below the similarity threshold, in service order.
    #[serde(default)]
    pub unmatched_faces: Vec<FaceObservation>,
}

/// Service-side filter for low quality faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QualityFilter {
    None,
    Auto,
    Low,
    Medium,
    High,
}

impl QualityFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Auto => "AUTO",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl fmt::Display for QualityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityFilter {
    type Err = ComparisonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(Self::None),
            "AUTO" => Ok(Self::Auto),
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            _ => Err(ComparisonError::invalid_input(
                "quality_filter",
                format!("unknown quality filter '{}'", s),
            )),
        }
    }
}

/// Client configuration.
///
/// The region is deliberately absent: it is passed to every comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    /// Endpoint override. When unset the endpoint is derived from the region.
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Per-attempt timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum retries for transient failures.
    #[serde(default)]
    pub max_retries: u32,

    /// Backoff before the first retry; doubles on each further retry.
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,

    /// Upper bound for any single backoff.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Minimum similarity (0-100) for a target face to count as a match.
    #[serde(default)]
    pub similarity_threshold: Option<f32>,

    #[serde(default)]
    pub quality_filter: Option<QualityFilter>,
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_base_backoff_ms() -> u64 {
    1_000
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            timeout_ms: default_timeout_ms(),
            max_retries: 0,
            base_backoff_ms: default_base_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            similarity_threshold: None,
            quality_filter: None,
        }
    }
}

impl CompareConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `FACEMATCH_ENDPOINT_URL` | Endpoint override |
    /// | `FACEMATCH_TIMEOUT_MS` | Per-attempt timeout in milliseconds |
    /// | `FACEMATCH_MAX_RETRIES` | Max retries for transient failures |
    /// | `FACEMATCH_SIMILARITY_THRESHOLD` | Minimum similarity for a match |
    /// | `FACEMATCH_QUALITY_FILTER` | `NONE`, `AUTO`, `LOW`, `MEDIUM` or `HIGH` |
    ///
    /// Unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self {
            endpoint_url: std::env::var("FACEMATCH_ENDPOINT_URL")
                .ok()
                .filter(|v| !v.is_empty()),
            timeout_ms: std::env::var("FACEMATCH_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout_ms),
            max_retries: std::env::var("FACEMATCH_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            similarity_threshold: std::env::var("FACEMATCH_SIMILARITY_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok()),
            quality_filter: std::env::var("FACEMATCH_QUALITY_FILTER")
                .ok()
                .and_then(|v| v.parse().ok()),
            ..Self::default()
        }
    }

    /// Set the endpoint override.
    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    /// Set the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Enable retries of transient failures.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the backoff bounds.
    pub fn with_backoff(mut self, base: Duration, max: Duration) -> Self {
        self.base_backoff_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
        self.max_backoff_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = Some(threshold);
        self
    }

    pub fn with_quality_filter(mut self, filter: QualityFilter) -> Self {
        self.quality_filter = Some(filter);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
