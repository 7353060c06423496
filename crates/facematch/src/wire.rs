//! Request and response schema of the remote `CompareFaces` call.
//!
//! Field names follow the service's JSON protocol. Every response field is
//! optional at this layer so that decoding never fails on a missing field;
//! the client decides afterwards which absences are fatal.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::types::{CompareConfig, ImageReference, QualityFilter};

/// Body of a `CompareFaces` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompareFacesRequest {
    pub source_image: WireImage,
    pub target_image: WireImage,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_threshold: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_filter: Option<QualityFilter>,
}

impl CompareFacesRequest {
    pub fn new(source: &ImageReference, target: &ImageReference, config: &CompareConfig) -> Self {
        Self {
            source_image: WireImage::from(source),
            target_image: WireImage::from(target),
            similarity_threshold: config.similarity_threshold,
            quality_filter: config.quality_filter,
        }
    }
}

/// Image as sent on the wire: `{"S3Object": {...}}` or `{"Bytes": "<base64>"}`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub enum WireImage {
    S3Object(S3Object),
    Bytes(String),
}

impl fmt::Debug for WireImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::S3Object(object) => f.debug_tuple("S3Object").field(object).finish(),
            Self::Bytes(encoded) => f
                .debug_tuple("Bytes")
                .field(&format_args!("{} base64 chars", encoded.len()))
                .finish(),
        }
    }
}

impl From<&ImageReference> for WireImage {
    fn from(image: &ImageReference) -> Self {
        match image {
            ImageReference::ObjectStore {
                bucket,
                key,
                version,
            } => Self::S3Object(S3Object {
                bucket: bucket.clone(),
                name: key.clone(),
                version: version.clone(),
            }),
            ImageReference::InlineBytes(bytes) => Self::Bytes(STANDARD.encode(bytes)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct S3Object {
    pub bucket: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Body of a successful `CompareFaces` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompareFacesResponse {
    #[serde(default)]
    pub source_image_face: Option<ComparedFace>,

    #[serde(default)]
    pub face_matches: Option<Vec<CompareFacesMatch>>,

    #[serde(default)]
    pub unmatched_faces: Option<Vec<ComparedFace>>,
}

/// A face as reported by the service. Landmarks, pose and quality are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ComparedFace {
    #[serde(default)]
    pub bounding_box: Option<WireBoundingBox>,

    #[serde(default)]
    pub confidence: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompareFacesMatch {
    #[serde(default)]
    pub similarity: Option<f32>,

    #[serde(default)]
    pub face: Option<ComparedFace>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireBoundingBox {
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub left: Option<f32>,
    #[serde(default)]
    pub top: Option<f32>,
}
