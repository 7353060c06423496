//! Pure helpers: input validation, response normalization, service error
//! bodies (no HTTP, no status logic).

use serde::Deserialize;

use crate::error::{CompareResult, ComparisonError};
use crate::types::{
    BoundingBox, CompareConfig, ComparisonResult, FaceMatch, FaceObservation, ImageReference,
};
use crate::wire::{CompareFacesResponse, ComparedFace, WireBoundingBox};

/// Largest image the service accepts inline.
pub(crate) const MAX_INLINE_BYTES: usize = 5 * 1024 * 1024;

const SCORE_RANGE: std::ops::RangeInclusive<f32> = 0.0..=100.0;

/// Reject anything that can be checked without calling the service.
pub(crate) fn validate_inputs(
    source: &ImageReference,
    target: &ImageReference,
    region: &str,
    config: &CompareConfig,
) -> CompareResult<()> {
    validate_image("source", source)?;
    validate_image("target", target)?;
    validate_region(region)?;

    if let Some(threshold) = config.similarity_threshold {
        if !SCORE_RANGE.contains(&threshold) {
            return Err(ComparisonError::invalid_input(
                "similarity_threshold",
                format!("{} is outside 0..=100", threshold),
            ));
        }
    }

    Ok(())
}

fn validate_image(field: &str, image: &ImageReference) -> CompareResult<()> {
    match image {
        ImageReference::ObjectStore {
            bucket,
            key,
            version,
        } => {
            check_token(field, "bucket", bucket)?;
            check_token(field, "key", key)?;
            if let Some(version) = version {
                check_token(field, "version", version)?;
            }
            Ok(())
        }
        ImageReference::InlineBytes(bytes) if bytes.is_empty() => Err(
            ComparisonError::invalid_input(field, "inline image is empty"),
        ),
        ImageReference::InlineBytes(bytes) if bytes.len() > MAX_INLINE_BYTES => {
            Err(ComparisonError::invalid_input(
                field,
                format!(
                    "inline image is {} bytes, limit is {}",
                    bytes.len(),
                    MAX_INLINE_BYTES
                ),
            ))
        }
        ImageReference::InlineBytes(_) => Ok(()),
    }
}

fn check_token(field: &str, part: &str, value: &str) -> CompareResult<()> {
    if value.is_empty() {
        return Err(ComparisonError::invalid_input(
            field,
            format!("{} is empty", part),
        ));
    }
    if value.trim() != value {
        return Err(ComparisonError::invalid_input(
            field,
            format!("{} has surrounding whitespace", part),
        ));
    }
    Ok(())
}

/// Region identifiers look like `us-east-1` or `us-gov-west-1`.
pub(crate) fn validate_region(region: &str) -> CompareResult<()> {
    let fail = |reason: &str| Err(ComparisonError::invalid_input("region", reason.to_string()));

    if region.is_empty() {
        return fail("region is empty");
    }
    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return fail("region may only contain lowercase letters, digits and '-'");
    }
    if !region.starts_with(|c: char| c.is_ascii_lowercase())
        || !region.ends_with(|c: char| c.is_ascii_digit())
        || !region.contains('-')
        || region.contains("--")
    {
        return fail("region must look like 'us-east-1'");
    }
    Ok(())
}

/// Translate a decoded response into a [`ComparisonResult`], failing closed
/// on missing required fields and out-of-range scores.
pub(crate) fn normalize(response: CompareFacesResponse) -> CompareResult<ComparisonResult> {
    let source = response
        .source_image_face
        .ok_or_else(|| ComparisonError::malformed_response("response has no SourceImageFace"))?;
    let source_face = observation("SourceImageFace", source)?;

    let face_matches = response
        .face_matches
        .ok_or_else(|| ComparisonError::malformed_response("response has no FaceMatches"))?;

    let matches = face_matches
        .into_iter()
        .enumerate()
        .map(|(idx, m)| -> CompareResult<FaceMatch> {
            let similarity = score(&format!("FaceMatches[{}].Similarity", idx), m.similarity)?;
            let face = m.face.ok_or_else(|| {
                ComparisonError::malformed_response(format!("FaceMatches[{}] has no Face", idx))
            })?;
            Ok(FaceMatch {
                matched_face: observation(&format!("FaceMatches[{}].Face", idx), face)?,
                similarity,
            })
        })
        .collect::<CompareResult<Vec<_>>>()?;

    let unmatched_faces = response
        .unmatched_faces
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(idx, face)| observation(&format!("UnmatchedFaces[{}]", idx), face))
        .collect::<CompareResult<Vec<_>>>()?;

    Ok(ComparisonResult {
        source_face,
        matches,
        unmatched_faces,
    })
}

fn observation(path: &str, face: ComparedFace) -> CompareResult<FaceObservation> {
    Ok(FaceObservation {
        confidence: score(&format!("{}.Confidence", path), face.confidence)?,
        bounding_box: face.bounding_box.and_then(bounding_box),
    })
}

fn score(path: &str, value: Option<f32>) -> CompareResult<f32> {
    match value {
        None => Err(ComparisonError::malformed_response(format!(
            "{} is missing",
            path
        ))),
        Some(v) if !SCORE_RANGE.contains(&v) => Err(ComparisonError::malformed_response(
            format!("{} = {} is outside 0..=100", path, v),
        )),
        Some(v) => Ok(v),
    }
}

/// Bounding boxes are informational; an incomplete one is dropped.
fn bounding_box(wire: WireBoundingBox) -> Option<BoundingBox> {
    Some(BoundingBox {
        width: wire.width?,
        height: wire.height?,
        left: wire.left?,
        top: wire.top?,
    })
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    #[serde(rename = "__type", default)]
    error_type: Option<String>,
    #[serde(alias = "Message", default)]
    message: Option<String>,
}

/// Parse a service error body.
///
/// Expected format: `{"__type": "InvalidS3ObjectException", "message": "..."}`,
/// where `__type` may be namespaced (`com.amazonaws...#Name`). Falls back to
/// `header_type` (the error type header) and to the raw body.
pub(crate) fn parse_service_error(
    body: &str,
    header_type: Option<&str>,
) -> (Option<String>, String) {
    let header_type = header_type
        .and_then(|h| h.split(':').next())
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(String::from);

    match serde_json::from_str::<ServiceErrorBody>(body) {
        Ok(parsed) => {
            let error_type = parsed
                .error_type
                .as_deref()
                .map(|t| t.rsplit('#').next().unwrap_or(t).to_string())
                .filter(|t| !t.is_empty())
                .or(header_type);
            let message = parsed
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "no message provided".to_string());
            (error_type, message)
        }
        Err(_) => {
            let message = if body.is_empty() {
                "no message provided".to_string()
            } else {
                body.chars().take(200).collect()
            };
            (header_type, message)
        }
    }
}
