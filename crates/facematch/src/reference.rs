//! Image reference parsing.
//!
//! Supported textual form:
//! - `s3://bucket/key` → object in a bucket
//! - `s3://bucket/key?versionId=abc` → specific object version
//!
//! Local files are not references: the caller reads them and passes
//! [`ImageReference::inline`] bytes instead.

use std::str::FromStr;

use crate::error::{CompareResult, ComparisonError};
use crate::types::ImageReference;

const OBJECT_SCHEME: &str = "s3://";
const VERSION_QUERY: &str = "?versionId=";

impl ImageReference {
    /// Parse an object-store reference.
    ///
    /// # Examples
    ///
    /// ```
    /// use facematch::{ImageKind, ImageReference};
    ///
    /// let image = ImageReference::parse("s3://photos/people/alice.jpg").unwrap();
    /// assert_eq!(image.kind(), ImageKind::ObjectStoreReference);
    /// assert_eq!(image, ImageReference::object("photos", "people/alice.jpg"));
    ///
    /// let pinned = ImageReference::parse("s3://photos/alice.jpg?versionId=3").unwrap();
    /// assert_eq!(pinned, ImageReference::object_version("photos", "alice.jpg", "3"));
    /// ```
    pub fn parse(reference: &str) -> CompareResult<Self> {
        let reference = reference.trim();

        if reference.is_empty() {
            return Err(invalid(reference, "empty reference"));
        }

        let rest = reference
            .strip_prefix(OBJECT_SCHEME)
            .ok_or_else(|| invalid(reference, "expected s3://bucket/key"))?;

        let (path, version) = match rest.rsplit_once(VERSION_QUERY) {
            Some((path, version)) => {
                if version.is_empty() {
                    return Err(invalid(reference, "empty versionId"));
                }
                (path, Some(version.to_string()))
            }
            None => (rest, None),
        };

        let (bucket, key) = path
            .split_once('/')
            .ok_or_else(|| invalid(reference, "missing object key"))?;

        if bucket.is_empty() {
            return Err(invalid(reference, "empty bucket"));
        }
        if key.is_empty() {
            return Err(invalid(reference, "empty object key"));
        }

        Ok(Self::ObjectStore {
            bucket: bucket.to_string(),
            key: key.to_string(),
            version,
        })
    }

    /// Whether the string looks like an object-store reference.
    pub fn is_object_url(reference: &str) -> bool {
        reference.trim_start().starts_with(OBJECT_SCHEME)
    }
}

impl FromStr for ImageReference {
    type Err = ComparisonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn invalid(reference: &str, reason: &str) -> ComparisonError {
    ComparisonError::invalid_input("reference", format!("{}: '{}'", reason, reference))
}
