//! Package checksum resolution
//!
//! Combines the build tag of a locally installed wheel with a package-index
//! lookup. A missing or unreadable wheel never stops resolution; it only
//! removes the tag hint.

use super::pypi::{PackageIndex, PyPiError};
use super::wheel::{WheelError, wheel_last_tag};
use serde::Serialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChecksumAlgorithm {
    #[serde(rename = "SHA256")]
    Sha256,
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecksumAlgorithm::Sha256 => write!(f, "SHA256"),
        }
    }
}

/// Checksum of a package distribution as reported by the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecksumRecord {
    pub algorithm: ChecksumAlgorithm,
    pub value: String,
}

impl ChecksumRecord {
    pub fn sha256(value: String) -> Self {
        Self {
            algorithm: ChecksumAlgorithm::Sha256,
            value,
        }
    }
}

/// Build-tag hint passed to the index lookup
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagHint {
    pub use_tag: bool,
    pub tag: String,
}

impl TagHint {
    pub fn new(tag: Option<String>) -> Self {
        let tag = tag.unwrap_or_default();
        Self {
            use_tag: !tag.is_empty(),
            tag,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// The tag, if it should be used
    pub fn tag(&self) -> Option<&str> {
        self.use_tag.then_some(self.tag.as_str())
    }
}

/// Derive the tag hint from a wheel metadata file.
///
/// Missing and unreadable files are logged separately and yield no hint.
pub fn tag_hint(wheel_path: &Path) -> TagHint {
    match wheel_last_tag(wheel_path) {
        Ok(tag) => TagHint::new(Some(tag)),
        Err(err @ WheelError::NotFound { .. }) => {
            tracing::debug!("{}; resolving without build tag", err);
            TagHint::none()
        }
        Err(err) => {
            tracing::warn!("{}; resolving without build tag", err);
            TagHint::none()
        }
    }
}

/// Resolve the checksum for `package` from the release document at `index_url`.
///
/// Only failures of the index lookup itself are returned.
pub fn resolve_checksum(
    index: &impl PackageIndex,
    package: &str,
    index_url: &str,
    wheel_path: &Path,
) -> Result<ChecksumRecord, PyPiError> {
    let hint = tag_hint(wheel_path);
    index.package_checksum(package, index_url, &hint)
}
