//! PyPI registry integration
//!
//! Fetches release metadata from a PyPI-compatible JSON API and picks the
//! digest of the distribution file that best matches a local build tag.

use super::checksum::{ChecksumRecord, TagHint};
use serde::Deserialize;
use thiserror::Error;

/// Default JSON API base
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org/pypi";

#[derive(Error, Debug)]
pub enum PyPiError {
    #[error("Failed to fetch package info from {url}: {details}")]
    Fetch { url: String, details: String },

    #[error("Failed to parse package index response from {url}: {details}")]
    Parse { url: String, details: String },
}

/// PyPI JSON API response structure (only the fields we read)
#[derive(Debug, Deserialize, Default)]
pub struct ReleaseMetadata {
    #[serde(default)]
    pub urls: Vec<ReleaseFile>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ReleaseFile {
    pub filename: String,
    #[serde(default)]
    pub packagetype: String,
    #[serde(default)]
    pub digests: Digests,
}

#[derive(Debug, Deserialize, Default)]
pub struct Digests {
    pub sha256: Option<String>,
}

/// A source of release metadata
pub trait PackageIndex {
    /// Fetch and decode the JSON document at `url`
    fn fetch_release(&self, url: &str) -> Result<ReleaseMetadata, PyPiError>;

    /// Resolve the checksum of `package` from the release document at `url`
    fn package_checksum(
        &self,
        package: &str,
        url: &str,
        hint: &TagHint,
    ) -> Result<ChecksumRecord, PyPiError> {
        let release = self.fetch_release(url)?;
        let value = select_digest(&release, hint).unwrap_or_default();
        if value.is_empty() {
            tracing::warn!(package, url, "no sha256 digest listed for release");
        }
        Ok(ChecksumRecord::sha256(value))
    }
}

/// Blocking HTTP client for the PyPI JSON API
#[derive(Debug, Default)]
pub struct PyPiClient;

impl PackageIndex for PyPiClient {
    fn fetch_release(&self, url: &str) -> Result<ReleaseMetadata, PyPiError> {
        tracing::debug!(url, "fetching release metadata");

        let response = ureq::get(url).call().map_err(|e| PyPiError::Fetch {
            url: url.to_string(),
            details: e.to_string(),
        })?;

        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| PyPiError::Parse {
                url: url.to_string(),
                details: e.to_string(),
            })?;

        serde_json::from_str(&body).map_err(|e| PyPiError::Parse {
            url: url.to_string(),
            details: e.to_string(),
        })
    }
}

/// Build the JSON API URL for a package, pinned to `version` when known
pub fn release_url(index_url: &str, package: &str, version: Option<&str>) -> String {
    let base = index_url.trim_end_matches('/');
    match version {
        Some(version) => format!("{}/{}/{}/json", base, package, version),
        None => format!("{}/{}/json", base, package),
    }
}

/// Pick the sha256 digest for a release.
///
/// Looks for files in this order:
/// 1. the first file whose name contains the build tag (when the hint is usable)
/// 2. the first source distribution
/// 3. the first file listed
fn select_digest(release: &ReleaseMetadata, hint: &TagHint) -> Option<String> {
    let tagged = hint
        .tag()
        .and_then(|tag| release.urls.iter().find(|f| f.filename.contains(tag)));

    tagged
        .or_else(|| release.urls.iter().find(|f| f.packagetype == "sdist"))
        .or_else(|| release.urls.first())
        .and_then(|f| f.digests.sha256.clone())
}
