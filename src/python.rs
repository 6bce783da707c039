//! Python ecosystem support
//!
//! Handles:
//! - Root-module detection and manifest sufficiency checks
//! - Virtual environment discovery
//! - Wheel build tags and installed distributions
//! - Checksum resolution via the PyPI JSON API

mod checksum;
mod manifest;
mod pypi;
mod root;
mod venv;
mod wheel;

pub use checksum::{ChecksumRecord, TagHint, resolve_checksum};
pub use manifest::{find_manifest_from, load_modules_from_manifest, read_manifest};
pub use pypi::{DEFAULT_INDEX_URL, PackageIndex, PyPiClient, release_url};
pub use root::{Thresholds, is_requirement_met, is_valid_root_module};
pub use venv::{EnvironmentReference, ProcessEnv, locate};
#[cfg(test)]
pub use venv::EnvSource;
pub use wheel::{InstalledDistribution, installed_distributions, wheel_metadata_path};
