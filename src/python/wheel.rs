//! Installed wheel metadata
//!
//! Reads build tags from `<name>-<version>.dist-info/WHEEL` files and lists
//! the distributions installed in a `site-packages` directory.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

const DIST_INFO_SUFFIX: &str = ".dist-info";
const WHEEL_METADATA: &str = "WHEEL";

#[derive(Error, Debug)]
pub enum WheelError {
    #[error("Wheel file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Unable to open wheel file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read wheel file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A distribution found in `site-packages`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledDistribution {
    pub name: String,
    pub version: String,
    pub dist_info: PathBuf,
}

impl InstalledDistribution {
    /// Path of this distribution's `WHEEL` metadata file
    pub fn wheel_metadata(&self) -> PathBuf {
        self.dist_info.join(WHEEL_METADATA)
    }

    /// Whether this distribution is the project `package`, ignoring case and separators
    pub fn matches(&self, package: &str) -> bool {
        normalize_dist_name(&self.name).eq_ignore_ascii_case(&normalize_dist_name(package))
    }
}

/// Extract the last `Tag:` value from a wheel metadata file.
///
/// Keys are matched case-insensitively and the value is everything after the
/// first colon, trimmed. When several tags are present the last one wins. A
/// file without tags yields an empty string.
pub fn wheel_last_tag(path: &Path) -> Result<String, WheelError> {
    if !path.exists() {
        return Err(WheelError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|source| WheelError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut last_tag = String::new();
    for line in BufReader::new(file).split(b'\n') {
        let line = line.map_err(|source| WheelError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let line = String::from_utf8_lossy(&line);
        if let Some((key, value)) = line.split_once(':')
            && key.eq_ignore_ascii_case("tag")
        {
            last_tag = value.trim().to_string();
        }
    }

    Ok(last_tag)
}

/// Path of the `WHEEL` file for a package installed in `site_packages`.
///
/// Installers write the dist-info directory with the normalized project name
/// (`-` replaced by `_`), so that spelling is tried first.
pub fn wheel_metadata_path(site_packages: &Path, package: &str, version: &str) -> PathBuf {
    let normalized = normalize_dist_name(package);
    let candidates = [normalized.as_str(), package];

    for name in candidates {
        let dist_info = site_packages.join(format!("{}-{}{}", name, version, DIST_INFO_SUFFIX));
        if dist_info.is_dir() {
            return dist_info.join(WHEEL_METADATA);
        }
    }

    site_packages
        .join(format!("{}-{}{}", normalized, version, DIST_INFO_SUFFIX))
        .join(WHEEL_METADATA)
}

/// List the `*.dist-info` distributions in a site-packages directory, sorted by name
pub fn installed_distributions(
    site_packages: &Path,
) -> Result<Vec<InstalledDistribution>, std::io::Error> {
    let mut distributions = Vec::new();

    for entry in std::fs::read_dir(site_packages)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(stem) = file_name
            .to_str()
            .and_then(|n| n.strip_suffix(DIST_INFO_SUFFIX))
        else {
            continue;
        };

        // Both halves escape their own dashes, so the first one separates them
        let Some((name, version)) = stem.split_once('-') else {
            continue;
        };

        distributions.push(InstalledDistribution {
            name: name.to_string(),
            version: version.to_string(),
            dist_info: entry.path(),
        });
    }

    distributions.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(distributions)
}

/// Normalize a project name the way wheel installers spell dist-info directories
fn normalize_dist_name(name: &str) -> String {
    name.replace(['-', '.'], "_")
}
