//! Output formatting for JSON and text modes
//!
//! Provides types for structured output that can be serialized to JSON
//! for machine-readable output, or displayed as text for human consumption.

use crate::python::{ChecksumRecord, EnvironmentReference, InstalledDistribution};
use serde::Serialize;

/// Result of a root check
#[derive(Debug, Serialize)]
pub struct RootResult {
    pub path: String,
    pub valid: bool,
}

/// Result of a requirements check
#[derive(Debug, Serialize)]
pub struct RequirementsResult {
    pub file: String,
    pub root: bool,
    pub modules: Vec<String>,
    pub met: bool,
}

/// A located (or missing) virtual environment
#[derive(Debug, Serialize)]
pub struct VenvResult {
    pub found: bool,
    pub name: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_packages: Option<String>,
}

/// Result of a checksum resolution
#[derive(Debug, Serialize)]
pub struct ChecksumResult {
    pub package: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub checksum: ChecksumRecord,
}

/// A distribution reported by a scan
#[derive(Debug, Serialize)]
pub struct DistributionEntry {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<ChecksumRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a scan
#[derive(Debug, Serialize)]
pub struct ScanResult {
    pub path: String,
    pub root_module: bool,
    pub venv: VenvResult,
    pub distributions: Vec<DistributionEntry>,
}

impl VenvResult {
    pub fn new(reference: &EnvironmentReference) -> Self {
        let env = reference.env();
        Self {
            found: reference.found(),
            name: reference.name().to_string(),
            path: reference.path().display().to_string(),
            strategy: env.map(|e| e.strategy().to_string()),
            site_packages: env
                .and_then(|e| e.site_packages())
                .map(|p| p.display().to_string()),
        }
    }
}

impl DistributionEntry {
    pub fn new(dist: &InstalledDistribution) -> Self {
        Self {
            name: dist.name.clone(),
            version: dist.version.clone(),
            checksum: None,
            error: None,
        }
    }

    pub fn with_checksum(mut self, checksum: ChecksumRecord) -> Self {
        self.checksum = Some(checksum);
        self
    }

    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

/// Print JSON output to stdout
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing JSON: {}", e);
            std::process::exit(1);
        }
    }
}
