//! Manifest loading for Python projects
//!
//! Turns manifest text into the ordered list of declared module names:
//! - requirements.txt / `pip freeze` output (line-based, `package==version`)
//! - pyproject.toml (`[project.dependencies]` or `[tool.poetry.dependencies]`)
//!
//! Version constraints are stripped, never interpreted.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Manifest names searched for, in priority order
pub const MANIFEST_PRIORITY: [&str; 2] = ["requirements.txt", "pyproject.toml"];

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("No requirements.txt or pyproject.toml found. Pass the manifest path explicitly.")]
    NotFound,

    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {details}")]
    Parse { path: PathBuf, details: String },
}

/// Parse requirement-style manifest text into declared module names.
///
/// Comments, blank lines, pip options (`-r`, `-e`, `--index-url`) and
/// URL-only entries are skipped. Order and duplicates are preserved.
pub fn load_modules(data: &str) -> Vec<String> {
    data.lines().filter_map(parse_requirement_name).collect()
}

/// Load the module list from manifest text already read from `path`,
/// dispatching on the file name.
pub fn load_modules_from_manifest(
    path: &Path,
    content: &str,
) -> Result<Vec<String>, ManifestError> {
    let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

    match filename {
        "pyproject.toml" => parse_pyproject_dependencies(path, content),
        _ => Ok(load_modules(content)),
    }
}

pub fn read_manifest(path: &Path) -> Result<String, ManifestError> {
    fs::read_to_string(path).map_err(|source| ManifestError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Find the nearest manifest by walking up from a start directory.
///
/// Manifest names are checked in priority order at each level.
pub fn find_manifest_from(start: &Path) -> Result<PathBuf, ManifestError> {
    let mut dir = start;
    loop {
        for filename in MANIFEST_PRIORITY {
            let path = dir.join(filename);
            if path.is_file() {
                return Ok(path);
            }
        }

        match dir.parent() {
            Some(parent) => dir = parent,
            None => break,
        }
    }

    Err(ManifestError::NotFound)
}

/// Parse a requirement line into a package name (if present)
fn parse_requirement_name(line: &str) -> Option<String> {
    let line = line.split('#').next()?.trim();
    if line.is_empty() || line.starts_with('-') {
        return None;
    }

    let line = line.split(';').next()?.trim();
    if line.is_empty() {
        return None;
    }

    if line.starts_with("git+")
        || line.starts_with("http://")
        || line.starts_with("https://")
        || line.starts_with("ssh://")
        || line.starts_with("file:")
    {
        return None;
    }

    if let Some((name, _)) = line.split_once(" @ ") {
        let name = strip_extras(name).trim().to_string();
        return if name.is_empty() { None } else { Some(name) };
    }

    let line = strip_extras(line);

    let version_patterns = ["===", "==", "~=", ">=", "<=", "!=", ">", "<"];
    for pattern in version_patterns {
        if let Some(idx) = line.find(pattern) {
            let name = line[..idx].trim().to_string();
            return if name.is_empty() { None } else { Some(name) };
        }
    }

    let name = line.split_whitespace().next()?.trim().to_string();
    if name.is_empty() { None } else { Some(name) }
}

/// Strip extras from a dependency name (e.g., "pkg[extra]" -> "pkg")
fn strip_extras(name: &str) -> String {
    match (name.find('['), name.find(']')) {
        (Some(open), Some(close)) if close > open => {
            format!("{}{}", &name[..open], &name[close + 1..])
        }
        _ => name.to_string(),
    }
}

#[derive(Deserialize)]
struct PyProject {
    project: Option<ProjectTable>,
    tool: Option<ToolTable>,
}

#[derive(Deserialize)]
struct ProjectTable {
    #[serde(default)]
    dependencies: Vec<String>,
}

#[derive(Deserialize)]
struct ToolTable {
    poetry: Option<PoetryTable>,
}

#[derive(Deserialize)]
struct PoetryTable {
    #[serde(default)]
    dependencies: toml::Table,
}

/// Declared dependencies of a pyproject.toml, PEP 621 entries first
fn parse_pyproject_dependencies(path: &Path, content: &str) -> Result<Vec<String>, ManifestError> {
    let doc: PyProject = toml::from_str(content).map_err(|e| ManifestError::Parse {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;

    let mut modules: Vec<String> = doc
        .project
        .map(|p| p.dependencies)
        .unwrap_or_default()
        .iter()
        .filter_map(|dep| parse_requirement_name(dep))
        .collect();

    if let Some(poetry) = doc.tool.and_then(|t| t.poetry) {
        for (name, value) in poetry.dependencies {
            // The interpreter constraint and local path deps are not packages
            if name == "python" || is_poetry_path_dependency(&value) {
                continue;
            }
            modules.push(name);
        }
    }

    Ok(modules)
}

fn is_poetry_path_dependency(value: &toml::Value) -> bool {
    match value {
        toml::Value::Table(table) => table.contains_key("path"),
        _ => false,
    }
}
