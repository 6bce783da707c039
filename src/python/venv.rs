//! Virtual environment discovery
//!
//! Strategies, in priority order (first success wins):
//! 1. The active environment named by `VIRTUAL_ENV`
//! 2. A conventional `.venv` or `venv` entry under the project root
//! 3. The first directory below the project root containing `pyvenv.cfg`

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Environment variable set by `activate` scripts
pub const VIRTUAL_ENV: &str = "VIRTUAL_ENV";

/// Marker file written at the top of every virtual environment
pub const PYVENV_CFG: &str = "pyvenv.cfg";

/// Conventional environment directory names; the hidden one wins
const CONVENTIONAL_DIRS: [&str; 2] = [".venv", "venv"];

#[derive(Error, Debug)]
pub enum VenvError {
    #[error("Failed to scan for pyvenv.cfg: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to resolve absolute path for {path}: {source}")]
    Absolute {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Read access to environment variables
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// How an environment was discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Active,
    Conventional,
    Scanned,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Active => write!(f, "active"),
            Strategy::Conventional => write!(f, "conventional"),
            Strategy::Scanned => write!(f, "scanned"),
        }
    }
}

/// A discovered virtual environment. Name and path are never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualEnv {
    name: String,
    path: PathBuf,
    strategy: Strategy,
}

impl VirtualEnv {
    fn new(name: String, path: PathBuf, strategy: Strategy) -> Option<Self> {
        if name.is_empty() || path.as_os_str().is_empty() {
            return None;
        }
        Some(Self {
            name,
            path,
            strategy,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Locate the environment's `site-packages` directory.
    ///
    /// POSIX layouts use `lib/python3.X/site-packages`; Windows uses
    /// `Lib/site-packages`. With several interpreters the newest
    /// `pythonX.Y` directory is used.
    pub fn site_packages(&self) -> Option<PathBuf> {
        let windows = self.path.join("Lib").join("site-packages");
        if windows.is_dir() {
            return Some(windows);
        }

        std::fs::read_dir(self.path.join("lib"))
            .ok()?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let version = interpreter_version(&entry.file_name().to_string_lossy())?;
                let site = entry.path().join("site-packages");
                site.is_dir().then_some((version, site))
            })
            .max_by_key(|(version, _)| *version)
            .map(|(_, site)| site)
    }
}

/// Parse `python3.11` into `(3, 11)`; a bare `python3` is `(3, 0)`.
/// ABI suffixes such as the `t` of free-threaded builds are ignored.
fn interpreter_version(dir_name: &str) -> Option<(u32, u32)> {
    let version = dir_name.strip_prefix("python")?;
    let (major, minor) = version.split_once('.').unwrap_or((version, "0"));
    let minor = minor.trim_end_matches(|c: char| !c.is_ascii_digit());
    Some((major.parse().ok()?, minor.parse().ok()?))
}

/// Result of a locate call: at most one environment per project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentReference {
    Found(VirtualEnv),
    NotFound,
}

impl EnvironmentReference {
    pub fn found(&self) -> bool {
        matches!(self, EnvironmentReference::Found(_))
    }

    /// Environment name, empty when nothing was found
    pub fn name(&self) -> &str {
        match self {
            EnvironmentReference::Found(env) => env.name(),
            EnvironmentReference::NotFound => "",
        }
    }

    /// Environment path, empty when nothing was found
    pub fn path(&self) -> &Path {
        match self {
            EnvironmentReference::Found(env) => env.path(),
            EnvironmentReference::NotFound => Path::new(""),
        }
    }

    pub fn env(&self) -> Option<&VirtualEnv> {
        match self {
            EnvironmentReference::Found(env) => Some(env),
            EnvironmentReference::NotFound => None,
        }
    }
}

/// Find the virtual environment for a project root.
///
/// Only a failure while scanning the tree is an error; finding nothing is
/// `EnvironmentReference::NotFound`.
pub fn locate(root: &Path, env: &impl EnvSource) -> Result<EnvironmentReference, VenvError> {
    if let Some(found) = active_env(env) {
        tracing::debug!(path = %found.path.display(), "using active virtual environment");
        return Ok(EnvironmentReference::Found(found));
    }

    if let Some(found) = conventional_env(root)? {
        tracing::debug!(path = %found.path.display(), "found conventional virtual environment");
        return Ok(EnvironmentReference::Found(found));
    }

    if let Some(found) = scan_pyvenv_cfg(root)? {
        tracing::debug!(path = %found.path.display(), "found {} during scan", PYVENV_CFG);
        return Ok(EnvironmentReference::Found(found));
    }

    tracing::debug!(root = %root.display(), "no virtual environment found");
    Ok(EnvironmentReference::NotFound)
}

/// The environment named by `VIRTUAL_ENV`, without touching the filesystem
fn active_env(env: &impl EnvSource) -> Option<VirtualEnv> {
    let value = env.var(VIRTUAL_ENV)?;
    let path = value.trim_end_matches(is_separator);
    let name = path.rsplit(is_separator).next().unwrap_or("");
    VirtualEnv::new(name.to_string(), PathBuf::from(path), Strategy::Active)
}

fn is_separator(c: char) -> bool {
    c == '/' || c == std::path::MAIN_SEPARATOR
}

/// The first conventional name present under `root`, directory or not
fn conventional_env(root: &Path) -> Result<Option<VirtualEnv>, VenvError> {
    for name in CONVENTIONAL_DIRS {
        let candidate = root.join(name);
        if candidate.exists() {
            let path = absolute(&candidate)?;
            return Ok(VirtualEnv::new(name.to_string(), path, Strategy::Conventional));
        }
    }
    Ok(None)
}

/// Walk the tree under `root`, stopping at the first directory with `pyvenv.cfg`
///
/// The root is visited first, then children in file-name order. Symlinks are
/// not followed and any unreadable entry aborts the scan.
fn scan_pyvenv_cfg(root: &Path) -> Result<Option<VirtualEnv>, VenvError> {
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_dir() || !entry.path().join(PYVENV_CFG).exists() {
            continue;
        }

        let path = absolute(entry.path())?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Ok(VirtualEnv::new(name, path, Strategy::Scanned));
    }

    Ok(None)
}

fn absolute(path: &Path) -> Result<PathBuf, VenvError> {
    std::path::absolute(path).map_err(|source| VenvError::Absolute {
        path: path.to_path_buf(),
        source,
    })
}
