//! Analysis-root gating
//!
//! Decides whether a directory is a Python root module and whether its
//! manifest declares enough modules to be worth analyzing.

use super::manifest::load_modules;
use serde::Deserialize;
use std::path::Path;

/// Setup manifests that mark a root module
const ROOT_MANIFESTS: [&str; 2] = ["setup.cfg", "setup.py"];

/// Module-count thresholds for [`is_requirement_met`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Thresholds {
    /// A root manifest is resolved when it declares exactly this many modules
    #[serde(default = "default_root_modules")]
    pub root_modules: usize,

    /// A dependency manifest is resolved when it declares more than this many
    #[serde(default = "default_dependency_modules")]
    pub dependency_modules: usize,
}

fn default_root_modules() -> usize {
    1
}

fn default_dependency_modules() -> usize {
    3
}

impl Thresholds {
    /// Apply the thresholds to a declared-module count
    pub fn is_met(&self, root: bool, module_count: usize) -> bool {
        if root {
            module_count == self.root_modules
        } else {
            module_count > self.dependency_modules
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            root_modules: default_root_modules(),
            dependency_modules: default_dependency_modules(),
        }
    }
}

/// Check whether `path` directly contains `setup.py` or `setup.cfg`.
///
/// A missing directory is indistinguishable from one without manifests.
pub fn is_valid_root_module(path: &Path) -> bool {
    ROOT_MANIFESTS
        .iter()
        .any(|manifest| path.join(manifest).exists())
}

/// Judge whether the modules declared in `data` are enough to continue.
///
/// A `false` result means "insufficient data", not an error.
pub fn is_requirement_met(root: bool, data: &str, thresholds: &Thresholds) -> bool {
    thresholds.is_met(root, load_modules(data).len())
}
