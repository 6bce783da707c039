use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Locates Python virtual environments and resolves package checksums
#[derive(Parser, Debug)]
#[command(name = "pipscout")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Base URL of a PyPI-compatible JSON API (overrides config)
    #[arg(long, global = true, value_name = "URL")]
    pub index_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check whether a directory is a root module (has setup.py or setup.cfg)
    Root {
        /// Project directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Check whether a manifest declares enough modules to analyze
    Requirements {
        /// Manifest file (default: nearest requirements.txt or pyproject.toml)
        file: Option<PathBuf>,

        /// Treat the manifest as the project's root manifest
        #[arg(long)]
        root: bool,
    },
    /// Find the virtual environment for a project
    Venv {
        /// Project directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Resolve the checksum of a package from the package index
    Checksum {
        /// Package name
        package: String,

        /// Package version
        #[arg(long)]
        version: Option<String>,

        /// WHEEL metadata file of the installed distribution
        #[arg(long, value_name = "PATH")]
        wheel: Option<PathBuf>,

        /// Project directory used to find the installed distribution
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },
    /// Report root status, environment and installed distributions
    Scan {
        /// Project directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Resolve a checksum for every installed distribution
        #[arg(long)]
        checksums: bool,
    },
}
