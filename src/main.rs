mod cli;
mod config;
mod output;
mod python;

use clap::Parser;
use cli::{Cli, Command};
use output::{
    ChecksumResult, DistributionEntry, RequirementsResult, RootResult, ScanResult, VenvResult,
};
use python::{EnvironmentReference, PackageIndex, ProcessEnv, PyPiClient, TagHint};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// `--debug` forces debug output; otherwise `RUST_LOG` applies, defaulting to
/// warnings only. Logs go to stderr so JSON on stdout stays parseable.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("pipscout=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pipscout=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let json_output = cli.json;
    let index_url = cli.index_url;

    let result = match cli.command {
        Some(Command::Root { path }) => run_root(&path, json_output),
        Some(Command::Requirements { file, root }) => run_requirements(file, root, json_output),
        Some(Command::Venv { path }) => run_venv(&path, json_output),
        Some(Command::Checksum {
            package,
            version,
            wheel,
            path,
        }) => run_checksum(
            &package,
            version,
            wheel,
            &path,
            index_url,
            json_output,
        ),
        Some(Command::Scan { path, checksums }) => {
            run_scan(&path, checksums, index_url, json_output)
        }
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_root(path: &Path, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let valid = python::is_valid_root_module(path);

    if json_output {
        output::print_json(&RootResult {
            path: path.display().to_string(),
            valid,
        });
    } else if valid {
        println!("{} is a root module", path.display());
    } else {
        println!("{} is not a root module (no setup.py or setup.cfg)", path.display());
    }
    Ok(())
}

fn run_requirements(
    file: Option<PathBuf>,
    root: bool,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::load()?;

    let file = match file {
        Some(file) => file,
        None => python::find_manifest_from(&std::env::current_dir()?)?,
    };

    let data = python::read_manifest(&file)?;
    let modules = python::load_modules_from_manifest(&file, &data)?;
    let is_pyproject = file.file_name().is_some_and(|n| n == "pyproject.toml");
    let met = if is_pyproject {
        config.thresholds.is_met(root, modules.len())
    } else {
        python::is_requirement_met(root, &data, &config.thresholds)
    };

    if json_output {
        output::print_json(&RequirementsResult {
            file: file.display().to_string(),
            root,
            modules,
            met,
        });
    } else {
        let kind = if root { "root" } else { "dependency" };
        let verdict = if met { "met" } else { "not met" };
        println!(
            "{}: {} declared modules, {} requirement {}",
            file.display(),
            modules.len(),
            kind,
            verdict
        );
    }
    Ok(())
}

fn run_venv(path: &Path, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let reference = python::locate(path, &ProcessEnv)?;
    let result = VenvResult::new(&reference);

    if json_output {
        output::print_json(&result);
    } else if result.found {
        println!("{} ({})", result.name, result.path);
        if let Some(site_packages) = &result.site_packages {
            println!("  site-packages: {}", site_packages);
        }
    } else {
        println!("No virtual environment found");
    }
    Ok(())
}

fn run_checksum(
    package: &str,
    version: Option<String>,
    wheel: Option<PathBuf>,
    path: &Path,
    index_url: Option<String>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::load()?.with_index_url(index_url);

    // Without an explicit WHEEL file, look for the installed distribution
    let (version, wheel) = match wheel {
        Some(wheel) => (version, Some(wheel)),
        None => find_installed(path, package, version)?,
    };

    let url = python::release_url(&config.index_url, package, version.as_deref());
    let client = PyPiClient;
    let checksum = match &wheel {
        Some(wheel) => python::resolve_checksum(&client, package, &url, wheel)?,
        None => {
            tracing::debug!(package, "no installed distribution, resolving without build tag");
            client.package_checksum(package, &url, &TagHint::none())?
        }
    };

    if json_output {
        output::print_json(&ChecksumResult {
            package: package.to_string(),
            version,
            checksum,
        });
    } else {
        println!("{} {}:{}", package, checksum.algorithm, checksum.value);
    }
    Ok(())
}

/// Find the version and WHEEL file of `package` in the project's environment
fn find_installed(
    path: &Path,
    package: &str,
    version: Option<String>,
) -> Result<(Option<String>, Option<PathBuf>), Box<dyn std::error::Error>> {
    let reference = python::locate(path, &ProcessEnv)?;
    let Some(site_packages) = reference.env().and_then(|env| env.site_packages()) else {
        return Ok((version, None));
    };

    match version {
        Some(version) => {
            let wheel = python::wheel_metadata_path(&site_packages, package, &version);
            Ok((Some(version), Some(wheel)))
        }
        None => {
            let installed = python::installed_distributions(&site_packages)?;
            Ok(installed
                .into_iter()
                .find(|dist| dist.matches(package))
                .map(|dist| (Some(dist.version.clone()), Some(dist.wheel_metadata())))
                .unwrap_or((None, None)))
        }
    }
}

fn run_scan(
    path: &Path,
    checksums: bool,
    index_url: Option<String>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::load()?.with_index_url(index_url);

    let root_module = python::is_valid_root_module(path);
    let reference = python::locate(path, &ProcessEnv)?;
    let distributions = scan_distributions(&reference, checksums, &config.index_url)?;

    let result = ScanResult {
        path: path.display().to_string(),
        root_module,
        venv: VenvResult::new(&reference),
        distributions,
    };

    if json_output {
        output::print_json(&result);
        return Ok(());
    }

    println!(
        "{}: {}",
        result.path,
        if root_module {
            "root module"
        } else {
            "not a root module"
        }
    );
    if result.venv.found {
        println!("Environment: {} ({})", result.venv.name, result.venv.path);
    } else {
        println!("Environment: none");
    }
    for dist in &result.distributions {
        match (&dist.checksum, &dist.error) {
            (Some(checksum), _) => println!(
                "  {}=={} {}:{}",
                dist.name, dist.version, checksum.algorithm, checksum.value
            ),
            (None, Some(error)) => println!("  {}=={} ({})", dist.name, dist.version, error),
            (None, None) => println!("  {}=={}", dist.name, dist.version),
        }
    }
    Ok(())
}

/// List installed distributions, resolving checksums when asked.
///
/// A failed lookup is recorded on its entry and the scan moves on.
fn scan_distributions(
    reference: &EnvironmentReference,
    checksums: bool,
    index_url: &str,
) -> Result<Vec<DistributionEntry>, Box<dyn std::error::Error>> {
    let Some(site_packages) = reference.env().and_then(|env| env.site_packages()) else {
        return Ok(Vec::new());
    };

    let client = PyPiClient;
    let mut entries = Vec::new();
    for dist in python::installed_distributions(&site_packages)? {
        let entry = DistributionEntry::new(&dist);
        if !checksums {
            entries.push(entry);
            continue;
        }

        let url = python::release_url(index_url, &dist.name, Some(&dist.version));
        match python::resolve_checksum(&client, &dist.name, &url, &dist.wheel_metadata()) {
            Ok(checksum) => entries.push(entry.with_checksum(checksum)),
            Err(e) => {
                tracing::warn!(package = %dist.name, "{}", e);
                entries.push(entry.with_error(&e.to_string()));
            }
        }
    }
    Ok(entries)
}
