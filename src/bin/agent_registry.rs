//! agent-registry command-line tool.
//!
//! Validates manifests without resolving anything: resolution needs the
//! namespaces of an embedding program, which a standalone binary does not
//! have.
//!
//! # Usage
//!
//! ```bash
//! agent-registry check agents_registry.yaml          # agents manifest
//! agent-registry check tools_registry.yaml tools     # tools manifest
//! agent-registry version
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: tracing filter (overrides `LOG_LEVEL`)
//! - `LOG_LEVEL`: log level (default: "info")
//!
//! Exit status: 0 on success, 1 when the manifest is invalid, 2 on usage
//! errors.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};

use agent_registry::manifest::{ManifestKind, ManifestParser, MissingManifest};
use agent_registry::utilities::config::{LoggingConfig, RegistryConfig};
use agent_registry::utilities::errors::ConfigurationError;
use agent_registry::utilities::logger::init_logging;

const USAGE: &str =
    "usage: agent-registry check <manifest> [agents|tools]\n       agent-registry version";

#[derive(Debug, PartialEq)]
enum Command {
    Check { manifest: PathBuf, kind: ManifestKind },
    Version,
}

fn parse_command(args: &[String]) -> anyhow::Result<Command> {
    match args {
        [cmd] if matches!(cmd.as_str(), "version" | "--version" | "-v") => Ok(Command::Version),
        [cmd, manifest] if cmd == "check" => Ok(Command::Check {
            manifest: PathBuf::from(manifest),
            kind: ManifestKind::Agents,
        }),
        [cmd, manifest, kind] if cmd == "check" => Ok(Command::Check {
            manifest: PathBuf::from(manifest),
            kind: kind.parse::<ManifestKind>().map_err(anyhow::Error::msg)?,
        }),
        _ => bail!("unrecognised arguments: {:?}", args),
    }
}

fn check(manifest: PathBuf, kind: ManifestKind) -> anyhow::Result<()> {
    let document = ManifestParser::new(&manifest, kind)
        .with_missing_policy(MissingManifest::Fatal)
        .parse()
        .with_context(|| format!("invalid {} manifest {}", kind, manifest.display()))?;
    tracing::info!(
        "Manifest {} is valid ({} entries)",
        manifest.display(),
        document.entries.len()
    );
    println!("{}", document.render_plan());
    Ok(())
}

/// Logging settings to start with; a broken configuration falls back to
/// the defaults so the command itself still runs.
fn logging_config(
    config: std::result::Result<RegistryConfig, ConfigurationError>,
) -> LoggingConfig {
    match config {
        Ok(config) => config.logging,
        Err(e) => {
            eprintln!("warning: {}; using default logging", e);
            LoggingConfig::default()
        }
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_command(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("error: {}\n{}", e, USAGE);
            return ExitCode::from(2);
        }
    };

    init_logging(&logging_config(RegistryConfig::load(None)));

    let result = match command {
        Command::Version => {
            println!("agent-registry {}", agent_registry::VERSION);
            Ok(())
        }
        Command::Check { manifest, kind } => check(manifest, kind),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
