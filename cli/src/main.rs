//! coretools CLI - runs the library self-check.
//!
//! ```text
//! main() -> load config -> init_tracing() -> selfcheck::run()
//!                                               |
//!                                               v
//!                       redirected print -> timed duration checks -> summary
//! ```
//!
//! Logs go to stderr (or the configured log file) so they never mix with
//! output sent through the redirect stack.

mod args;
mod selfcheck;

use std::env;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use coretools_config::{CoretoolsConfig, LoggingConfig};

use crate::args::{Args, USAGE};

fn init_tracing(logging: &LoggingConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(logging.filter()))
        .unwrap_or_else(|e| {
            warnings.push(format!("Invalid log filter '{}': {e}", logging.filter()));
            EnvFilter::new("warn")
        });

    if let Some(path) = logging.file() {
        match open_log_file(path) {
            Ok(file) => {
                tracing_subscriber::registry()
                    .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                    .with(env_filter)
                    .init();
                tracing::info!(path = %path.display(), "Logging initialized");
                return warnings;
            }
            Err(e) => warnings.push(format!("Failed to open log file {}: {e}", path.display())),
        }
    }

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
    warnings
}

fn open_log_file(path: &Path) -> io::Result<fs::File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn run(args: Args) -> Result<ExitCode> {
    // Tracing is not up yet; config problems are reported once it is.
    let (config, config_warning) = match CoretoolsConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (CoretoolsConfig::default(), Some(e)),
    };
    let config = args.apply(config);

    for warning in init_tracing(config.logging()) {
        tracing::warn!("{warning}");
    }
    if let Some(e) = config_warning {
        tracing::warn!("Using default config: {e}");
    }
    tracing::debug!(
        on_failure = %config.failure_mode(),
        report = %config.report_mode(),
        "Starting self-check"
    );

    let summary = selfcheck::run(&config, args.redirect.as_deref())
        .context("self-check could not run")?;

    if summary.failed == 0 {
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::error!(failed = summary.failed, total = summary.total, "Self-check failed");
        Ok(ExitCode::FAILURE)
    }
}

fn main() -> Result<ExitCode> {
    let args = match Args::parse(env::args().skip(1)) {
        Ok(Some(args)) => args,
        Ok(None) => {
            println!("{USAGE}");
            return Ok(ExitCode::SUCCESS);
        }
        Err(e) => {
            eprintln!("{e}\n\n{USAGE}");
            return Ok(ExitCode::from(2));
        }
    };
    run(args)
}
