//! Configuration loading for coretools.
//!
//! The config file lives at `~/.coretools/config.toml` unless
//! `CORETOOLS_CONFIG` points somewhere else:
//!
//! ```toml
//! [logging]
//! filter = "info"
//! file = "~/.coretools/coretools.log"
//!
//! [checks]
//! on_failure = "log"   # log | panic | abort
//!
//! [timer]
//! report = "print"     # print | trace
//! ```
//!
//! Raw deserialization structs (all `Option`) stay private; [`CoretoolsConfig`]
//! is the resolved form with every default applied.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use coretools_types::{FailureMode, ReportMode};
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_ENV: &str = "CORETOOLS_CONFIG";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{key} must not be empty")]
    Empty { key: &'static str },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    logging: Option<RawLogging>,
    checks: Option<RawChecks>,
    timer: Option<RawTimer>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLogging {
    filter: Option<String>,
    file: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawChecks {
    on_failure: Option<FailureMode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTimer {
    report: Option<ReportMode>,
}

/// Where and how much to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    filter: String,
    file: Option<PathBuf>,
}

impl LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `coretools_core=trace`.
    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Log file; `None` means stderr.
    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            file: None,
        }
    }
}

/// Resolved configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoretoolsConfig {
    logging: LoggingConfig,
    failure_mode: FailureMode,
    report_mode: ReportMode,
}

impl CoretoolsConfig {
    /// Load from [`CoretoolsConfig::path`]. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::resolve(raw, |name| env::var(name).ok())?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Parse TOML text, expanding `${VAR}` references with `lookup`.
    pub fn from_toml(
        content: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        Self::resolve(raw, lookup)
    }

    /// `$CORETOOLS_CONFIG`, else `~/.coretools/config.toml`.
    #[must_use]
    pub fn path() -> Option<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return Some(PathBuf::from(path));
        }
        dirs::home_dir().map(|home| home.join(".coretools").join("config.toml"))
    }

    fn resolve(
        raw: RawConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let logging = raw.logging.unwrap_or_default();

        let filter = match logging.filter {
            Some(filter) => {
                let filter = expand_env_vars(&filter, &lookup);
                if filter.trim().is_empty() {
                    return Err(ConfigError::Empty {
                        key: "logging.filter",
                    });
                }
                filter
            }
            None => DEFAULT_LOG_FILTER.to_string(),
        };

        let file = match logging.file {
            Some(file) => {
                let file = expand_env_vars(&file, &lookup);
                if file.trim().is_empty() {
                    return Err(ConfigError::Empty { key: "logging.file" });
                }
                Some(expand_home(&file))
            }
            None => None,
        };

        Ok(Self {
            logging: LoggingConfig { filter, file },
            failure_mode: raw.checks.and_then(|c| c.on_failure).unwrap_or_default(),
            report_mode: raw.timer.and_then(|t| t.report).unwrap_or_default(),
        })
    }

    #[must_use]
    pub fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    #[must_use]
    pub fn failure_mode(&self) -> FailureMode {
        self.failure_mode
    }

    #[must_use]
    pub fn report_mode(&self) -> ReportMode {
        self.report_mode
    }

    /// Override the configured failure mode (e.g. from a command-line flag).
    #[must_use]
    pub fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    #[must_use]
    pub fn with_report_mode(mut self, mode: ReportMode) -> Self {
        self.report_mode = mode;
        self
    }
}

/// Replace `${VAR}` with `lookup(VAR)`; unknown variables expand to nothing.
pub fn expand_env_vars(value: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let var = &after[..end];
                if !var.is_empty() {
                    out.push_str(&lookup(var).unwrap_or_default());
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(raw)
}
