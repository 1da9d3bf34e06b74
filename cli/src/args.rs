use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use coretools_config::CoretoolsConfig;
use coretools_types::{FailureMode, ReportMode};

pub const USAGE: &str = "\
Usage: coretools [OPTIONS]

Options:
  --redirect <PATH>      Append the self-check greeting to PATH (default: coretools-selfcheck.txt)
  --on-failure <MODE>    log | panic | abort (overrides config)
  --report <MODE>        print | trace (overrides config)
  -h, --help             Show this help";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Args {
    pub redirect: Option<PathBuf>,
    pub on_failure: Option<FailureMode>,
    pub report: Option<ReportMode>,
}

impl Args {
    /// `Ok(None)` when help was requested.
    pub fn parse(mut raw: impl Iterator<Item = String>) -> Result<Option<Self>> {
        let mut args = Self::default();

        while let Some(arg) = raw.next() {
            let mut value = |flag: &str| {
                raw.next()
                    .with_context(|| format!("{flag} requires a value"))
            };
            match arg.as_str() {
                "-h" | "--help" => return Ok(None),
                "--redirect" => args.redirect = Some(PathBuf::from(value("--redirect")?)),
                "--on-failure" => args.on_failure = Some(value("--on-failure")?.parse()?),
                "--report" => args.report = Some(value("--report")?.parse()?),
                other => bail!("unexpected argument '{other}'"),
            }
        }

        Ok(Some(args))
    }

    pub fn apply(&self, mut config: CoretoolsConfig) -> CoretoolsConfig {
        if let Some(mode) = self.on_failure {
            config = config.with_failure_mode(mode);
        }
        if let Some(mode) = self.report {
            config = config.with_report_mode(mode);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use coretools_config::CoretoolsConfig;
    use coretools_types::{FailureMode, ReportMode};

    use super::Args;

    fn parse(raw: &[&str]) -> anyhow::Result<Option<Args>> {
        Args::parse(raw.iter().map(ToString::to_string))
    }

    #[test]
    fn no_arguments_is_default() {
        assert_eq!(parse(&[]).expect("parse"), Some(Args::default()));
    }

    #[test]
    fn help_short_circuits() {
        assert_eq!(parse(&["--report", "trace", "-h"]).expect("parse"), None);
    }

    #[test]
    fn all_flags() {
        let args = parse(&["--redirect", "out.txt", "--on-failure", "panic", "--report", "trace"])
            .expect("parse")
            .expect("not help");
        assert_eq!(args.redirect.as_deref(), Some(std::path::Path::new("out.txt")));
        assert_eq!(args.on_failure, Some(FailureMode::Panic));
        assert_eq!(args.report, Some(ReportMode::Trace));
    }

    #[test]
    fn missing_value_is_an_error() {
        let err = parse(&["--redirect"]).expect_err("missing value");
        assert_eq!(err.to_string(), "--redirect requires a value");
    }

    #[test]
    fn bad_mode_is_an_error() {
        assert!(parse(&["--on-failure", "explode"]).is_err());
    }

    #[test]
    fn flags_override_config() {
        let args = parse(&["--on-failure", "abort"]).expect("parse").expect("not help");
        let config = args.apply(CoretoolsConfig::default());
        assert_eq!(config.failure_mode(), FailureMode::Abort);
        assert_eq!(config.report_mode(), ReportMode::Print);
    }
}
