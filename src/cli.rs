// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `procgroup`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "procgroup",
    version,
    about = "Run a group of commands concurrently; the first failure stops the rest.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Procgroup.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Procgroup.toml")]
    pub config: String,

    /// Deadline for the whole group (e.g. `30s`, `2m`).
    ///
    /// Overrides `[group].timeout` from the config file.
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PROCGROUP_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the commands, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = CliArgs::try_parse_from(["procgroup"]).unwrap();
        assert_eq!(args.config, "Procgroup.toml");
        assert!(args.timeout.is_none());
        assert!(args.log_level.is_none());
        assert!(!args.dry_run);
    }

    #[test]
    fn all_flags() {
        let args = CliArgs::try_parse_from([
            "procgroup",
            "--config",
            "ci/Group.toml",
            "--timeout",
            "2m",
            "--log-level",
            "debug",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(args.config, "ci/Group.toml");
        assert_eq!(args.timeout.as_deref(), Some("2m"));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
        assert!(args.dry_run);
    }
}
