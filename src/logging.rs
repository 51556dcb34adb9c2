// src/logging.rs

//! `tracing` subscriber for the `procgroup` binary.
//!
//! `--log-level` sets one level for every target. Without it,
//! `PROCGROUP_LOG` is read as a full `EnvFilter` directive list, so
//! `PROCGROUP_LOG=procgroup::exec=trace,warn` narrows output to process
//! handling. Neither set means `info`.
//!
//! Output goes to stderr; stdout belongs to commands with `stdout = "inherit"`.

use anyhow::{Context, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

const ENV_VAR: &str = "PROCGROUP_LOG";

pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(ENV_VAR).ok();
    let filter = build_filter(cli_level, env.as_deref())?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> Result<EnvFilter> {
    if let Some(level) = cli_level {
        return Ok(EnvFilter::default().add_directive(level_filter(level).into()));
    }

    match env.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid {ENV_VAR} value '{directives}'")),
        None => Ok(EnvFilter::default().add_directive(LevelFilter::INFO.into())),
    }
}

fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    }
}
