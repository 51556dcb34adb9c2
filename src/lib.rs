// src/lib.rs

//! Run a group of external commands concurrently, fail fast.
//!
//! ```no_run
//! use std::time::Duration;
//! use procgroup::{run_all, CommandSpec, Scope};
//!
//! # async fn demo() -> procgroup::errors::Result<()> {
//! let scope = Scope::new();
//! run_all(
//!     &scope,
//!     vec![
//!         CommandSpec::new("sleep", Duration::from_secs(1), ["5"]),
//!         CommandSpec::new("sleep", Duration::ZERO, ["5"]),
//!     ],
//! )
//! .await
//! # }
//! ```

pub mod cli;
pub mod command;
pub mod config;
pub mod errors;
pub mod exec;
pub mod group;
pub mod logging;
pub mod scope;

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_and_validate, parse_duration, ConfigFile};

pub use crate::command::{CommandSpec, Input, Output};
pub use crate::errors::ProcGroupError;
pub use crate::exec::{Launcher, TokioLauncher};
pub use crate::group::{run_all, ProcessGroup};
pub use crate::scope::{Scope, ScopeEnd};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the outer scope (with the group deadline, if any)
/// - Ctrl-C handling, which cancels the outer scope
/// - the process group itself
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;

    let timeout = match args.timeout.as_deref() {
        Some(raw) => {
            let t = parse_duration(raw).map_err(|e| anyhow::anyhow!("--timeout: {e}"))?;
            anyhow::ensure!(!t.is_zero(), "--timeout must be greater than zero");
            Some(t)
        }
        None => cfg.timeout,
    };

    if args.dry_run {
        print_dry_run(&cfg, timeout);
        return Ok(());
    }

    let specs = cfg.command_specs()?;

    let scope = match timeout {
        Some(t) => Scope::with_timeout(t),
        None => Scope::new(),
    };

    // Ctrl-C → cancel the whole group.
    {
        let scope = scope.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("Ctrl-C received; cancelling process group");
            scope.cancel();
        });
    }

    run_all(&scope, specs).await?;
    Ok(())
}

/// Simple dry-run output: print the group deadline and every command.
fn print_dry_run(cfg: &ConfigFile, timeout: Option<Duration>) {
    println!("procgroup dry-run");
    match timeout {
        Some(t) => println!("  group.timeout = {:?}", t),
        None => println!("  group.timeout = none"),
    }
    println!();

    println!("commands ({}):", cfg.commands.len());
    for (name, cmd) in cfg.commands.iter() {
        println!("  - {name}");
        println!("      path: {}", cmd.path);
        if !cmd.args.is_empty() {
            println!("      args: {:?}", cmd.args);
        }
        if !cmd.timeout.is_zero() {
            println!("      timeout: {:?}", cmd.timeout);
        }
        if let Some(ref dir) = cmd.dir {
            println!("      dir: {}", dir.display());
        }
        if let Some(ref env) = cmd.env {
            let keys: Vec<_> = env.keys().collect();
            println!("      env: {:?}", keys);
        }
        println!("      stdin: {:?}", cmd.stdin);
        println!("      stdout: {:?}", cmd.stdout);
        println!("      stderr: {:?}", cmd.stderr);
    }

    debug!("dry-run complete (no execution)");
}
