// src/exec/launcher.rs

//! Pluggable process-launch capability.
//!
//! The group runner talks to a `Launcher` instead of spawning processes
//! itself. Production code uses [`TokioLauncher`]; tests can provide a fake
//! that simulates exits and records which scopes were cancelled.

use std::future::Future;
use std::pin::Pin;

use crate::command::CommandSpec;
use crate::errors::Result;
use crate::scope::Scope;

use super::process::run_command;

/// Start a process described by a [`CommandSpec`] and supervise it until it
/// exits or its scope ends.
///
/// Implementations must honour the scope: once it is cancelled or its
/// deadline passes, the running process has to be stopped and the returned
/// future must resolve to [`crate::ProcGroupError::Cancelled`].
pub trait Launcher: Send + Sync {
    fn launch(
        &self,
        spec: CommandSpec,
        scope: Scope,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Launcher backed by `tokio::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioLauncher;

impl TokioLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl Launcher for TokioLauncher {
    fn launch(
        &self,
        spec: CommandSpec,
        scope: Scope,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(run_command(spec, scope))
    }
}
