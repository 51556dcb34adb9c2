// src/group.rs

//! Fail-fast execution of a group of commands.
//!
//! Every command runs in its own Tokio task, bound to a scope derived from a
//! shared group scope. The first failure observed cancels the group scope,
//! which in turn cancels every sibling's scope and makes the launcher kill
//! the sibling processes. The call returns only after every unit finished.

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::command::CommandSpec;
use crate::errors::{ProcGroupError, Result};
use crate::exec::{Launcher, TokioLauncher};
use crate::scope::Scope;

/// Runs batches of commands concurrently through a [`Launcher`].
pub struct ProcessGroup<L: Launcher + 'static = TokioLauncher> {
    launcher: Arc<L>,
}

impl<L: Launcher + 'static> fmt::Debug for ProcessGroup<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessGroup").finish_non_exhaustive()
    }
}

impl Default for ProcessGroup<TokioLauncher> {
    fn default() -> Self {
        Self::new(TokioLauncher::new())
    }
}

impl<L: Launcher + 'static> ProcessGroup<L> {
    pub fn new(launcher: L) -> Self {
        Self {
            launcher: Arc::new(launcher),
        }
    }

    /// Run all `specs` concurrently under `scope` and return the first error.
    ///
    /// - Each command gets its own child scope of a group scope derived from
    ///   `scope`; a non-zero `timeout` adds a deadline to that child.
    /// - The first error observed cancels the group scope, so the remaining
    ///   processes are killed. Errors of units that fail afterwards (usually
    ///   because they were killed) are discarded.
    /// - Cancelling `scope` from outside has the same effect as a failure.
    /// - `scope` itself is never cancelled by this call.
    ///
    /// Blocks until every command has finished.
    pub async fn run(&self, scope: &Scope, specs: Vec<CommandSpec>) -> Result<()> {
        if specs.is_empty() {
            debug!("empty process group; nothing to run");
            return Ok(());
        }

        let group = scope.child();
        let total = specs.len();
        info!(commands = total, "starting process group");

        let mut units = JoinSet::new();
        for spec in specs {
            // Always a releasable child, even without a timeout, so every
            // unit can be cancelled the moment it is done.
            let unit = group.child_with_timeout(spec.timeout);
            let launcher = Arc::clone(&self.launcher);

            units.spawn(async move {
                let outcome = launcher.launch(spec, unit.clone()).await;
                unit.cancel();
                outcome
            });
        }

        let mut first_error: Option<ProcGroupError> = None;
        let mut finished = 0usize;

        while let Some(joined) = units.join_next().await {
            finished += 1;
            let outcome = joined.map_err(ProcGroupError::from).and_then(|res| res);

            let Err(err) = outcome else {
                debug!(finished, total, "process group unit succeeded");
                continue;
            };

            if first_error.is_none() {
                info!(
                    error = %err,
                    finished,
                    total,
                    "process group unit failed; cancelling remaining units"
                );
                group.cancel();
                first_error = Some(err);
            } else {
                debug!(error = %err, finished, total, "discarding later unit error");
            }
        }

        group.cancel();

        match first_error {
            Some(err) => Err(err),
            None => {
                info!(commands = total, "process group finished successfully");
                Ok(())
            }
        }
    }
}

/// Run `specs` with the default [`TokioLauncher`].
pub async fn run_all(scope: &Scope, specs: Vec<CommandSpec>) -> Result<()> {
    ProcessGroup::<TokioLauncher>::default()
        .run(scope, specs)
        .await
}
