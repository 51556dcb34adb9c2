use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use procgroup::errors::{ProcGroupError, Result};
use procgroup::{CommandSpec, Launcher, Scope, ScopeEnd};

/// What a fake command does once "launched".
#[derive(Debug, Clone, Copy)]
pub enum Behaviour {
    /// Exit successfully after the given delay.
    Succeed(Duration),
    /// Exit with `code` after `after`.
    Exit { after: Duration, code: i32 },
    /// Fail to start.
    LaunchError,
    /// Run until the scope ends.
    Hang,
}

/// How a fake command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observed {
    Succeeded,
    Exited(i32),
    LaunchFailed,
    Killed(ScopeEnd),
}

/// Shared record of what every fake command did.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<(String, Observed)>>>,
}

impl Journal {
    fn record(&self, command: &str, observed: Observed) {
        self.entries
            .lock()
            .unwrap()
            .push((command.to_string(), observed));
    }

    pub fn entries(&self) -> Vec<(String, Observed)> {
        self.entries.lock().unwrap().clone()
    }

    pub fn outcome_of(&self, command: &str) -> Option<Observed> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _)| name == command)
            .map(|(_, observed)| *observed)
    }
}

/// A launcher that never spawns a process.
///
/// Commands are matched by label (`name`, falling back to `path`); unknown
/// commands succeed immediately. Scope cancellation is honoured exactly like
/// the real launcher: the command stops and reports `Cancelled`.
#[derive(Debug, Default)]
pub struct FakeLauncher {
    behaviours: HashMap<String, Behaviour>,
    journal: Journal,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, command: &str, behaviour: Behaviour) -> Self {
        self.behaviours.insert(command.to_string(), behaviour);
        self
    }

    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }
}

impl Launcher for FakeLauncher {
    fn launch(
        &self,
        spec: CommandSpec,
        scope: Scope,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let command = spec.label().to_string();
        let behaviour = self
            .behaviours
            .get(&command)
            .copied()
            .unwrap_or(Behaviour::Succeed(Duration::ZERO));
        let journal = self.journal.clone();

        Box::pin(async move {
            if let Some(cause) = scope.end() {
                journal.record(&command, Observed::Killed(cause));
                return Err(ProcGroupError::Cancelled { command, cause });
            }

            let (after, code) = match behaviour {
                Behaviour::LaunchError => {
                    journal.record(&command, Observed::LaunchFailed);
                    return Err(ProcGroupError::Launch {
                        command,
                        source: io::Error::from(io::ErrorKind::NotFound),
                    });
                }
                Behaviour::Hang => {
                    let cause = scope.done().await;
                    journal.record(&command, Observed::Killed(cause));
                    return Err(ProcGroupError::Cancelled { command, cause });
                }
                Behaviour::Succeed(after) => (after, 0),
                Behaviour::Exit { after, code } => (after, code),
            };

            tokio::select! {
                biased;

                _ = tokio::time::sleep(after) => {
                    if code == 0 {
                        journal.record(&command, Observed::Succeeded);
                        Ok(())
                    } else {
                        journal.record(&command, Observed::Exited(code));
                        Err(ProcGroupError::Exited { command, code })
                    }
                }

                cause = scope.done() => {
                    journal.record(&command, Observed::Killed(cause));
                    Err(ProcGroupError::Cancelled { command, cause })
                }
            }
        })
    }
}
