// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Every failure a unit of a process group can produce maps to one variant
//! here. The group runner forwards the first one it observes untouched, so
//! callers can match on the variant to tell a launch failure from a non-zero
//! exit or a timeout.

use std::io;

use thiserror::Error;

use crate::scope::ScopeEnd;

#[derive(Error, Debug)]
pub enum ProcGroupError {
    /// The process could not be started at all (missing executable,
    /// permission denied, bad working directory, ...).
    #[error("failed to launch '{command}': {source}")]
    Launch {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The process ran and exited with a non-zero status code.
    #[error("'{command}' exited with status {code}")]
    Exited { command: String, code: i32 },

    /// The process was terminated by a signal it did not receive from us.
    #[error("'{command}' was terminated by signal {signal}")]
    Signaled { command: String, signal: i32 },

    /// Waiting on a started process failed.
    #[error("failed waiting for '{command}': {source}")]
    Wait {
        command: String,
        #[source]
        source: io::Error,
    },

    /// Forwarding data between a caller-supplied stream and the process failed.
    #[error("{stream} of '{command}' failed: {source}")]
    Stream {
        command: String,
        stream: &'static str,
        #[source]
        source: io::Error,
    },

    /// The process was killed because its scope ended first.
    #[error("'{command}' was killed: {cause}")]
    Cancelled { command: String, cause: ScopeEnd },

    /// A unit task panicked or was aborted.
    #[error("process group unit failed to complete: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProcGroupError {
    /// True if the process never started.
    pub fn is_launch(&self) -> bool {
        matches!(self, ProcGroupError::Launch { .. })
    }

    /// True if the process was killed because a deadline passed.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ProcGroupError::Cancelled {
                cause: ScopeEnd::DeadlineExceeded,
                ..
            }
        )
    }

    /// True for any scope-induced termination, timeout included.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ProcGroupError::Cancelled { .. })
    }

    /// Label of the command this error belongs to, if it came from a unit.
    pub fn command(&self) -> Option<&str> {
        match self {
            ProcGroupError::Launch { command, .. }
            | ProcGroupError::Exited { command, .. }
            | ProcGroupError::Signaled { command, .. }
            | ProcGroupError::Wait { command, .. }
            | ProcGroupError::Stream { command, .. }
            | ProcGroupError::Cancelled { command, .. } => Some(command),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProcGroupError>;
