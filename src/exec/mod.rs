// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`launcher`] provides the `Launcher` trait and the concrete
//!   `TokioLauncher` the group runner uses in production, and which tests can
//!   replace with a fake implementation.
//! - [`process`] runs one `CommandSpec` with `tokio::process::Command`, wires
//!   its streams, and kills it when its scope ends.

pub mod launcher;
pub mod process;

pub use launcher::{Launcher, TokioLauncher};
pub use process::run_command;
