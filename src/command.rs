// src/command.rs

//! Description of one external command to run as part of a process group.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};

/// Where a process reads its standard input from.
#[derive(Default)]
pub enum Input {
    /// Read nothing (the null device).
    #[default]
    Null,
    /// Share the caller's standard input.
    Inherit,
    /// Connect an open file directly.
    File(File),
    /// Pump bytes from an async reader over a pipe.
    Reader(Box<dyn AsyncRead + Send + Unpin>),
}

/// Where a process writes its standard output or error.
///
/// A sink shared between several commands must serialise its own writes;
/// the group runner does not.
#[derive(Default)]
pub enum Output {
    /// Discard (the null device).
    #[default]
    Null,
    /// Share the caller's stream.
    Inherit,
    /// Connect an open file directly.
    File(File),
    /// Pump bytes from a pipe into an async writer.
    Writer(Box<dyn AsyncWrite + Send + Unpin>),
}

impl Input {
    pub fn reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Input::Reader(Box::new(reader))
    }

    /// The `Stdio` to hand to the OS. Readers get a pipe that the launcher
    /// feeds itself.
    pub(crate) fn into_stdio(self) -> (Stdio, Option<Box<dyn AsyncRead + Send + Unpin>>) {
        match self {
            Input::Null => (Stdio::null(), None),
            Input::Inherit => (Stdio::inherit(), None),
            Input::File(file) => (Stdio::from(file), None),
            Input::Reader(reader) => (Stdio::piped(), Some(reader)),
        }
    }
}

impl Output {
    pub fn writer<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Output::Writer(Box::new(writer))
    }

    pub(crate) fn into_stdio(self) -> (Stdio, Option<Box<dyn AsyncWrite + Send + Unpin>>) {
        match self {
            Output::Null => (Stdio::null(), None),
            Output::Inherit => (Stdio::inherit(), None),
            Output::File(file) => (Stdio::from(file), None),
            Output::Writer(writer) => (Stdio::piped(), Some(writer)),
        }
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Null => f.write_str("Null"),
            Input::Inherit => f.write_str("Inherit"),
            Input::File(file) => f.debug_tuple("File").field(file).finish(),
            Input::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Null => f.write_str("Null"),
            Output::Inherit => f.write_str("Inherit"),
            Output::File(file) => f.debug_tuple("File").field(file).finish(),
            Output::Writer(_) => f.write_str("Writer(..)"),
        }
    }
}

/// One external command, fully described.
///
/// Built with [`CommandSpec::new`] and the builder-style setters, then moved
/// into a [`crate::ProcessGroup`]. Nothing is validated up front: an empty or
/// missing `path` only shows up as a launch failure.
#[derive(Debug, Default)]
pub struct CommandSpec {
    /// Executable to run. Bare names are looked up on `PATH`; relative paths
    /// with a separator are taken relative to `dir` when it is set.
    pub path: String,
    /// Arguments after argv[0].
    pub args: Vec<String>,
    /// `None` inherits the caller's environment; `Some` replaces it entirely.
    pub env: Option<BTreeMap<String, String>>,
    /// `None` runs in the caller's working directory.
    pub dir: Option<PathBuf>,
    pub stdin: Input,
    pub stdout: Output,
    pub stderr: Output,
    /// Per-command deadline. Zero means the command is only bounded by the
    /// group's scope.
    pub timeout: Duration,
    /// Optional label for logs and errors; defaults to `path`.
    pub name: Option<String>,
}

impl CommandSpec {
    /// A command with no stream, environment or directory overrides.
    pub fn new<I, S>(path: impl Into<String>, timeout: Duration, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            args: args.into_iter().map(Into::into).collect(),
            timeout,
            ..Default::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set one variable. The first call switches the command from the
    /// inherited environment to an explicit one; later values for the same
    /// key replace earlier ones.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let env = self.env.get_or_insert_with(BTreeMap::new);
        for (k, v) in vars {
            env.insert(k.into(), v.into());
        }
        self
    }

    /// Run with an empty environment.
    pub fn env_clear(mut self) -> Self {
        self.env = Some(BTreeMap::new());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn stdin(mut self, input: Input) -> Self {
        self.stdin = input;
        self
    }

    pub fn stdout(mut self, output: Output) -> Self {
        self.stdout = output;
        self
    }

    pub fn stderr(mut self, output: Output) -> Self {
        self.stderr = output;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Label used in logs and errors.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.path)
    }

    /// The program to hand to the OS.
    ///
    /// `./tool` with `dir = "build"` becomes `build/./tool`; bare names and
    /// absolute paths are left alone.
    pub fn program(&self) -> PathBuf {
        let path = Path::new(&self.path);
        match &self.dir {
            Some(dir) if path.is_relative() && path.components().count() > 1 => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
