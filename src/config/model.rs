// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [group]
/// timeout = "30s"
///
/// [command.server]
/// path = "sleep"
/// args = ["5"]
/// timeout = "1s"
/// ```
///
/// All sections are optional at parse time; validation requires at least one
/// command.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// Group-wide settings from `[group]`.
    #[serde(default)]
    pub group: GroupSection,

    /// All commands from `[command.<name>]`, keyed by name.
    #[serde(default)]
    pub command: BTreeMap<String, CommandConfig>,
}

/// `[group]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct GroupSection {
    /// Deadline for the whole group (e.g. `"30s"`). Unset means no deadline.
    #[serde(default)]
    pub timeout: Option<String>,
}

/// `[command.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandConfig {
    /// Executable to run.
    pub path: String,

    #[serde(default)]
    pub args: Vec<String>,

    /// Per-command timeout (e.g. `"500ms"`).
    #[serde(default)]
    pub timeout: Option<String>,

    /// Working directory, relative to the config file's directory.
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Explicit environment. When present the inherited one is dropped.
    #[serde(default)]
    pub env: Option<BTreeMap<String, String>>,

    #[serde(default)]
    pub stdin: InputConfig,

    #[serde(default)]
    pub stdout: OutputConfig,

    #[serde(default)]
    pub stderr: OutputConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamMode {
    Null,
    Inherit,
}

/// `stdin = "null" | "inherit" | { file = "in.txt" }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum InputConfig {
    Mode(StreamMode),
    File { file: PathBuf },
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig::Mode(StreamMode::Null)
    }
}

/// `stdout = "null" | "inherit" | { file = "out.log", append = true }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OutputConfig {
    Mode(StreamMode),
    File {
        file: PathBuf,
        #[serde(default)]
        append: bool,
    },
}

impl Default for OutputConfig {
    /// Commands started from a config file show their output by default.
    fn default() -> Self {
        OutputConfig::Mode(StreamMode::Inherit)
    }
}

/// Validated configuration.
///
/// Only constructed through `TryFrom<RawConfigFile>` (see
/// [`crate::config::validate`]), so durations are already parsed and every
/// command has a non-empty path.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    /// Deadline for the whole group.
    pub timeout: Option<Duration>,

    /// Commands keyed by name.
    pub commands: BTreeMap<String, CommandEntry>,

    /// Directory relative `dir` and file paths are resolved against.
    pub base_dir: PathBuf,
}

/// One validated command.
#[derive(Debug, Clone)]
pub struct CommandEntry {
    pub path: String,
    pub args: Vec<String>,
    pub timeout: Duration,
    pub dir: Option<PathBuf>,
    pub env: Option<BTreeMap<String, String>>,
    pub stdin: InputConfig,
    pub stdout: OutputConfig,
    pub stderr: OutputConfig,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        timeout: Option<Duration>,
        commands: BTreeMap<String, CommandEntry>,
    ) -> Self {
        Self {
            timeout,
            commands,
            base_dir: PathBuf::from("."),
        }
    }

    /// Resolve relative paths against `dir` instead of the current directory.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }
}
