// src/config/mod.rs

//! TOML configuration for the `procgroup` binary.
//!
//! - [`model`] holds the serde structs (`RawConfigFile`) and the validated
//!   `ConfigFile`.
//! - [`validate`] converts raw into validated config via `TryFrom`.
//! - [`loader`] reads files from disk.
//! - [`specs`] turns validated entries into `CommandSpec`s.

pub mod duration;
pub mod loader;
pub mod model;
pub mod specs;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{default_config_path, load_and_validate, load_from_path, parse_str};
pub use model::{
    CommandConfig, CommandEntry, ConfigFile, GroupSection, InputConfig, OutputConfig,
    RawConfigFile, StreamMode,
};
