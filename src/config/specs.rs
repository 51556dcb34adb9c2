// src/config/specs.rs

//! Turning validated config entries into runnable [`CommandSpec`]s.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::command::{CommandSpec, Input, Output};
use crate::config::model::{CommandEntry, ConfigFile, InputConfig, OutputConfig, StreamMode};
use crate::errors::Result;

impl ConfigFile {
    /// Build one `CommandSpec` per configured command, in name order.
    ///
    /// Opens any files named in `stdin`/`stdout`/`stderr`, so this can fail
    /// with an IO error.
    pub fn command_specs(&self) -> Result<Vec<CommandSpec>> {
        self.commands
            .iter()
            .map(|(name, entry)| entry.to_spec(name, &self.base_dir))
            .collect()
    }
}

impl CommandEntry {
    pub fn to_spec(&self, name: &str, base_dir: &Path) -> Result<CommandSpec> {
        let mut spec = CommandSpec::new(self.path.clone(), self.timeout, self.args.clone())
            .name(name)
            .stdin(open_input(name, &self.stdin, base_dir)?)
            .stdout(open_output(name, "stdout", &self.stdout, base_dir)?)
            .stderr(open_output(name, "stderr", &self.stderr, base_dir)?);

        if let Some(dir) = &self.dir {
            spec = spec.current_dir(resolve(base_dir, dir));
        }
        if let Some(env) = &self.env {
            spec = spec.env_clear().envs(env.clone());
        }

        Ok(spec)
    }
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

fn open_input(name: &str, cfg: &InputConfig, base_dir: &Path) -> Result<Input> {
    Ok(match cfg {
        InputConfig::Mode(StreamMode::Null) => Input::Null,
        InputConfig::Mode(StreamMode::Inherit) => Input::Inherit,
        InputConfig::File { file } => {
            let path = resolve(base_dir, file);
            let f = File::open(&path)
                .with_context(|| format!("opening stdin {:?} for command '{}'", path, name))?;
            Input::File(f)
        }
    })
}

fn open_output(
    name: &str,
    stream: &str,
    cfg: &OutputConfig,
    base_dir: &Path,
) -> Result<Output> {
    Ok(match cfg {
        OutputConfig::Mode(StreamMode::Null) => Output::Null,
        OutputConfig::Mode(StreamMode::Inherit) => Output::Inherit,
        OutputConfig::File { file, append } => {
            let path = resolve(base_dir, file);
            let f = OpenOptions::new()
                .create(true)
                .write(true)
                .append(*append)
                .truncate(!*append)
                .open(&path)
                .with_context(|| {
                    format!("opening {} {:?} for command '{}'", stream, path, name)
                })?;
            Output::File(f)
        }
    })
}
