// src/config/validate.rs

use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::duration::parse_duration;
use crate::config::model::{CommandConfig, CommandEntry, ConfigFile, RawConfigFile};
use crate::errors::{ProcGroupError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ProcGroupError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_commands(&raw)?;
        let timeout = validate_group(&raw)?;

        let mut commands = BTreeMap::new();
        for (name, cmd) in raw.command {
            let entry = validate_command(&name, cmd)?;
            commands.insert(name, entry);
        }

        Ok(ConfigFile::new_unchecked(timeout, commands))
    }
}

fn ensure_has_commands(cfg: &RawConfigFile) -> Result<()> {
    if cfg.command.is_empty() {
        return Err(ProcGroupError::ConfigError(
            "config must contain at least one [command.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_group(cfg: &RawConfigFile) -> Result<Option<Duration>> {
    let Some(raw) = cfg.group.timeout.as_deref() else {
        return Ok(None);
    };

    let timeout = parse_duration(raw).map_err(|e| {
        ProcGroupError::ConfigError(format!("[group].timeout is invalid: {e}"))
    })?;

    if timeout.is_zero() {
        return Err(ProcGroupError::ConfigError(
            "[group].timeout must be greater than zero; omit it for no deadline".to_string(),
        ));
    }

    Ok(Some(timeout))
}

fn validate_command(name: &str, cmd: CommandConfig) -> Result<CommandEntry> {
    if cmd.path.trim().is_empty() {
        return Err(ProcGroupError::ConfigError(format!(
            "command '{}' has an empty `path`",
            name
        )));
    }

    let timeout = match cmd.timeout.as_deref() {
        Some(raw) => parse_duration(raw).map_err(|e| {
            ProcGroupError::ConfigError(format!("command '{}' has invalid `timeout`: {}", name, e))
        })?,
        None => Duration::ZERO,
    };

    if let Some(env) = &cmd.env {
        if let Some(key) = env.keys().find(|k| k.is_empty() || k.contains('=')) {
            return Err(ProcGroupError::ConfigError(format!(
                "command '{}' has invalid environment variable name '{}'",
                name, key
            )));
        }
    }

    Ok(CommandEntry {
        path: cmd.path,
        args: cmd.args,
        timeout,
        dir: cmd.dir,
        env: cmd.env,
        stdin: cmd.stdin,
        stdout: cmd.stdout,
        stderr: cmd.stderr,
    })
}
