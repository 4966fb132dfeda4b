// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, ShellmuxError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::ShellmuxError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_shell(cfg)?;
    validate_environment(cfg)?;
    validate_run(cfg)?;
    Ok(())
}

fn validate_shell(cfg: &RawConfigFile) -> Result<()> {
    if cfg.shell.program.trim().is_empty() {
        return Err(ShellmuxError::ConfigError(
            "[shell].program must not be empty".to_string(),
        ));
    }

    if cfg.shell.drain_grace_ms == 0 {
        return Err(ShellmuxError::ConfigError(
            "[shell].drain_grace_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_environment(cfg: &RawConfigFile) -> Result<()> {
    for key in cfg.environment.extra.keys() {
        if key.is_empty() || key.contains('=') || key.contains('\0') {
            return Err(ShellmuxError::ConfigError(format!(
                "[environment].extra has invalid variable name '{}'",
                key
            )));
        }
    }
    Ok(())
}

fn validate_run(cfg: &RawConfigFile) -> Result<()> {
    // Severities are strongly typed and validated during deserialization.
    if let Some(activation) = &cfg.run.activation {
        if activation.trim().is_empty() {
            return Err(ShellmuxError::ConfigError(
                "[run].activation must not be blank; omit it instead".to_string(),
            ));
        }
    }
    Ok(())
}
