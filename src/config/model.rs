// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::types::Severity;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [shell]
/// program = "sh"
/// args = ["-e"]
///
/// [environment]
/// working_dir = "."
/// home_dir = "/home/deploy"
/// host_key_checking = false
/// log_path = "shellmux.log"
///
/// [output]
/// stdout_severity = "info"
/// stderr_severity = "warn"
///
/// [run]
/// activation = ". venv/bin/activate"
/// ```
///
/// All sections are optional and have reasonable defaults. This is the shape
/// straight out of `toml`; it becomes a [`ConfigFile`] only after validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub shell: ShellSection,

    #[serde(default)]
    pub environment: EnvironmentSection,

    #[serde(default)]
    pub output: OutputSection,

    #[serde(default)]
    pub run: RunSection,
}

/// Validated configuration. Construct through `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub shell: ShellSection,
    pub environment: EnvironmentSection,
    pub output: OutputSection,
    pub run: RunSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            shell: raw.shell,
            environment: raw.environment,
            output: raw.output,
            run: raw.run,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}

/// `[shell]` section: which interactive shell to drive.
#[derive(Debug, Clone, Deserialize)]
pub struct ShellSection {
    /// Shell executable, resolved through `PATH`.
    #[serde(default = "default_program")]
    pub program: String,

    /// Arguments passed to the shell. The default `-e` makes the shell abort
    /// on the first failing command.
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Start from the parent's environment (`true`) or from an empty one.
    #[serde(default = "default_inherit_env")]
    pub inherit_env: bool,

    /// How long a stream pump keeps waiting for more output once the shell
    /// has exited.
    #[serde(default = "default_drain_grace_ms")]
    pub drain_grace_ms: u64,
}

fn default_program() -> String {
    "sh".to_string()
}

fn default_args() -> Vec<String> {
    vec!["-e".to_string()]
}

fn default_inherit_env() -> bool {
    true
}

fn default_drain_grace_ms() -> u64 {
    500
}

impl ShellSection {
    pub fn drain_grace(&self) -> Duration {
        Duration::from_millis(self.drain_grace_ms)
    }
}

impl Default for ShellSection {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            inherit_env: default_inherit_env(),
            drain_grace_ms: default_drain_grace_ms(),
        }
    }
}

/// `[environment]` section.
///
/// These are the fixed keys handed to the shell as environment variables;
/// `extra` is merged on top of them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvironmentSection {
    #[serde(default)]
    pub working_dir: Option<String>,

    #[serde(default)]
    pub home_dir: Option<String>,

    #[serde(default)]
    pub host_key_checking: bool,

    #[serde(default)]
    pub log_path: Option<String>,

    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

/// `[output]` section: log severities for each captured stream.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_stdout_severity")]
    pub stdout_severity: Severity,

    #[serde(default = "default_stderr_severity")]
    pub stderr_severity: Severity,
}

fn default_stdout_severity() -> Severity {
    Severity::Info
}

fn default_stderr_severity() -> Severity {
    Severity::Warn
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            stdout_severity: default_stdout_severity(),
            stderr_severity: default_stderr_severity(),
        }
    }
}

/// `[run]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunSection {
    /// Line submitted before the command itself (e.g. sourcing a virtualenv).
    #[serde(default)]
    pub activation: Option<String>,
}
