// crates/test-utils/src/builders.rs

#![allow(dead_code)]

use shellmux::config::{ConfigFile, RawConfigFile};
use shellmux::types::Severity;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn program(mut self, program: &str) -> Self {
        self.config.shell.program = program.to_string();
        self
    }

    pub fn shell_args(mut self, args: &[&str]) -> Self {
        self.config.shell.args = args.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn inherit_env(mut self, inherit: bool) -> Self {
        self.config.shell.inherit_env = inherit;
        self
    }

    pub fn drain_grace_ms(mut self, ms: u64) -> Self {
        self.config.shell.drain_grace_ms = ms;
        self
    }

    pub fn activation(mut self, line: &str) -> Self {
        self.config.run.activation = Some(line.to_string());
        self
    }

    pub fn working_dir(mut self, dir: &str) -> Self {
        self.config.environment.working_dir = Some(dir.to_string());
        self
    }

    pub fn home_dir(mut self, dir: &str) -> Self {
        self.config.environment.home_dir = Some(dir.to_string());
        self
    }

    pub fn log_path(mut self, path: &str) -> Self {
        self.config.environment.log_path = Some(path.to_string());
        self
    }

    pub fn extra_env(mut self, key: &str, value: &str) -> Self {
        self.config
            .environment
            .extra
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn severities(mut self, stdout: Severity, stderr: Severity) -> Self {
        self.config.output.stdout_severity = stdout;
        self.config.output.stderr_severity = stderr;
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
