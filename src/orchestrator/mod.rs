// src/orchestrator/mod.rs

//! Runs one command through a fresh shell session.
//!
//! The orchestrator turns a config plus an [`EnvironmentSpec`] into a
//! [`SessionBuilder`], submits the optional activation line followed by the
//! command itself, and returns the aggregated output once the session has
//! fully drained.

pub mod env;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, Instrument};

use crate::config::ConfigFile;
use crate::errors::{Result, ShellmuxError};
use crate::exec::{LogSink, SessionBuilder, SessionOutput, TracingSink};

pub use env::EnvironmentSpec;

/// Per-run knobs that are not part of the config file.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Kill the shell when this fires. `None` waits for the shell however
    /// long it takes.
    pub cancel: Option<CancellationToken>,
}

#[derive(Clone)]
pub struct Orchestrator {
    config: ConfigFile,
    sink: Arc<dyn LogSink>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(config: ConfigFile) -> Self {
        Self {
            config,
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Environment described by the `[environment]` config section.
    pub fn environment(&self) -> EnvironmentSpec {
        EnvironmentSpec::from(&self.config.environment)
    }

    /// Lines submitted to the shell for `command_text`, in order.
    pub fn command_lines(&self, command_text: &str) -> Vec<String> {
        let mut lines = Vec::with_capacity(2);
        if let Some(activation) = &self.config.run.activation {
            lines.push(activation.clone());
        }
        lines.push(command_text.to_string());
        lines
    }

    /// Session builder for one run, before any per-run options.
    pub fn session_builder(&self, env: &EnvironmentSpec) -> SessionBuilder {
        let mut builder = SessionBuilder::from_config(&self.config)
            .sink(Arc::clone(&self.sink))
            .envs(env.to_env_map());
        if let Some(dir) = &env.working_dir {
            builder = builder.current_dir(dir);
        }
        builder
    }

    /// Run `command_text` in a fresh shell and return its aggregated output.
    ///
    /// A non-zero return code is data, not an error.
    pub async fn run(&self, command_text: &str, env: &EnvironmentSpec) -> Result<SessionOutput> {
        self.run_with_options(command_text, env, RunOptions::default())
            .await
    }

    pub async fn run_with_options(
        &self,
        command_text: &str,
        env: &EnvironmentSpec,
        options: RunOptions,
    ) -> Result<SessionOutput> {
        let span = info_span!("run", program = %self.config.shell.program);

        async {
            let mut builder = self.session_builder(env);
            if let Some(cancel) = options.cancel {
                builder = builder.cancel_token(cancel);
            }

            let lines = self.command_lines(command_text);
            info!(command = command_text, lines = lines.len(), "starting shell session");

            let session = builder.start(&lines).await?;
            let output = session.finish().await?;

            info!(
                exit_code = output.return_code,
                stdout_bytes = output.stdout.len(),
                stderr_bytes = output.stderr.len(),
                "shell session finished"
            );
            Ok::<_, ShellmuxError>(output)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawConfigFile;

    #[test]
    fn activation_line_comes_first() {
        let mut raw = RawConfigFile::default();
        raw.run.activation = Some(". venv/bin/activate".to_string());
        let orch = Orchestrator::new(ConfigFile::try_from(raw).unwrap());

        assert_eq!(
            orch.command_lines("ansible-playbook site.yml"),
            vec![". venv/bin/activate", "ansible-playbook site.yml"]
        );
    }

    #[test]
    fn no_activation_means_single_line() {
        let orch = Orchestrator::new(ConfigFile::default());
        assert_eq!(orch.command_lines("true"), vec!["true"]);
    }

    #[tokio::test]
    async fn runs_command_with_environment() {
        let orch = Orchestrator::new(ConfigFile::default());
        let env = EnvironmentSpec::default().extra("SHELLMUX_GREETING", "hi there");

        let out = orch
            .run("echo \"$SHELLMUX_GREETING\"; echo \"$ANSIBLE_HOST_KEY_CHECKING\"", &env)
            .await
            .unwrap();

        assert_eq!(out.return_code, 0);
        assert_eq!(out.stdout, "hi there\nFalse\n");
    }
}
