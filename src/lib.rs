// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod orchestrator;
pub mod types;

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cli::{CliArgs, CliCommand};
use crate::config::{default_config_path, load_and_validate, ConfigFile};
use crate::exec::run_oneshot;
use crate::orchestrator::{EnvironmentSpec, Orchestrator, RunOptions};

/// High-level entry point used by `main.rs`.
///
/// Returns the exit code the process should terminate with: the shell's (or
/// program's) own return code.
///
/// This wires together:
/// - config loading
/// - the orchestrator or the one-shot runner
/// - Ctrl-C and `--timeout` handling (both cancel the session)
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_config(args.config.as_deref())?;

    match args.command {
        CliCommand::Run {
            timeout,
            dry_run,
            command,
        } => {
            let command_text = command.join(" ");
            let orchestrator = Orchestrator::new(cfg);
            let env = orchestrator.environment();

            if dry_run {
                print_dry_run(&orchestrator, &env, &command_text);
                return Ok(0);
            }

            let cancel = CancellationToken::new();
            spawn_cancel_triggers(&cancel, timeout);

            let output = orchestrator
                .run_with_options(
                    &command_text,
                    &env,
                    RunOptions {
                        cancel: Some(cancel),
                    },
                )
                .await
                .with_context(|| format!("running '{command_text}'"))?;

            write_captured(output.stdout.as_bytes(), output.stderr.as_bytes())?;
            Ok(output.return_code)
        }
        CliCommand::Exec { program, args } => {
            let output = run_oneshot(&program, &args)
                .await
                .with_context(|| format!("executing '{program}'"))?;

            write_captured(&output.stdout, &output.stderr)?;
            Ok(output.return_code)
        }
    }
}

/// Resolve the config file.
///
/// - An explicit `--config` path must exist and validate.
/// - Without one, `Shellmux.toml` is used if present, else built-in defaults.
fn load_config(explicit: Option<&str>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        return load_and_validate(path).with_context(|| format!("loading config {path}"));
    }

    let default_path = default_config_path();
    if default_path.is_file() {
        load_and_validate(&default_path)
            .with_context(|| format!("loading config {}", default_path.display()))
    } else {
        debug!("no config file found; using built-in defaults");
        Ok(ConfigFile::default())
    }
}

/// Cancel the session on Ctrl-C, and after `timeout` if one was given.
fn spawn_cancel_triggers(cancel: &CancellationToken, timeout: Option<Duration>) {
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("Ctrl+C received; cancelling session");
            cancel.cancel();
        });
    }

    if let Some(timeout) = timeout {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            info!(timeout_ms = timeout.as_millis() as u64, "timeout elapsed; cancelling session");
            cancel.cancel();
        });
    }
}

fn write_captured(stdout: &[u8], stderr: &[u8]) -> Result<()> {
    let mut out = std::io::stdout().lock();
    out.write_all(stdout)?;
    out.flush()?;

    let mut err = std::io::stderr().lock();
    err.write_all(stderr)?;
    err.flush()?;
    Ok(())
}

/// Simple dry-run output: shell, environment and submitted lines.
fn print_dry_run(orchestrator: &Orchestrator, env: &EnvironmentSpec, command_text: &str) {
    let shell = &orchestrator.config().shell;

    println!("shellmux dry-run");
    println!("  shell: {} {}", shell.program, shell.args.join(" "));
    println!("  inherit_env: {}", shell.inherit_env);
    if let Some(dir) = &env.working_dir {
        println!("  working_dir: {}", dir.display());
    }
    println!();

    println!("environment:");
    for (key, value) in env.to_env_map() {
        println!("  {key}={value}");
    }
    println!();

    println!("lines:");
    for line in orchestrator.command_lines(command_text) {
        println!("  {line}");
    }

    debug!("dry-run complete (no execution)");
}
