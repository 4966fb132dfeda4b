// src/exec/oneshot.rs

//! Blocking, non-interactive command runner.
//!
//! No streaming and no pumps: spawn, wait for exit, collect everything in one
//! go. Meant for quick local operations (listing a directory, removing a
//! temp dir) where a full [`Session`](crate::exec::Session) would be overkill.

use std::ffi::OsStr;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::errors::{Result, ShellmuxError};
use crate::exec::output::OneShotOutput;

/// Run `program` with `args` to completion and capture its output.
///
/// A non-zero exit is not an error; it is logged at `warn` with the command,
/// its return code and whatever it printed.
pub async fn run_oneshot<I, S>(program: &str, args: I) -> Result<OneShotOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<_> = args
        .into_iter()
        .map(|a| a.as_ref().to_os_string())
        .collect();

    let output = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|source| ShellmuxError::Spawn {
            program: program.to_string(),
            source,
        })?;

    let result = OneShotOutput {
        return_code: output.status.code().unwrap_or(-1),
        stdout: output.stdout,
        stderr: output.stderr,
    };

    let command_line = describe(program, &args);
    if result.success() {
        debug!(command = %command_line, "one-shot command succeeded");
    } else {
        warn!(
            command = %command_line,
            exit_code = result.return_code,
            stdout = %result.stdout_lossy().trim_end(),
            stderr = %result.stderr_lossy().trim_end(),
            "one-shot command failed"
        );
    }

    Ok(result)
}

/// Run a command line through `sh -c`.
pub async fn run_shell_oneshot(command: &str) -> Result<OneShotOutput> {
    run_oneshot("sh", ["-c", command]).await
}

fn describe(program: &str, args: &[std::ffi::OsString]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_and_code() {
        let out = run_shell_oneshot("echo hello; exit 4").await.unwrap();
        assert_eq!(out.return_code, 4);
        assert_eq!(out.stdout_lossy(), "hello\n");
        assert!(out.stderr.is_empty());
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let err = run_oneshot("definitely-not-a-real-binary-xyz", Vec::<String>::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ShellmuxError::Spawn { .. }));
    }

    #[test]
    fn describe_joins_args() {
        let args = vec!["-la".into(), "/tmp".into()];
        assert_eq!(describe("ls", &args), "ls -la /tmp");
    }
}
