// src/exec/output.rs

//! Result types handed back to callers.

/// Aggregated result of one interactive session.
///
/// `stdout` and `stderr` hold every drained line of their stream, in stream
/// order, each followed by `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutput {
    pub return_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl SessionOutput {
    pub fn from_lines(return_code: i32, stdout: &[String], stderr: &[String]) -> Self {
        Self {
            return_code,
            stdout: join_lines(stdout),
            stderr: join_lines(stderr),
        }
    }

    pub fn success(&self) -> bool {
        self.return_code == 0
    }
}

fn join_lines(lines: &[String]) -> String {
    let mut text = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text
}

/// Result of a single blocking, non-interactive invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneShotOutput {
    pub return_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl OneShotOutput {
    pub fn success(&self) -> bool {
        self.return_code == 0
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}
