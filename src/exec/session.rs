// src/exec/session.rs

//! Interactive shell session.
//!
//! A [`Session`] owns one shell process for one invocation. Starting it wires
//! up a stream pump and a drain worker per output stream; commands are written
//! to the shell's stdin as newline-terminated text. Shutdown is always:
//!
//! 1. close stdin and wait for the shell to exit (`close`),
//! 2. tell the pumps the shell is gone (`stop` token),
//! 3. wait for the pumps to hit end-of-stream and for the drains to empty
//!    their queues (`finish`).
//!
//! Only after step 3 is the [`SessionOutput`] built, so nothing the shell
//! wrote before exiting is lost.

use std::collections::BTreeMap;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ConfigFile;
use crate::errors::{Result, ShellmuxError};
use crate::exec::drain::spawn_drain_worker;
use crate::exec::output::SessionOutput;
use crate::exec::pump::spawn_stream_pump;
use crate::exec::queue::line_queue;
use crate::exec::sink::{LogSink, TracingSink};
use crate::types::{Severity, StreamKind};

/// Boxed future returned by the body passed to [`Session::scoped`].
pub type SessionFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Configures and starts a [`Session`].
///
/// Every call to [`SessionBuilder::start`] spawns a fresh shell; sessions are
/// never reused.
#[derive(Clone)]
pub struct SessionBuilder {
    program: String,
    args: Vec<String>,
    envs: BTreeMap<String, String>,
    current_dir: Option<PathBuf>,
    inherit_env: bool,
    sink: Arc<dyn LogSink>,
    stdout_severity: Severity,
    stderr_severity: Severity,
    drain_grace: Duration,
    cancel: Option<CancellationToken>,
}

impl std::fmt::Debug for SessionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBuilder")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("envs", &self.envs)
            .field("current_dir", &self.current_dir)
            .field("inherit_env", &self.inherit_env)
            .field("drain_grace", &self.drain_grace)
            .finish_non_exhaustive()
    }
}

impl Default for SessionBuilder {
    /// `sh -e` with the inherited environment.
    fn default() -> Self {
        Self::new("sh").arg("-e")
    }
}

impl SessionBuilder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: BTreeMap::new(),
            current_dir: None,
            inherit_env: true,
            sink: Arc::new(TracingSink),
            stdout_severity: Severity::Info,
            stderr_severity: Severity::Warn,
            drain_grace: Duration::from_millis(500),
            cancel: None,
        }
    }

    /// Builder seeded from the `[shell]` and `[output]` config sections.
    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self::new(cfg.shell.program.clone())
            .args(cfg.shell.args.iter().cloned())
            .inherit_env(cfg.shell.inherit_env)
            .drain_grace(cfg.shell.drain_grace())
            .stdout_severity(cfg.output.stdout_severity)
            .stderr_severity(cfg.output.stderr_severity)
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.insert(key.into(), value.into());
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.envs
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn inherit_env(mut self, inherit: bool) -> Self {
        self.inherit_env = inherit;
        self
    }

    pub fn sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn stdout_severity(mut self, severity: Severity) -> Self {
        self.stdout_severity = severity;
        self
    }

    pub fn stderr_severity(mut self, severity: Severity) -> Self {
        self.stderr_severity = severity;
        self
    }

    pub fn drain_grace(mut self, grace: Duration) -> Self {
        self.drain_grace = grace;
        self
    }

    /// Opt-in cancellation. When the token fires while [`Session::close`] is
    /// waiting for the shell, the shell is killed and `close` returns
    /// [`ShellmuxError::Cancelled`]. Without a token, `close` waits forever.
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Spawn the shell, start the pumps and drains, then write `commands` to
    /// stdin in order.
    ///
    /// # Errors
    ///
    /// [`ShellmuxError::Spawn`] if the shell cannot be started;
    /// [`ShellmuxError::IoError`] if writing an initial command fails for a
    /// reason other than the shell having already exited.
    pub async fn start<S: AsRef<str>>(self, commands: &[S]) -> Result<Session> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if !self.inherit_env {
            cmd.env_clear();
        }
        cmd.envs(&self.envs);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| ShellmuxError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        let pid = child.id();

        info!(
            program = %self.program,
            args = ?self.args,
            pid = pid.unwrap_or(0),
            "shell session started"
        );

        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("shell stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("shell stderr was not captured"))?;

        let stop = CancellationToken::new();

        let (out_tx, out_rx) = line_queue();
        let (err_tx, err_rx) = line_queue();

        let pumps = vec![
            spawn_stream_pump(
                StreamKind::Stdout,
                stdout,
                out_tx,
                stop.clone(),
                self.drain_grace,
            ),
            spawn_stream_pump(
                StreamKind::Stderr,
                stderr,
                err_tx,
                stop.clone(),
                self.drain_grace,
            ),
        ];

        let drains = (
            spawn_drain_worker(
                StreamKind::Stdout,
                out_rx,
                Arc::clone(&self.sink),
                self.stdout_severity,
            ),
            spawn_drain_worker(
                StreamKind::Stderr,
                err_rx,
                Arc::clone(&self.sink),
                self.stderr_severity,
            ),
        );

        let mut session = Session {
            child,
            stdin,
            pid,
            state: SessionState::Open,
            stop,
            cancel: self.cancel,
            pumps,
            drains: Some(drains),
        };

        for command in commands {
            session.submit(command.as_ref()).await?;
        }

        Ok(session)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Open,
    /// The shell has been waited on; `code` is its exit code.
    Closed { code: i32 },
}

/// A running (or finished) interactive shell.
///
/// Dropping a session without calling [`Session::finish`] stops the pumps and
/// kills the shell.
pub struct Session {
    child: Child,
    stdin: Option<ChildStdin>,
    pid: Option<u32>,
    state: SessionState,
    stop: CancellationToken,
    cancel: Option<CancellationToken>,
    pumps: Vec<JoinHandle<Result<()>>>,
    drains: Option<(JoinHandle<Vec<String>>, JoinHandle<Vec<String>>)>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("pid", &self.pid)
            .field("state", &self.state)
            .field("stdin_open", &self.stdin.is_some())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn builder(program: impl Into<String>) -> SessionBuilder {
        SessionBuilder::new(program)
    }

    /// OS process id of the shell, if it was available at spawn time.
    pub fn id(&self) -> Option<u32> {
        self.pid
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, SessionState::Closed { .. })
    }

    /// Exit code of the shell; `None` until the session is closed.
    pub fn return_code(&self) -> Option<i32> {
        match self.state {
            SessionState::Open => None,
            SessionState::Closed { code } => Some(code),
        }
    }

    /// Write one command line to the shell.
    ///
    /// Does nothing (apart from logging) once stdin is closed, either by
    /// [`Session::close`] or because the shell stopped reading.
    pub async fn submit(&mut self, command: &str) -> Result<()> {
        let Some(stdin) = self.stdin.as_mut() else {
            debug!(pid = self.pid.unwrap_or(0), command, "stdin closed; command dropped");
            return Ok(());
        };

        match write_line(stdin, command).await {
            Ok(()) => {
                debug!(pid = self.pid.unwrap_or(0), command, "command submitted");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
                warn!(
                    pid = self.pid.unwrap_or(0),
                    command,
                    "shell is no longer reading stdin; command dropped"
                );
                self.stdin = None;
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Close stdin and wait for the shell to exit, returning its exit code.
    ///
    /// Idempotent: later calls return the recorded code without touching the
    /// process again.
    pub async fn close(&mut self) -> Result<i32> {
        if let SessionState::Closed { code } = self.state {
            return Ok(code);
        }

        // EOF on stdin ends the shell's command loop.
        drop(self.stdin.take());

        let pid = self.pid.unwrap_or(0);
        let cancel = self.cancel.clone();

        let status = match cancel {
            None => self.child.wait().await?,
            Some(cancel) => {
                tokio::select! {
                    biased;

                    status = self.child.wait() => status?,

                    () = cancel.cancelled() => {
                        warn!(pid, "cancellation requested; killing shell");
                        self.child.kill().await?;
                        let status = self.child.wait().await?;
                        self.state = SessionState::Closed { code: exit_code(status) };
                        return Err(ShellmuxError::Cancelled);
                    }
                }
            }
        };

        let code = exit_code(status);
        self.state = SessionState::Closed { code };
        info!(pid, exit_code = code, success = status.success(), "shell exited");
        Ok(code)
    }

    /// Close (if needed), let every captured line drain, and build the
    /// aggregated result.
    ///
    /// # Errors
    ///
    /// Errors from `close` or from a failed stream read are returned only
    /// after the pumps and drains have finished. If the cancel token fires
    /// while a pump is still draining, that pump is aborted and
    /// [`ShellmuxError::Cancelled`] is returned.
    pub async fn finish(mut self) -> Result<SessionOutput> {
        let closed = self.close().await;
        if closed.is_err() && !self.is_closed() {
            // Waiting failed; make sure the pipes close so the pumps end.
            let _ = self.child.start_kill();
        }

        self.stop.cancel();

        let mut stream_error = None;
        let mut pumps_cancelled = false;
        for pump in std::mem::take(&mut self.pumps) {
            let Some(res) = join_pump(pump, self.cancel.as_ref()).await else {
                warn!(
                    pid = self.pid.unwrap_or(0),
                    "cancellation requested while draining; abandoning stream"
                );
                pumps_cancelled = true;
                continue;
            };
            if let Err(err) = res {
                warn!(pid = self.pid.unwrap_or(0), error = %err, "stream pump failed");
                if stream_error.is_none() {
                    stream_error = Some(err);
                }
            }
        }

        let (stdout, stderr) = match self.drains.take() {
            Some((out, err)) => (out.await?, err.await?),
            None => (Vec::new(), Vec::new()),
        };

        debug!(
            pid = self.pid.unwrap_or(0),
            stdout_lines = stdout.len(),
            stderr_lines = stderr.len(),
            "session drained"
        );

        let code = closed?;
        if pumps_cancelled {
            return Err(ShellmuxError::Cancelled);
        }
        if let Some(err) = stream_error {
            return Err(err);
        }

        Ok(SessionOutput::from_lines(code, &stdout, &stderr))
    }

    /// Run `body` against the session, then always shut it down.
    ///
    /// If `body` fails, its error is returned once the shutdown sequence has
    /// completed.
    ///
    /// ```no_run
    /// # async fn demo() -> shellmux::errors::Result<()> {
    /// use shellmux::exec::SessionBuilder;
    ///
    /// let session = SessionBuilder::default().start(&["echo one"]).await?;
    /// let ((), output) = session
    ///     .scoped(|s| Box::pin(async move { s.submit("echo two").await }))
    ///     .await?;
    /// assert_eq!(output.stdout, "one\ntwo\n");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn scoped<T, F>(mut self, body: F) -> Result<(T, SessionOutput)>
    where
        F: for<'a> FnOnce(&'a mut Session) -> SessionFuture<'a, T>,
    {
        let outcome = body(&mut self).await;
        let output = self.finish().await;

        match (outcome, output) {
            (Ok(value), Ok(output)) => Ok((value, output)),
            (Err(err), _) => Err(err),
            (Ok(_), Err(err)) => Err(err),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop.cancel();
        if !self.is_closed() {
            debug!(pid = self.pid.unwrap_or(0), "session dropped while open; killing shell");
            let _ = self.child.start_kill();
        }
    }
}

/// Wait for a pump to end. With a cancel token, returns `None` once the token
/// fires first; the pump is aborted, which drops its sender.
async fn join_pump(
    mut pump: JoinHandle<Result<()>>,
    cancel: Option<&CancellationToken>,
) -> Option<Result<()>> {
    let joined = match cancel {
        None => (&mut pump).await,
        Some(cancel) => {
            tokio::select! {
                biased;

                joined = &mut pump => joined,

                () = cancel.cancelled() => {
                    pump.abort();
                    let _ = pump.await;
                    return None;
                }
            }
        }
    };
    Some(joined.unwrap_or_else(|join| Err(join.into())))
}

async fn write_line(stdin: &mut ChildStdin, line: &str) -> io::Result<()> {
    let mut bytes = Vec::with_capacity(line.len() + 1);
    bytes.extend_from_slice(line.as_bytes());
    bytes.push(b'\n');
    stdin.write_all(&bytes).await?;
    stdin.flush().await
}

/// Exit code, or `-1` when the process was terminated by a signal.
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
