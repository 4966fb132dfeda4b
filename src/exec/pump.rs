// src/exec/pump.rs

//! Stream pump: moves lines from a child's output pipe into a line queue.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::errors::{Result, ShellmuxError};
use crate::exec::queue::LineSender;
use crate::types::StreamKind;

/// Spawn a pump task for one output stream.
///
/// The pump reads until end-of-stream or a read error. `stop` is fired by the
/// session once the shell has exited; from then on the pump keeps draining
/// what is still buffered in the pipe until `grace` has elapsed, then stops
/// regardless of whether the stream is still open or still producing. That
/// covers a descendant process holding the pipe open, or writing to it, after
/// the shell itself is gone.
///
/// The sender is dropped when the task ends, which closes the queue.
pub fn spawn_stream_pump<R>(
    kind: StreamKind,
    reader: R,
    sender: LineSender,
    stop: CancellationToken,
    grace: Duration,
) -> JoinHandle<Result<()>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move { pump_lines(kind, reader, sender, stop, grace).await })
}

/// Body of [`spawn_stream_pump`], usable directly on any reader.
pub async fn pump_lines<R>(
    kind: StreamKind,
    reader: R,
    sender: LineSender,
    stop: CancellationToken,
    grace: Duration,
) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    // Survives cancelled reads: `read_until` appends partial data here and
    // picks up where it left off on the next call.
    let mut buf = Vec::new();
    // Set once `stop` fires; one deadline for the whole remaining drain.
    let mut stop_at: Option<Instant> = None;
    let mut pushed = 0usize;

    loop {
        let read = tokio::select! {
            biased;

            () = sleep_until(stop_at.unwrap_or_else(Instant::now)), if stop_at.is_some() => {
                warn!(
                    stream = %kind,
                    grace_ms = grace.as_millis() as u64,
                    lines = pushed,
                    "stream still open after shell exit; stopping pump"
                );
                if !buf.is_empty() {
                    sender.push(take_line(&mut buf));
                }
                break;
            }

            () = stop.cancelled(), if stop_at.is_none() => {
                debug!(stream = %kind, "stop requested; draining remaining output");
                stop_at = Some(Instant::now() + grace);
                continue;
            }

            res = reader.read_until(b'\n', &mut buf) => res,
        };

        match read {
            Ok(0) => {
                debug!(stream = %kind, lines = pushed, "end of stream");
                break;
            }
            Ok(_) => {
                if !sender.push(take_line(&mut buf)) {
                    debug!(stream = %kind, "line queue closed; stopping pump");
                    break;
                }
                pushed += 1;
            }
            Err(source) => {
                warn!(stream = %kind, error = %source, "read from child stream failed");
                return Err(ShellmuxError::Stream {
                    stream: kind,
                    source,
                });
            }
        }
    }

    Ok(())
}

/// Turn the bytes read so far into a line, stripping the terminator.
fn take_line(buf: &mut Vec<u8>) -> String {
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    let line = String::from_utf8_lossy(buf).into_owned();
    buf.clear();
    line
}
