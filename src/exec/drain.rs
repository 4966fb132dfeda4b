// src/exec/drain.rs

//! Drain worker: empties a line queue into the log sink and a result buffer.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::trace;

use crate::exec::queue::LineReceiver;
use crate::exec::sink::LogSink;
use crate::types::{Severity, StreamKind};

/// Spawn a drain task for one stream.
///
/// The task awaits lines until the queue is exhausted, i.e. its pump has
/// dropped the sender and every buffered line has been received. The joined
/// value is the full, ordered list of lines.
pub fn spawn_drain_worker(
    kind: StreamKind,
    receiver: LineReceiver,
    sink: Arc<dyn LogSink>,
    severity: Severity,
) -> JoinHandle<Vec<String>> {
    tokio::spawn(async move { drain_lines(kind, receiver, sink.as_ref(), severity).await })
}

/// Body of [`spawn_drain_worker`].
pub async fn drain_lines(
    kind: StreamKind,
    mut receiver: LineReceiver,
    sink: &dyn LogSink,
    severity: Severity,
) -> Vec<String> {
    let mut buffer = Vec::new();

    while let Some(line) = receiver.recv().await {
        sink.record(kind, &line, severity);
        buffer.push(line);
    }

    trace!(stream = %kind, lines = buffer.len(), "line queue exhausted");
    buffer
}
