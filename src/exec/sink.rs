// src/exec/sink.rs

//! Where drained lines go besides the result buffer.
//!
//! Drain workers talk to a `LogSink` instead of calling `tracing` directly so
//! tests (and callers that persist output elsewhere) can swap it out.

use tracing::{debug, error, info, trace, warn};

use crate::types::{Severity, StreamKind};

/// Receives each captured line together with its stream and severity.
///
/// Called from drain worker tasks, so implementations must be cheap and
/// must not block.
pub trait LogSink: Send + Sync {
    fn record(&self, stream: StreamKind, line: &str, severity: Severity);
}

/// Default sink: emits one `tracing` event per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record(&self, stream: StreamKind, line: &str, severity: Severity) {
        let stream = stream.as_str();
        match severity {
            Severity::Error => error!(stream, "{}", line),
            Severity::Warn => warn!(stream, "{}", line),
            Severity::Info => info!(stream, "{}", line),
            Severity::Debug => debug!(stream, "{}", line),
            Severity::Trace => trace!(stream, "{}", line),
        }
    }
}
