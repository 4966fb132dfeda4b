// crates/test-utils/src/recording_sink.rs

use std::sync::{Arc, Mutex};

use shellmux::exec::LogSink;
use shellmux::types::{Severity, StreamKind};

/// One line as seen by the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedLine {
    pub stream: StreamKind,
    pub line: String,
    pub severity: Severity,
}

/// A sink that records every line it is handed, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    lines: Arc<Mutex<Vec<RecordedLine>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<RecordedLine> {
        self.lines.lock().unwrap().clone()
    }

    /// Lines of one stream only, text only.
    pub fn texts(&self, stream: StreamKind) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.stream == stream)
            .map(|l| l.line.clone())
            .collect()
    }
}

impl LogSink for RecordingSink {
    fn record(&self, stream: StreamKind, line: &str, severity: Severity) {
        let mut guard = self.lines.lock().unwrap();
        guard.push(RecordedLine {
            stream,
            line: line.to_string(),
            severity,
        });
    }
}
