// src/exec/queue.rs

//! Per-stream line queue.
//!
//! A thin wrapper over an unbounded tokio mpsc channel. The producer half
//! belongs to a stream pump, the consumer half to a drain worker. Dropping
//! every [`LineSender`] closes the queue; once the remaining lines have been
//! received, [`LineReceiver::recv`] returns `None` forever. That is the
//! "exhausted" state: the producer has stopped and nothing is left.

use tokio::sync::mpsc;

/// Create a new, empty line queue.
pub fn line_queue() -> (LineSender, LineReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (LineSender { tx }, LineReceiver { rx })
}

/// Producer half of a line queue.
#[derive(Debug, Clone)]
pub struct LineSender {
    tx: mpsc::UnboundedSender<String>,
}

impl LineSender {
    /// Push a line. Returns `false` if the consumer has gone away.
    pub fn push(&self, line: String) -> bool {
        self.tx.send(line).is_ok()
    }
}

/// Consumer half of a line queue.
#[derive(Debug)]
pub struct LineReceiver {
    rx: mpsc::UnboundedReceiver<String>,
}

impl LineReceiver {
    /// Wait for the next line, or `None` once the queue is exhausted.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}
