// src/exec/mod.rs

//! Process execution layer.
//!
//! This module drives shell processes with `tokio::process::Command` and
//! captures their output line by line.
//!
//! - [`queue`] is the per-stream line queue (unbounded, ordered).
//! - [`pump`] moves lines from a child's pipe into a queue.
//! - [`drain`] empties a queue into the [`sink`] and a result buffer.
//! - [`session`] owns one interactive shell and its shutdown sequence.
//! - [`oneshot`] is the blocking, non-interactive variant.
//! - [`output`] holds the result types returned to callers.

pub mod drain;
pub mod oneshot;
pub mod output;
pub mod pump;
pub mod queue;
pub mod session;
pub mod sink;

pub use oneshot::{run_oneshot, run_shell_oneshot};
pub use output::{OneShotOutput, SessionOutput};
pub use session::{Session, SessionBuilder, SessionFuture};
pub use sink::{LogSink, TracingSink};
