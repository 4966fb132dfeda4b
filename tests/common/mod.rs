// tests/common/mod.rs

#![allow(dead_code)]

pub use shellmux_test_utils::builders;
pub use shellmux_test_utils::{init_tracing, with_timeout, RecordingSink};

use std::sync::Arc;

use shellmux::exec::SessionBuilder;

/// `sh -e` session builder wired to a fresh recording sink.
pub fn recorded_shell() -> (SessionBuilder, RecordingSink) {
    let sink = RecordingSink::new();
    let builder = SessionBuilder::default().sink(Arc::new(sink.clone()));
    (builder, sink)
}
