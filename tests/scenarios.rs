// tests/scenarios.rs
mod common;
use crate::common::{init_tracing, recorded_shell, with_timeout};

use std::error::Error;

use shellmux::exec::{run_oneshot, SessionBuilder};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn echo_hello_lands_on_stdout_only() -> TestResult {
    init_tracing();

    let session = SessionBuilder::default().start(&["echo hello"]).await?;
    let output = with_timeout(session.finish()).await?;

    assert_eq!(output.return_code, 0);
    assert_eq!(output.stdout, "hello\n");
    assert_eq!(output.stderr, "");
    Ok(())
}

#[tokio::test]
async fn stderr_and_explicit_exit_code_are_captured() -> TestResult {
    init_tracing();

    let session = SessionBuilder::default()
        .start(&["echo err 1>&2", "exit 3"])
        .await?;
    let output = with_timeout(session.finish()).await?;

    assert_eq!(output.return_code, 3);
    assert_eq!(output.stderr, "err\n");
    assert_eq!(output.stdout, "");
    Ok(())
}

#[tokio::test]
async fn failing_command_aborts_the_shell() -> TestResult {
    init_tracing();

    let session = SessionBuilder::default()
        .start(&["false", "echo unreachable"])
        .await?;
    let output = with_timeout(session.finish()).await?;

    assert_ne!(output.return_code, 0);
    assert_eq!(output.stdout, "");
    assert_eq!(output.stderr, "");
    Ok(())
}

#[tokio::test]
async fn exit_codes_are_reported_verbatim() -> TestResult {
    init_tracing();

    for code in [0, 1, 2, 127] {
        let session = SessionBuilder::default()
            .start(&["echo before".to_string(), format!("exit {code}")])
            .await?;
        let output = with_timeout(session.finish()).await?;

        assert_eq!(output.return_code, code, "exit {code}");
        assert_eq!(output.stdout, "before\n");
    }
    Ok(())
}

#[tokio::test]
async fn unknown_command_reports_127() -> TestResult {
    init_tracing();

    let session = SessionBuilder::default()
        .start(&["definitely-not-a-command-shellmux"])
        .await?;
    let output = with_timeout(session.finish()).await?;

    assert_eq!(output.return_code, 127);
    assert!(!output.stderr.is_empty(), "shell should complain on stderr");
    Ok(())
}

#[tokio::test]
async fn oneshot_listing_of_empty_dir_is_empty() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let output = run_oneshot("ls", [dir.path()]).await?;

    assert_eq!(output.return_code, 0);
    assert!(output.stdout.is_empty());
    Ok(())
}

#[tokio::test]
async fn oneshot_nonzero_exit_is_data() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("nope");
    let output = run_oneshot("ls", [missing.as_os_str()]).await?;

    assert_ne!(output.return_code, 0);
    assert!(!output.stderr.is_empty());
    Ok(())
}

#[tokio::test]
async fn many_lines_written_right_before_exit_are_all_kept() -> TestResult {
    init_tracing();

    let (builder, sink) = recorded_shell();
    let session = builder
        .start(&[
            "i=0; while [ $i -lt 2000 ]; do echo \"line $i\"; i=$((i+1)); done",
            "exit 0",
        ])
        .await?;
    let output = with_timeout(session.finish()).await?;

    let expected: String = (0..2000).map(|i| format!("line {i}\n")).collect();
    assert_eq!(output.stdout, expected);
    assert_eq!(sink.texts(shellmux::types::StreamKind::Stdout).len(), 2000);
    Ok(())
}
