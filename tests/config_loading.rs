// tests/config_loading.rs
mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use shellmux::config::{load_and_validate, load_from_path};
use shellmux::errors::ShellmuxError;
use shellmux::orchestrator::Orchestrator;
use shellmux::types::Severity;

type TestResult = Result<(), Box<dyn Error>>;

/// Sanity-check that configs/Shellmux.toml parses the way it reads.
#[test]
fn sample_config_is_parsed_correctly() -> TestResult {
    init_tracing();

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let cfg = load_and_validate(manifest_dir.join("configs/Shellmux.toml"))?;

    assert_eq!(cfg.shell.program, "sh");
    assert_eq!(cfg.shell.args, vec!["-e".to_string()]);
    assert_eq!(cfg.shell.drain_grace_ms, 250);
    assert_eq!(cfg.environment.working_dir.as_deref(), Some("/srv/deploy"));
    assert!(!cfg.environment.host_key_checking);
    assert_eq!(
        cfg.environment.extra.get("DEPLOY_STAGE").map(String::as_str),
        Some("staging")
    );
    assert_eq!(cfg.output.stdout_severity, Severity::Info);
    assert_eq!(cfg.output.stderr_severity, Severity::Warn);

    let orchestrator = Orchestrator::new(cfg);
    assert_eq!(
        orchestrator.command_lines("ansible-playbook site.yml"),
        vec![
            ". /srv/deploy/venv/bin/activate".to_string(),
            "ansible-playbook site.yml".to_string()
        ]
    );
    Ok(())
}

#[test]
fn empty_file_uses_defaults() -> TestResult {
    let file = NamedTempFile::new()?;
    let cfg = load_and_validate(file.path())?;

    assert_eq!(cfg.shell.program, "sh");
    assert_eq!(cfg.shell.drain_grace_ms, 500);
    assert!(cfg.shell.inherit_env);
    assert_eq!(cfg.output.stderr_severity, Severity::Warn);
    Ok(())
}

#[test]
fn unknown_severity_is_a_toml_error() -> TestResult {
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"
[output]
stdout_severity = "shouty"
"#
    )?;

    match load_from_path(file.path()) {
        Err(ShellmuxError::TomlError(_)) => Ok(()),
        other => panic!("expected TomlError, got {other:?}"),
    }
}

#[test]
fn zero_drain_grace_is_rejected() -> TestResult {
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"
[shell]
drain_grace_ms = 0
"#
    )?;

    match load_and_validate(file.path()) {
        Err(ShellmuxError::ConfigError(msg)) => {
            assert!(msg.contains("drain_grace_ms"));
            Ok(())
        }
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let result = load_and_validate("/definitely/not/here/Shellmux.toml");
    assert!(matches!(result, Err(ShellmuxError::IoError(_))));
}
