// tests/property_ordering.rs

use proptest::prelude::*;
use shellmux::exec::SessionBuilder;

/// Shell-safe line contents: no quotes, no backslashes, no newlines.
fn line_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _.,:-]{0,24}"
}

/// A `printf` command that writes exactly `lines`, one per line.
fn printf_command(lines: &[String]) -> String {
    if lines.is_empty() {
        return "true".to_string();
    }
    let quoted: Vec<String> = lines.iter().map(|l| format!("'{l}'")).collect();
    format!("printf '%s\\n' {}", quoted.join(" "))
}

fn expected_text(lines: &[String]) -> String {
    lines.iter().map(|l| format!("{l}\n")).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn stdout_preserves_every_line_in_order(lines in proptest::collection::vec(line_strategy(), 0..64)) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let output = rt.block_on(async {
            let session = SessionBuilder::default()
                .start(&[printf_command(&lines)])
                .await?;
            session.finish().await
        }).unwrap();

        prop_assert_eq!(output.return_code, 0);
        prop_assert_eq!(output.stdout, expected_text(&lines));
        prop_assert_eq!(output.stderr, "");
    }

    #[test]
    fn streams_are_captured_independently(
        out in proptest::collection::vec(line_strategy(), 0..32),
        err in proptest::collection::vec(line_strategy(), 0..32),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let output = rt.block_on(async {
            let session = SessionBuilder::default()
                .start(&[
                    printf_command(&out),
                    format!("{{ {}; }} 1>&2", printf_command(&err)),
                    "exit 0".to_string(),
                ])
                .await?;
            session.finish().await
        }).unwrap();

        prop_assert_eq!(output.stdout, expected_text(&out));
        prop_assert_eq!(output.stderr, expected_text(&err));
    }
}

#[test]
fn printf_command_handles_empty_input() {
    assert_eq!(printf_command(&[]), "true");
    assert_eq!(
        printf_command(&["a b".to_string(), String::new()]),
        "printf '%s\\n' 'a b' ''"
    );
}
