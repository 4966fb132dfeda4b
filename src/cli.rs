// src/cli.rs

//! CLI argument parsing using `clap`.

use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `shellmux`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "shellmux",
    version,
    about = "Drive a shell session and capture its stdout/stderr concurrently.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Shellmux.toml` in the current working directory. A missing
    /// default file means built-in defaults; an explicit path must exist.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SHELLMUX_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Run a command line inside an interactive shell session.
    Run {
        /// Kill the shell if it has not exited after this long
        /// (e.g. `250ms`, `30s`, `5m`, `1h`).
        #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
        timeout: Option<Duration>,

        /// Print the shell, environment and submitted lines, but don't run.
        #[arg(long)]
        dry_run: bool,

        /// Command words; joined with spaces into one command line.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Run a single program to completion without a shell session.
    Exec {
        program: String,

        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{s}' is too large"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_duration_units() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("3s"), Ok(Duration::from_secs(3)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("5d").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn oversized_duration_is_an_error() {
        let huge = format!("{}h", u64::MAX);
        assert!(parse_duration(&huge).unwrap_err().contains("too large"));
        assert_eq!(
            parse_duration(&format!("{}s", u64::MAX)),
            Ok(Duration::from_secs(u64::MAX))
        );
    }

    #[test]
    fn run_collects_trailing_words() {
        let args = CliArgs::try_parse_from([
            "shellmux", "run", "--timeout", "5s", "ls", "-la", "/tmp",
        ])
        .unwrap();

        match args.command {
            CliCommand::Run {
                timeout,
                dry_run,
                command,
            } => {
                assert_eq!(timeout, Some(Duration::from_secs(5)));
                assert!(!dry_run);
                assert_eq!(command, vec!["ls", "-la", "/tmp"]);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn exec_takes_program_and_args() {
        let args = CliArgs::try_parse_from(["shellmux", "exec", "ls", "-1"]).unwrap();
        match args.command {
            CliCommand::Exec { program, args } => {
                assert_eq!(program, "ls");
                assert_eq!(args, vec!["-1"]);
            }
            other => panic!("expected exec, got {other:?}"),
        }
    }

    #[test]
    fn run_requires_a_command() {
        assert!(CliArgs::try_parse_from(["shellmux", "run"]).is_err());
    }
}
