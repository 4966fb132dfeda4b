// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::types::StreamKind;

#[derive(Error, Debug)]
pub enum ShellmuxError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("reading {stream} failed: {source}")]
    Stream {
        stream: StreamKind,
        #[source]
        source: std::io::Error,
    },

    #[error("session cancelled before the shell exited")]
    Cancelled,

    #[error("worker task failed: {0}")]
    Join(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<tokio::task::JoinError> for ShellmuxError {
    fn from(err: tokio::task::JoinError) -> Self {
        ShellmuxError::Join(err.to_string())
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ShellmuxError>;
