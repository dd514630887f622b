//! CLI error type

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::export::ExportError;
use crate::introspect::IntrospectError;

/// Errors surfaced by CLI commands
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Introspect(#[from] IntrospectError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

impl CliError {
    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            CliError::Introspect(err) => err.user_message(),
            CliError::Config(err) => {
                format!("{err}\n\nHint: Check your --config file and environment variables.")
            }
            CliError::Write { path, message } => format!(
                "Failed to write {}: {message}\n\nHint: Check that the directory exists and is writable.",
                path.display()
            ),
            _ => self.to_string(),
        }
    }

    /// Whether the failure was a user-requested cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CliError::Introspect(err) if err.is_cancelled())
    }
}
