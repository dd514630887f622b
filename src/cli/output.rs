//! Output destinations for the CLI

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::CliError;
use crate::export::OutputFormat;

/// Where generated content goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// Resolve a configured path; `-` is stdout, `None` a timestamped file
    pub fn resolve(path: Option<&Path>, format: OutputFormat, now: DateTime<Utc>) -> Self {
        match path {
            Some(p) if p.as_os_str() == "-" => OutputTarget::Stdout,
            Some(p) => OutputTarget::File(p.to_path_buf()),
            None => OutputTarget::File(default_output_path(format, now)),
        }
    }

    /// Write `content`, creating parent directories as needed
    pub fn write(&self, content: &str) -> Result<(), CliError> {
        match self {
            OutputTarget::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(content.as_bytes())
                    .and_then(|_| stdout.flush())
                    .map_err(|e| CliError::Write {
                        path: PathBuf::from("-"),
                        message: e.to_string(),
                    })
            }
            OutputTarget::File(path) => {
                if let Some(parent) = path.parent()
                    && !parent.as_os_str().is_empty()
                {
                    std::fs::create_dir_all(parent).map_err(|e| CliError::Write {
                        path: path.clone(),
                        message: e.to_string(),
                    })?;
                }
                std::fs::write(path, content).map_err(|e| CliError::Write {
                    path: path.clone(),
                    message: e.to_string(),
                })
            }
        }
    }
}

impl std::fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputTarget::Stdout => write!(f, "stdout"),
            OutputTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// `erd_<timestamp>.<ext>` in the working directory
pub fn default_output_path(format: OutputFormat, now: DateTime<Utc>) -> PathBuf {
    PathBuf::from(format!(
        "erd_{}.{}",
        now.format("%Y-%m-%d_%H-%M-%S-%3f"),
        format.extension()
    ))
}
