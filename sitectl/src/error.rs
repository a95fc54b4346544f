//! Typed failures that decide the process exit code.
//!
//! Everything else travels as `anyhow::Error` with context; `main` walks the
//! chain looking for a [`SiteError`] to pick the exit code.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SiteError {
    /// Missing or unrecognized command.
    #[error("usage: {reason}")]
    Usage { reason: String },

    /// The external program could not be started at all.
    #[error("failed to start `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external program ran and exited unsuccessfully.
    #[error("`{program}` exited with {}", describe_code(*.code))]
    ProcessFailed { program: String, code: Option<i32> },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl SiteError {
    pub fn usage(reason: impl Into<String>) -> Self {
        Self::Usage {
            reason: reason.into(),
        }
    }

    pub fn process_failed(program: impl Into<String>, code: Option<i32>) -> Self {
        Self::ProcessFailed {
            program: program.into(),
            code,
        }
    }
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}
