//! CLI-specific error types and exit code mapping

use cefpost_core::error::CefpostError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// One or more input lines were rejected by the parser.
    #[error("{failed} of {total} lines failed to parse")]
    ParseFailures { failed: usize, total: usize },

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from cefpost-core.
    #[error("{0}")]
    Core(#[from] CefpostError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                          |
    /// |------|----------------------------------|
    /// | 0    | Success                          |
    /// | 1    | General / command error          |
    /// | 2    | Configuration error              |
    /// | 5    | At least one line failed to parse |
    /// | 10   | IO error                         |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::ParseFailures { .. } => 5,
            Self::Io(_) => 10,
            Self::Core(core) => match core {
                CefpostError::Config(_) => 2,
                CefpostError::Parse(_) => 5,
                CefpostError::Io(_) => 10,
            },
            Self::JsonSerialize(_) | Self::Command(_) => 1,
        }
    }
}
