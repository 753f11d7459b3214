//! Error types and exit codes for tenex-tools
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure (relay, IO, serialization)
//! - 2: Usage error (bad flags/args, invalid keys)
//! - 3: Data error (missing record, malformed snippet file)

mod macros;

use std::path::Path;
use thiserror::Error;

use crate::snippet::envelope::FormatError;

/// Exit codes for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage error - bad flags/args (2)
    Usage = 2,
    /// Data error - missing record, malformed file (3)
    Data = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<rusqlite::Error> for TenexError {
    fn from(err: rusqlite::Error) -> Self {
        TenexError::Database(err.to_string())
    }
}

/// Errors that can occur during tenex operations
#[derive(Error, Debug)]
pub enum TenexError {
    // Usage errors (exit code 2)
    #[error("unknown format: {0} (expected: human or json)")]
    UnknownFormat(String),

    #[error("{0}")]
    UsageError(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid {context}: {value}")]
    InvalidValue { context: String, value: String },

    // Data errors (exit code 3)
    #[error("{0}")]
    Format(#[from] FormatError),

    #[error("{context} not found: {value}")]
    NotFound { context: String, value: String },

    #[error("no signing key configured (run `tenex-tools setup --private-key <nsec>`)")]
    NoSigner,

    #[error("user \"{0}\" not found in config or missing nsec")]
    UnknownUser(String),

    // Generic failures (exit code 1)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("database error: {0}")]
    Database(String),

    #[error("relay error: {0}")]
    Relay(String),

    #[error("failed to {operation}: {reason}")]
    FailedOperation { operation: String, reason: String },

    #[error("timed out waiting for {0}")]
    Timeout(String),

    #[error("{0}")]
    Other(String),
}

impl TenexError {
    /// Create an error for a failed database operation
    pub fn db_operation(operation: &str, error: impl std::fmt::Display) -> Self {
        TenexError::FailedOperation {
            operation: operation.to_string(),
            reason: error.to_string(),
        }
    }

    /// Create an error for a failed IO operation on a path
    pub fn io_operation(operation: &str, path: &Path, error: impl std::fmt::Display) -> Self {
        TenexError::FailedOperation {
            operation: format!("{} {}", operation, path.display()),
            reason: error.to_string(),
        }
    }

    /// Create an error for an invalid value or configuration
    pub fn invalid_value(context: &str, value: impl std::fmt::Display) -> Self {
        TenexError::InvalidValue {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for an entity that was not found
    pub fn not_found(context: &str, value: impl std::fmt::Display) -> Self {
        TenexError::NotFound {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create a relay error
    pub fn relay(message: impl std::fmt::Display) -> Self {
        TenexError::Relay(message.to_string())
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            TenexError::UnknownFormat(_)
            | TenexError::UsageError(_)
            | TenexError::InvalidKey(_)
            | TenexError::InvalidValue { .. } => ExitCode::Usage,

            TenexError::Format(_)
            | TenexError::NotFound { .. }
            | TenexError::NoSigner
            | TenexError::UnknownUser(_) => ExitCode::Data,

            TenexError::Io(_)
            | TenexError::Json(_)
            | TenexError::Toml(_)
            | TenexError::Database(_)
            | TenexError::Relay(_)
            | TenexError::FailedOperation { .. }
            | TenexError::Timeout(_)
            | TenexError::Other(_) => ExitCode::Failure,
        }
    }

    /// Get the error type identifier
    pub fn error_type(&self) -> &'static str {
        match self {
            TenexError::UnknownFormat(_) => "unknown_format",
            TenexError::UsageError(_) => "usage_error",
            TenexError::InvalidKey(_) => "invalid_key",
            TenexError::InvalidValue { .. } => "invalid_value",
            TenexError::Format(_) => "format_error",
            TenexError::NotFound { .. } => "not_found",
            TenexError::NoSigner => "no_signer",
            TenexError::UnknownUser(_) => "unknown_user",
            TenexError::Io(_) => "io_error",
            TenexError::Json(_) => "json_error",
            TenexError::Toml(_) => "toml_error",
            TenexError::Database(_) => "database_error",
            TenexError::Relay(_) => "relay_error",
            TenexError::FailedOperation { .. } => "failed_operation",
            TenexError::Timeout(_) => "timeout",
            TenexError::Other(_) => "other",
        }
    }

    /// Convert error to JSON representation for structured error output.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.exit_code() as i32,
                "type": self.error_type(),
                "message": self.to_string(),
            }
        })
    }
}

/// Result type alias for tenex operations
pub type Result<T> = std::result::Result<T, TenexError>;
