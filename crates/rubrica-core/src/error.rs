//! Error types and exit codes for rubrica
//!
//! Errors follow a small taxonomy that front ends map onto their own surface:
//! - not found (404): scope, rubric, nota or student absent
//! - conflict (409): duplicate name, already-registered member, reused rubric
//! - validation (400): malformed input, percentage out of range
//! - unauthorized (403): access-control denial on a scope
//! - internal (500): storage or mail failure
//!
//! Exit codes used by the CLI:
//! - 0: Success
//! - 1: Internal failure
//! - 2: Usage / validation error
//! - 3: Data error (not found, conflict)
//! - 4: Unauthorized

mod macros;

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the rubrica binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Internal failure (1)
    Failure = 1,
    /// Usage or validation error (2)
    Usage = 2,
    /// Not found or conflict (3)
    Data = 3,
    /// Access denied (4)
    Unauthorized = 4,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<rusqlite::Error> for RubricaError {
    fn from(err: rusqlite::Error) -> Self {
        RubricaError::Database(err.to_string())
    }
}

/// Errors that can occur during rubrica operations
#[derive(Error, Debug)]
pub enum RubricaError {
    // Usage / validation errors (400)
    #[error("{0}")]
    UsageError(String),

    #[error("invalid {context}: {value}")]
    InvalidValue { context: String, value: String },

    #[error("missing required field: {field}")]
    MissingField { field: String },

    // Data errors
    #[error("store not found (searched from {search_root:?})")]
    StoreNotFound { search_root: PathBuf },

    #[error("{context} not found: {value}")]
    NotFound { context: String, value: String },

    #[error("{context} already exists: {value}")]
    AlreadyExists { context: String, value: String },

    // Access control
    #[error("not allowed to {action}: {reason}")]
    Unauthorized { action: String, reason: String },

    // Internal failures (500)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("database error: {0}")]
    Database(String),

    #[error("mail delivery failed: {0}")]
    Mail(String),

    #[error("failed to {operation}: {reason}")]
    FailedOperation { operation: String, reason: String },

    #[error("{0}")]
    Other(String),
}

impl RubricaError {
    /// Create an error for a failed database operation
    pub fn db_operation(operation: &str, error: impl std::fmt::Display) -> Self {
        RubricaError::FailedOperation {
            operation: operation.to_string(),
            reason: error.to_string(),
        }
    }

    /// Create an error for an invalid value
    pub fn invalid_value(context: &str, value: impl std::fmt::Display) -> Self {
        RubricaError::InvalidValue {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for a missing required field
    pub fn missing_field(field: &str) -> Self {
        RubricaError::MissingField {
            field: field.to_string(),
        }
    }

    /// Create an error for an entity that already exists
    pub fn already_exists(context: &str, value: impl std::fmt::Display) -> Self {
        RubricaError::AlreadyExists {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for an entity that was not found
    pub fn not_found(context: &str, value: impl std::fmt::Display) -> Self {
        RubricaError::NotFound {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an access-control denial
    pub fn unauthorized(action: &str, reason: impl std::fmt::Display) -> Self {
        RubricaError::Unauthorized {
            action: action.to_string(),
            reason: reason.to_string(),
        }
    }

    /// HTTP-equivalent status for this error
    pub fn status(&self) -> u16 {
        match self {
            RubricaError::UsageError(_)
            | RubricaError::InvalidValue { .. }
            | RubricaError::MissingField { .. } => 400,

            RubricaError::Unauthorized { .. } => 403,

            RubricaError::StoreNotFound { .. } | RubricaError::NotFound { .. } => 404,

            RubricaError::AlreadyExists { .. } => 409,

            RubricaError::Io(_)
            | RubricaError::Json(_)
            | RubricaError::Toml(_)
            | RubricaError::Database(_)
            | RubricaError::Mail(_)
            | RubricaError::FailedOperation { .. }
            | RubricaError::Other(_) => 500,
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self.status() {
            400 => ExitCode::Usage,
            403 => ExitCode::Unauthorized,
            404 | 409 => ExitCode::Data,
            _ => ExitCode::Failure,
        }
    }

    /// Stable error type identifier
    pub fn error_type(&self) -> &'static str {
        match self {
            RubricaError::UsageError(_) => "usage_error",
            RubricaError::InvalidValue { .. } => "invalid_value",
            RubricaError::MissingField { .. } => "missing_field",
            RubricaError::StoreNotFound { .. } => "store_not_found",
            RubricaError::NotFound { .. } => "not_found",
            RubricaError::AlreadyExists { .. } => "already_exists",
            RubricaError::Unauthorized { .. } => "unauthorized",
            RubricaError::Io(_) => "io_error",
            RubricaError::Json(_) => "json_error",
            RubricaError::Toml(_) => "toml_error",
            RubricaError::Database(_) => "database_error",
            RubricaError::Mail(_) => "mail_error",
            RubricaError::FailedOperation { .. } => "failed_operation",
            RubricaError::Other(_) => "other",
        }
    }

    /// Message safe to show to a client.
    ///
    /// Internal failures are collapsed to a generic message; the detail only
    /// goes to the log.
    pub fn client_message(&self) -> String {
        if self.status() == 500 {
            "internal error".to_string()
        } else {
            self.to_string()
        }
    }

    /// Convert error to JSON representation for structured error output.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.exit_code() as i32,
                "status": self.status(),
                "type": self.error_type(),
                "message": self.client_message(),
            }
        })
    }
}

/// Result type alias for rubrica operations
pub type Result<T> = std::result::Result<T, RubricaError>;
