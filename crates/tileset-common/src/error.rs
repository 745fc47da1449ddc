//! Error types for the tile server.

use thiserror::Error;

/// Result type alias using TileError.
pub type TileResult<T> = Result<T, TileError>;

/// Primary error type for tile and catalog operations.
///
/// Item-scoped variants (`InvalidAddress`, `NotFound`, `PermissionDenied`,
/// `MalformedContainer`) are turned into omissions or per-item error entries
/// by batch operations; the rest usually fail the whole call.
#[derive(Debug, Clone, Error)]
pub enum TileError {
    // === Request Errors ===
    #[error("Invalid tile address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Lookup Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // === Data Errors ===
    #[error("Malformed container {path}: {reason}")]
    MalformedContainer { path: String, reason: String },

    // === Infrastructure Errors ===
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl TileError {
    pub fn invalid_address(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn permission_denied(what: impl Into<String>) -> Self {
        Self::PermissionDenied(what.into())
    }

    pub fn conflict(what: impl Into<String>) -> Self {
        Self::Conflict(what.into())
    }

    /// Create a MalformedContainer error for the file at `path`.
    pub fn malformed(path: impl std::fmt::Display, reason: impl std::fmt::Display) -> Self {
        Self::MalformedContainer {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for failures that describe a single requested item rather than
    /// the service as a whole.
    pub fn is_item_scoped(&self) -> bool {
        matches!(
            self,
            TileError::InvalidAddress { .. }
                | TileError::NotFound(_)
                | TileError::PermissionDenied(_)
                | TileError::MalformedContainer { .. }
        )
    }

    /// Short machine-readable reason, used for per-item error entries.
    pub fn reason(&self) -> &'static str {
        match self {
            TileError::InvalidAddress { .. } => "invalid_address",
            TileError::InvalidParameter { .. } => "invalid_parameter",
            TileError::NotFound(_) => "not_found",
            TileError::PermissionDenied(_) => "permission_denied",
            TileError::Conflict(_) => "conflict",
            TileError::MalformedContainer { .. } => "malformed_container",
            TileError::Storage(_) => "storage_error",
            TileError::Database(_) => "database_error",
            TileError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            TileError::InvalidAddress { .. } | TileError::InvalidParameter { .. } => 400,

            TileError::PermissionDenied(_) => 403,
            TileError::NotFound(_) => 404,
            TileError::Conflict(_) => 409,

            TileError::MalformedContainer { .. }
            | TileError::Storage(_)
            | TileError::Database(_)
            | TileError::Internal(_) => 500,
        }
    }
}

// Conversion from common error types
impl From<std::io::Error> for TileError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            TileError::NotFound(err.to_string())
        } else {
            TileError::Storage(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TileError {
    fn from(err: serde_json::Error) -> Self {
        TileError::Internal(format!("JSON error: {}", err))
    }
}
