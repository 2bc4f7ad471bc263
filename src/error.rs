//! Error types for the Resource Directory
//!
//! Provides structured error types for the directory engine, the KV store
//! adapters, the provisioning-driver boundary and the REST edge.

use thiserror::Error;

/// Unified error type for the directory
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Directory Errors
    // =========================================================================
    #[error("Persistence failure on {operation} {kind}/{id}: {reason}")]
    Persistence {
        operation: String,
        kind: String,
        id: String,
        reason: String,
    },

    #[error("Resource not found: {kind}/{id}")]
    NotFound { kind: String, id: String },

    #[error("Malformed {kind} document: {reason}")]
    MalformedData { kind: String, reason: String },

    #[error("Operation {operation} not permitted on {kind}/{id}")]
    PermissionDenied {
        operation: String,
        kind: String,
        id: String,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // =========================================================================
    // Driver Errors
    // =========================================================================
    #[error("Capability not implemented by driver: {capability}")]
    NotImplemented { capability: String },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Transport / Parse Errors
    // =========================================================================
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a persistence error for an adapter failure
    pub fn persistence(
        operation: impl Into<String>,
        kind: impl Into<String>,
        id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::Persistence {
            operation: operation.into(),
            kind: kind.into(),
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Build a not-found error
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Build a permission-denied error
    pub fn permission_denied(
        operation: impl Into<String>,
        kind: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Error::PermissionDenied {
            operation: operation.into(),
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Build the sentinel returned for optional driver capabilities
    pub fn not_implemented(capability: impl Into<String>) -> Self {
        Error::NotImplemented {
            capability: capability.into(),
        }
    }

    /// Check if this error means the target does not exist (or is invisible)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Check if this error is transient
    ///
    /// The directory never retries; this only tells callers whether a retry
    /// on their side could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Persistence { .. } | Error::Http(_))
    }
}

/// Result type alias for the directory
pub type Result<T> = std::result::Result<T, Error>;
