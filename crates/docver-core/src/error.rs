//! Error types for docver.

use thiserror::Error;

/// The shared error type for every docver crate.
///
/// Variants describe conditions that abort a workflow run. Per-group replay
/// failures are not errors; they are reported as data by the replay step.
#[derive(Error, Debug, Clone)]
pub enum DocverError {
    /// The request never produced an HTTP response (connection refused, DNS, TLS ...)
    #[error("Transport error during {operation}: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },

    /// A single request exceeded the configured request timeout
    #[error("Request timed out during {operation}")]
    Timeout { operation: &'static str },

    /// The whole run exceeded the configured run deadline
    #[error("Workflow exceeded the run deadline of {seconds}s")]
    DeadlineExceeded { seconds: u64 },

    /// The document stayed checked out after a forced release and one retry
    #[error("Document {document} is still checked out (status {status}) after forced release")]
    LockConflict { document: String, status: String },

    /// The server answered with a non-success status for a whole operation
    #[error("{operation} rejected with status {status}: {detail}")]
    Rejected {
        operation: &'static str,
        status: String,
        detail: String,
    },

    /// The response body could not be decoded into the expected shape
    #[error("Failed to decode {operation} response: {message} (body: {body})")]
    Decode {
        operation: &'static str,
        message: String,
        body: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (reading the check-in payload, config files)
    #[error("IO error: {message}")]
    Io { message: String },
}

impl DocverError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Transport error
    pub fn transport(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Transport {
            operation,
            message: message.into(),
        }
    }

    /// Creates a Rejected error carrying the raw server detail
    pub fn rejected(
        operation: &'static str,
        status: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::Rejected {
            operation,
            status: status.into(),
            detail: detail.into(),
        }
    }

    /// Creates a Decode error
    pub fn decode(
        operation: &'static str,
        message: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self::Decode {
            operation,
            message: message.into(),
            body: body.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this error came from the network layer rather than the server
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout { .. })
    }

    /// Check if this is a lock conflict that survived the retry
    pub fn is_lock_conflict(&self) -> bool {
        matches!(self, Self::LockConflict { .. })
    }

    /// Check if the server rejected a whole operation
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for DocverError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<toml::de::Error> for DocverError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid TOML: {}", err))
    }
}

/// A type alias for `Result<T, DocverError>`.
pub type Result<T> = std::result::Result<T, DocverError>;
