//! Error types for the Brocade client.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`BrocadeError`] enum. Error kinds follow the failure taxonomy of a
//! request/response client: transport failures abort the operation,
//! not-found failures are non-fatal for cleanup flows, and per-item batch
//! failures are carried in batch outcomes rather than propagated.
//!
//! # Examples
//!
//! ```
//! use brocade::error::{BrocadeError, Result};
//!
//! fn cleanup_outcome(res: Result<()>) -> Result<()> {
//!     match res {
//!         // Deleting something that is already gone is fine during cleanup.
//!         Err(BrocadeError::NotFound(_)) | Ok(()) => Ok(()),
//!         Err(e) => Err(e),
//!     }
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Brocade operations.
///
/// Uses the `thiserror` crate for automatic `Error` trait implementation and
/// provides convenient constructor methods for the common kinds.
#[derive(Error, Debug)]
pub enum BrocadeError {
    /// Transport-level errors (server unreachable, malformed response, TLS).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Server error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The named collection or record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A collection with the given name already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Schema-related errors (invalid collection definition).
    #[error("Schema error: {0}")]
    Schema(String),

    /// Invalid operation or argument.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// I/O errors (reading payload files, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with [`BrocadeError`].
pub type Result<T> = std::result::Result<T, BrocadeError>;

impl BrocadeError {
    /// Create a new server error from a status code and message.
    pub fn api<S: Into<String>>(status: u16, message: S) -> Self {
        BrocadeError::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        BrocadeError::NotFound(msg.into())
    }

    /// Create a new already exists error.
    pub fn already_exists<S: Into<String>>(msg: S) -> Self {
        BrocadeError::AlreadyExists(msg.into())
    }

    /// Create a new schema error.
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        BrocadeError::Schema(msg.into())
    }

    /// Create a new invalid operation error.
    pub fn invalid_operation<S: Into<String>>(msg: S) -> Self {
        BrocadeError::InvalidOperation(msg.into())
    }

    /// Whether this error means the target did not exist.
    ///
    /// Cleanup flows treat this kind as non-fatal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BrocadeError::NotFound(_))
    }
}
