//! Unified error system for the finder client
//!
//! Every component boundary that talks to the network or to durable storage
//! translates its failures into [`FinderError`] before they reach view logic.
//! The first five variants are the user-facing taxonomy; the remaining ones
//! cover local plumbing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an authentication attempt or credential was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthFailure {
    /// Username/password pair rejected by the server
    InvalidCredentials,
    /// Stored token rejected (expired, revoked or malformed)
    InvalidToken,
    /// Login succeeded but the server issued no credential token
    MissingToken,
    /// Operation requires a signed-in identity and there is none
    NotSignedIn,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::InvalidToken => write!(f, "invalid or expired token"),
            Self::MissingToken => write!(f, "no credential token issued"),
            Self::NotSignedIn => write!(f, "not signed in"),
        }
    }
}

/// Unified error type for all finder operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum FinderError {
    /// Authentication failed or the credential token is no longer valid
    #[error("Authentication failed ({reason}): {message}")]
    Auth {
        /// Failure reason
        reason: AuthFailure,
        /// Additional context
        message: String,
    },

    /// A required field is missing or a value is invalid
    #[error("{message}")]
    Validation {
        /// Form field the message refers to
        field: String,
        /// User-facing explanation
        message: String,
    },

    /// Signed in, but the identity's role does not allow the operation
    #[error("Permission denied: {message}")]
    Permission {
        /// Error message describing the permission issue
        message: String,
    },

    /// Transport failure: the request never produced an HTTP response
    #[error("Network error: {message}")]
    Network {
        /// Error message describing the network issue
        message: String,
    },

    /// The server answered with a non-success status
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body, or a generic one
        message: String,
    },

    /// Referenced record does not exist in local state
    #[error("Not found: {message}")]
    NotFound {
        /// Error message describing what was not found
        message: String,
    },

    /// The same mutating operation is already awaiting a response
    #[error("Already in progress: {operation}")]
    InProgress {
        /// Operation key that is still in flight
        operation: String,
    },

    /// Durable storage failed
    #[error("Storage error: {message}")]
    Storage {
        /// Error message describing the storage failure
        message: String,
    },

    /// A payload could not be encoded or decoded
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },
}

impl FinderError {
    /// Create an authentication error
    pub fn auth(reason: AuthFailure, message: impl Into<String>) -> Self {
        Self::Auth {
            reason,
            message: message.into(),
        }
    }

    /// Create a validation error for a form field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a permission error
    pub fn permission(message: impl Into<String>) -> Self {
        Self::Permission {
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a server error from a status code and message
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create an in-progress error for a duplicate submission
    pub fn in_progress(operation: impl Into<String>) -> Self {
        Self::InProgress {
            operation: operation.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// True when the server explicitly refused the request.
    ///
    /// Rejections (auth or any non-success status) invalidate a credential;
    /// transport failures and undecodable bodies do not.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Auth { .. } | Self::Server { .. })
    }

    /// True for credential and sign-in failures.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// True for transport failures that may succeed on retry.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// True for errors the user fixes by correcting input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// Standard Result type for finder operations
pub type Result<T> = std::result::Result<T, FinderError>;

impl From<serde_json::Error> for FinderError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
