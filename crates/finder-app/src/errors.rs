//! Categorized application errors
//!
//! Provides the view-facing treatment of [`FinderError`]:
//! - Categorized error handling (input vs auth vs permission vs network)
//! - Appropriate toast severity routing
//! - User-visible messages, including server message bodies

use finder_core::{AuthFailure, FinderError};
use std::fmt;

// Re-export ToastLevel from views/notifications (single source of truth)
pub use crate::views::notifications::ToastLevel;

// ============================================================================
// Error Categories
// ============================================================================

/// High-level error categories for frontend error handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Form input errors (correctable by user)
    Input,
    /// Credential problems; the session is cleared and the user signs in again
    Auth,
    /// Signed in without the required role; handled as a redirect
    Permission,
    /// Connectivity failures (often transient)
    Network,
    /// The server refused the request
    Server,
    /// A duplicate submission was ignored
    Busy,
    /// Local plumbing failed (storage, decoding, stale references)
    Local,
}

impl ErrorCategory {
    /// Category of `error`.
    pub fn of(error: &FinderError) -> Self {
        match error {
            FinderError::Validation { .. } => Self::Input,
            FinderError::Auth { .. } => Self::Auth,
            FinderError::Permission { .. } => Self::Permission,
            FinderError::Network { .. } => Self::Network,
            FinderError::Server { .. } => Self::Server,
            FinderError::InProgress { .. } => Self::Busy,
            FinderError::NotFound { .. }
            | FinderError::Storage { .. }
            | FinderError::Serialization { .. } => Self::Local,
        }
    }

    /// Check if this error category is user-correctable.
    #[must_use]
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::Input | Self::Auth)
    }

    /// Check if this error category is likely transient.
    ///
    /// Transient errors may resolve when the user retries.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network | Self::Busy)
    }

    /// Whether the UI reacts with a redirect rather than a message.
    #[must_use]
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Permission)
    }

    /// Get the appropriate toast severity for this category.
    #[must_use]
    pub fn toast_severity(&self) -> ToastLevel {
        match self {
            Self::Input => ToastLevel::Warning,
            Self::Auth => ToastLevel::Error,
            Self::Permission => ToastLevel::Warning,
            Self::Network => ToastLevel::Warning,
            Self::Server => ToastLevel::Error,
            Self::Busy => ToastLevel::Info,
            Self::Local => ToastLevel::Error,
        }
    }

    /// Get a short label for this category.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Auth => "Authentication",
            Self::Permission => "Permission",
            Self::Network => "Network",
            Self::Server => "Server",
            Self::Busy => "Busy",
            Self::Local => "Error",
        }
    }

    /// Get a hint for the user on how to resolve this category of error.
    #[must_use]
    pub fn resolution_hint(&self) -> &'static str {
        match self {
            Self::Input => "Check the highlighted fields and try again",
            Self::Auth => "Please sign in again",
            Self::Permission => "This page requires administrator access",
            Self::Network => "Check your connection and retry",
            Self::Server => "The server could not complete the request",
            Self::Busy => "Please wait for the current request to finish",
            Self::Local => "An unexpected error occurred",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// User-visible messages
// ============================================================================

/// Message shown to the user for `error`.
///
/// Server messages are shown verbatim; everything else gets a plain sentence.
pub fn user_message(error: &FinderError) -> String {
    match error {
        FinderError::Validation { message, .. } => message.clone(),
        FinderError::Server { message, .. } => message.clone(),
        FinderError::Auth { reason, .. } => match reason {
            AuthFailure::InvalidCredentials => "Invalid username or password".to_string(),
            AuthFailure::InvalidToken => "Your session has expired. Please sign in again".to_string(),
            AuthFailure::MissingToken => "Login failed: the server issued no session".to_string(),
            AuthFailure::NotSignedIn => "Please sign in to continue".to_string(),
        },
        FinderError::Permission { .. } => ErrorCategory::Permission.resolution_hint().to_string(),
        FinderError::Network { .. } => {
            "Cannot reach the server. Check your connection and try again".to_string()
        }
        FinderError::InProgress { .. } => ErrorCategory::Busy.resolution_hint().to_string(),
        FinderError::NotFound { message } => message.clone(),
        FinderError::Storage { .. } | FinderError::Serialization { .. } => {
            ErrorCategory::Local.resolution_hint().to_string()
        }
    }
}

/// Message extracted from a non-success response body.
///
/// Accepts a JSON object with `message` or `error`, a JSON string, or plain
/// text. Falls back to a generic sentence naming the status.
pub fn server_message(status: u16, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return generic_server_message(status);
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => ["message", "error"]
            .iter()
            .find_map(|key| map.get(*key).and_then(|v| v.as_str()))
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| generic_server_message(status)),
        Ok(serde_json::Value::String(text)) if !text.trim().is_empty() => text,
        Ok(_) => generic_server_message(status),
        Err(_) if looks_like_markup(trimmed) => generic_server_message(status),
        Err(_) => trimmed.to_string(),
    }
}

fn generic_server_message(status: u16) -> String {
    format!("Request failed with status {status}")
}

fn looks_like_markup(body: &str) -> bool {
    body.starts_with('<')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(
            ErrorCategory::of(&FinderError::validation("title", "Title is required")),
            ErrorCategory::Input
        );
        assert_eq!(
            ErrorCategory::of(&FinderError::network("down")),
            ErrorCategory::Network
        );
        assert!(ErrorCategory::of(&FinderError::permission("no")).is_redirect());
        assert!(ErrorCategory::Network.is_transient());
        assert_eq!(ErrorCategory::Server.toast_severity(), ToastLevel::Error);
    }

    #[test]
    fn test_server_message_extraction() {
        assert_eq!(
            server_message(401, r#"{"error":"Invalid username or password"}"#),
            "Invalid username or password"
        );
        assert_eq!(
            server_message(400, r#"{"message":"Title too long","status":400}"#),
            "Title too long"
        );
        assert_eq!(server_message(400, "Username already exists"), "Username already exists");
        assert_eq!(server_message(500, r#""boom""#), "boom");
        assert_eq!(server_message(502, ""), "Request failed with status 502");
        assert_eq!(
            server_message(503, "<html>Bad Gateway</html>"),
            "Request failed with status 503"
        );
        assert_eq!(server_message(500, "[1,2]"), "Request failed with status 500");
    }

    #[test]
    fn test_user_message_passes_server_text_through() {
        let err = FinderError::server(409, "Item already claimed");
        assert_eq!(user_message(&err), "Item already claimed");
        let err = FinderError::validation("answer", "Please provide verification details");
        assert_eq!(user_message(&err), "Please provide verification details");
    }
}
