//! Authorization gate for screens and operations.
//!
//! This module owns every role decision the client makes:
//! - [`is_admin_role`]: the single, case-insensitive role comparison
//! - [`AccessRequirement`]: what a destination demands of the session
//! - [`evaluate`] / [`check`]: the gate decision for a navigation attempt
//! - `require_*` helpers: pre-checks for workflows
//!
//! Decisions are pure functions of the session snapshot passed in and are
//! never cached; the router calls [`check`] on every navigation.

use crate::session::SessionSnapshot;
use finder_core::{AuthFailure, FinderError, User};
use std::fmt;

/// Role string the server issues to administrators.
pub const ADMIN_ROLE: &str = "admin";

// ============================================================================
// Role comparison
// ============================================================================

/// True when `role` names the administrator role, ignoring case and
/// surrounding whitespace.
#[inline]
pub fn is_admin_role(role: Option<&str>) -> bool {
    role.is_some_and(|r| r.trim().eq_ignore_ascii_case(ADMIN_ROLE))
}

/// True when `identity` is present and holds the administrator role.
#[inline]
pub fn is_admin(identity: Option<&User>) -> bool {
    identity.is_some_and(|user| is_admin_role(user.role.as_deref()))
}

// ============================================================================
// Access requirements
// ============================================================================

/// What a destination requires of the current session.
///
/// Levels are ordered: Public < Authenticated < Admin
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccessRequirement {
    /// Anyone, signed in or not
    Public,
    /// Any signed-in identity
    Authenticated,
    /// Signed-in identity with the administrator role
    Admin,
}

impl AccessRequirement {
    /// Check if this level requires a signed-in identity.
    #[inline]
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Self::Public)
    }

    /// Check if this level requires administrator privileges.
    #[inline]
    pub fn requires_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Get a short label for logging/display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Public => "PUBLIC",
            Self::Authenticated => "AUTHENTICATED",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for AccessRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Gate decisions
// ============================================================================

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateDecision {
    /// Render the destination
    Allow,
    /// No identity; go to the login screen
    RedirectToLogin,
    /// Identity lacks the administrator role; go home
    RedirectToHome,
    /// Identity resolution still running; render a neutral loading state
    Suspend,
}

impl GateDecision {
    /// True only for [`GateDecision::Allow`].
    pub fn is_allowed(self) -> bool {
        self == Self::Allow
    }
}

/// Gate decision for a resolved session.
///
/// Requiring the admin role implies requiring authentication, so an absent
/// identity always goes to login first.
pub fn evaluate(identity: Option<&User>, requires_auth: bool, requires_admin: bool) -> GateDecision {
    match identity {
        None if requires_auth || requires_admin => GateDecision::RedirectToLogin,
        Some(user) if requires_admin && !is_admin_role(user.role.as_deref()) => {
            GateDecision::RedirectToHome
        }
        _ => GateDecision::Allow,
    }
}

/// Gate decision for the current session snapshot.
///
/// Never redirects while the session is still resolving.
pub fn check(snapshot: &SessionSnapshot, requirement: AccessRequirement) -> GateDecision {
    if snapshot.is_loading() {
        return GateDecision::Suspend;
    }
    evaluate(
        snapshot.identity(),
        requirement.requires_auth(),
        requirement.requires_admin(),
    )
}

// ============================================================================
// Workflow pre-checks
// ============================================================================

/// Require a signed-in identity for `operation`.
pub fn require_authenticated<'a>(
    snapshot: &'a SessionSnapshot,
    operation: &str,
) -> Result<&'a User, FinderError> {
    snapshot.identity().ok_or_else(|| {
        FinderError::auth(
            AuthFailure::NotSignedIn,
            format!("{operation} requires a signed-in user"),
        )
    })
}

/// Require a signed-in administrator for `operation`.
pub fn require_admin<'a>(
    snapshot: &'a SessionSnapshot,
    operation: &str,
) -> Result<&'a User, FinderError> {
    let user = require_authenticated(snapshot, operation)?;
    if is_admin_role(user.role.as_deref()) {
        Ok(user)
    } else {
        Err(FinderError::permission(format!(
            "{operation} requires administrator privileges"
        )))
    }
}

// ============================================================================
// Tests
// ============================================================================
