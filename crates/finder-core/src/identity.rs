//! # Identity
//!
//! The user record returned by login and by `GET /api/users/current`. The
//! client caches it alongside the credential token; only the session store
//! in `finder-app` may replace or clear it.

use crate::identifiers::UserId;
use serde::{Deserialize, Serialize};

/// Authenticated user record.
///
/// `role` is kept as the raw server string. Role comparison is centralised in
/// the authorization gate and is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Backend identifier
    pub user_id: UserId,
    /// Login name (an email address in practice)
    pub username: String,
    /// First name
    #[serde(default, rename = "fname", alias = "fName")]
    pub first_name: Option<String>,
    /// Middle name
    #[serde(default, rename = "mname", alias = "mName")]
    pub middle_name: Option<String>,
    /// Last name
    #[serde(default, rename = "lname", alias = "lName")]
    pub last_name: Option<String>,
    /// Contact email
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone number
    #[serde(default)]
    pub contact_no: Option<String>,
    /// Raw role string as issued by the server (`USER`, `ADMIN`, ...)
    #[serde(default)]
    pub role: Option<String>,
}

impl User {
    /// Minimal record, mostly useful for tests and fixtures.
    pub fn new(user_id: UserId, username: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            first_name: None,
            middle_name: None,
            last_name: None,
            email: None,
            contact_no: None,
            role: Some(role.into()),
        }
    }

    /// Display name in the form "First M. Last".
    ///
    /// Falls back to the username, then to "User".
    pub fn full_name(&self) -> String {
        let mut name = non_blank(&self.first_name).unwrap_or_default().to_string();
        if let Some(initial) = non_blank(&self.middle_name).and_then(|m| m.chars().next()) {
            name.push_str(&format!(" {initial}."));
        }
        if let Some(last) = non_blank(&self.last_name) {
            name.push(' ');
            name.push_str(last);
        }
        let name = name.trim();
        if !name.is_empty() {
            name.to_string()
        } else if !self.username.trim().is_empty() {
            self.username.clone()
        } else {
            "User".to_string()
        }
    }

    /// Upper-case initials for avatar badges.
    ///
    /// Uses first/last name; otherwise derives them from the local part of
    /// the username (`jane.doe@...` gives `JD`).
    pub fn initials(&self) -> String {
        let mut initials = String::new();
        for part in [&self.first_name, &self.last_name] {
            if let Some(c) = non_blank(part).and_then(|p| p.chars().next()) {
                initials.extend(c.to_uppercase());
            }
        }
        if initials.is_empty() {
            let local = self.username.split('@').next().unwrap_or_default();
            let mut parts = local.split('.').filter(|p| !p.is_empty());
            let first = parts.next().and_then(|p| p.chars().next());
            let second = parts.next().and_then(|p| p.chars().next());
            for c in [first, second].into_iter().flatten() {
                initials.extend(c.to_uppercase());
            }
        }
        if initials.is_empty() {
            "U".to_string()
        } else {
            initials
        }
    }

    /// Email if known, else the username.
    pub fn display_email(&self) -> &str {
        non_blank(&self.email).unwrap_or(self.username.as_str())
    }

    /// Role formatted for display ("Admin", "User").
    pub fn display_role(&self) -> String {
        match non_blank(&self.role) {
            Some(role) => {
                let mut chars = role.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                    None => "User".to_string(),
                }
            }
            None => "User".to_string(),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> User {
        User {
            first_name: Some("Jane".into()),
            middle_name: Some("Marie".into()),
            last_name: Some("Doe".into()),
            email: Some("jane@cit.edu".into()),
            ..User::new(UserId(1), "jane.doe@cit.edu", "USER")
        }
    }

    #[test]
    fn test_full_name_with_middle_initial() {
        assert_eq!(jane().full_name(), "Jane M. Doe");
    }

    #[test]
    fn test_full_name_falls_back_to_username() {
        let user = User::new(UserId(2), "sam@cit.edu", "user");
        assert_eq!(user.full_name(), "sam@cit.edu");
    }

    #[test]
    fn test_initials() {
        assert_eq!(jane().initials(), "JD");
        let bare = User::new(UserId(3), "mark.lee@cit.edu", "USER");
        assert_eq!(bare.initials(), "ML");
        let single = User::new(UserId(4), "ana@cit.edu", "USER");
        assert_eq!(single.initials(), "A");
    }

    #[test]
    fn test_display_role_normalises_case() {
        assert_eq!(User::new(UserId(5), "a", "aDMIN").display_role(), "Admin");
        let mut user = User::new(UserId(6), "b", "USER");
        user.role = None;
        assert_eq!(user.display_role(), "User");
    }

    #[test]
    fn test_decodes_backend_field_names() {
        let json = r#"{"userId":9,"username":"x@cit.edu","fname":"X","lName":"Y",
            "role":"ADMIN","reportedItems":[]}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.user_id, UserId(9));
        assert_eq!(user.first_name.as_deref(), Some("X"));
        assert_eq!(user.last_name.as_deref(), Some("Y"));
        assert_eq!(user.display_email(), "x@cit.edu");
    }
}
