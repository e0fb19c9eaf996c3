//! # ApiBridge: the backend contract
//!
//! The application core never speaks HTTP. Everything it needs from the REST
//! backend is expressed by the [`ApiBridge`] trait; `finder-agent` implements
//! it with `reqwest`, `finder-testkit` with a scripted in-memory backend.
//!
//! ```text
//! finder-app (pure)          finder-agent (runtime)
//! ┌─────────────────┐        ┌─────────────────┐
//! │ AppCore         │        │ HttpApi         │
//! │   ┌───────────┐ │        │   implements    │
//! │   │ ApiBridge │◄┼────────│   ApiBridge     │
//! │   └───────────┘ │        │                 │
//! └─────────────────┘        └─────────────────┘
//! ```
//!
//! Implementations translate every transport or status failure into a
//! [`FinderError`] before returning: `Network` when no response arrived,
//! `Auth` for 401/403, `Server` for any other non-success status (carrying
//! the response body message), `Serialization` for undecodable bodies.

use async_trait::async_trait;
use chrono::NaiveDate;
use finder_core::{
    Category, CategoryId, Claim, ClaimId, Department, DepartmentId, FinderError, Item, ItemId,
    ItemStats, ItemStatus, NewClaim, User, UserId,
};
use serde::Serialize;
use std::fmt;

/// Role requested for self-service registrations.
///
/// Role assignment is a server decision; the client never asks for more.
pub const SELF_SERVICE_ROLE: &str = "USER";

/// Body of `POST /api/users/login`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    /// Login name
    pub username: String,
    /// Plain-text password, sent over TLS only
    pub password: String,
}

impl Credentials {
    /// Build a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Result of a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginGrant {
    /// Identity returned by the server
    pub user: User,
    /// Opaque credential token issued with it
    pub token: String,
}

impl fmt::Debug for LoginGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginGrant")
            .field("user", &self.user)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Sign-up form.
#[derive(Clone, Default, Serialize)]
pub struct Registration {
    /// Login name (email address)
    pub username: String,
    /// Chosen password
    pub password: String,
    /// First name
    #[serde(rename = "fName")]
    pub first_name: String,
    /// Middle name, optional
    #[serde(rename = "mName")]
    pub middle_name: String,
    /// Last name
    #[serde(rename = "lName")]
    pub last_name: String,
    /// Contact email
    pub email: String,
    /// Contact phone number
    #[serde(rename = "contactNo")]
    pub contact_no: String,
}

impl Registration {
    /// Wire body with the fixed self-service role attached.
    pub fn to_request(&self) -> RegistrationRequest<'_> {
        RegistrationRequest {
            registration: self,
            role: SELF_SERVICE_ROLE,
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Body of `POST /api/users/register`.
#[derive(Debug, Serialize)]
pub struct RegistrationRequest<'a> {
    /// Form fields
    #[serde(flatten)]
    pub registration: &'a Registration,
    /// Always [`SELF_SERVICE_ROLE`]
    pub role: &'static str,
}

/// Optional photo attached to a report.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Original file name
    pub file_name: String,
    /// MIME type (`image/png`, `image/jpeg`)
    pub content_type: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Multipart body of `POST /api/items/report`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportForm {
    /// `itemTitle`
    pub title: String,
    /// `itemDesc`
    pub description: String,
    /// `location`: department display name
    pub location: String,
    /// `status`: LOST or FOUND
    pub status: ItemStatus,
    /// `userId`
    pub user_id: UserId,
    /// `categoryId`
    pub category_id: CategoryId,
    /// `departmentId`
    pub department_id: DepartmentId,
    /// `dateReport`
    pub date_report: NaiveDate,
    /// `image`, optional
    pub image: Option<ImageUpload>,
}

impl ReportForm {
    /// Text parts of the multipart form, in wire order.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("itemTitle", self.title.clone()),
            ("itemDesc", self.description.clone()),
            ("location", self.location.clone()),
            ("status", self.status.as_str().to_string()),
            ("userId", self.user_id.to_string()),
            ("categoryId", self.category_id.to_string()),
            ("departmentId", self.department_id.to_string()),
            ("dateReport", self.date_report.format("%Y-%m-%d").to_string()),
        ]
    }
}

/// JSON body of `PUT /api/items/{id}`: any subset of fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_title: Option<String>,
    /// New description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_desc: Option<String>,
    /// New location (department display name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// New status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    /// Reporter, echoed back on full edits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// New category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    /// New department
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<DepartmentId>,
    /// New report date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_report: Option<NaiveDate>,
    /// Image file name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ItemUpdate {
    /// Status-only update used by the admin dashboard.
    pub fn status(status: ItemStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Bridge trait for backend operations
///
/// This trait defines the interface between the pure application core and
/// the REST backend. It enables:
///
/// - **Decoupling**: the core does not know about HTTP
/// - **Testability**: scripted implementations for scenario tests
/// - **Portability**: different transports for native and wasm hosts
#[async_trait]
pub trait ApiBridge: Send + Sync {
    // ─── Users ───────────────────────────────────────────────

    /// `POST /api/users/login`
    async fn login(&self, credentials: &Credentials) -> Result<LoginGrant, FinderError>;

    /// `POST /api/users/register`
    async fn register(&self, registration: &Registration) -> Result<(), FinderError>;

    /// `GET /api/users/current` with `Authorization: Bearer <token>`
    async fn current_user(&self, token: &str) -> Result<User, FinderError>;

    // ─── Items ───────────────────────────────────────────────

    /// `GET /api/items`
    async fn list_items(&self) -> Result<Vec<Item>, FinderError>;

    /// `GET /api/items/stats`
    async fn item_stats(&self) -> Result<ItemStats, FinderError>;

    /// `GET /api/items/user/{userId}`
    async fn items_by_user(&self, user_id: UserId) -> Result<Vec<Item>, FinderError>;

    /// `POST /api/items/report` (multipart)
    async fn report_item(&self, form: &ReportForm) -> Result<Item, FinderError>;

    /// `PUT /api/items/{id}`
    async fn update_item(&self, item_id: ItemId, update: &ItemUpdate) -> Result<Item, FinderError>;

    /// `DELETE /api/items/{id}`
    async fn delete_item(&self, item_id: ItemId) -> Result<(), FinderError>;

    // ─── Reference data ──────────────────────────────────────

    /// `GET /api/categories`
    async fn categories(&self) -> Result<Vec<Category>, FinderError>;

    /// `GET /api/departments`
    async fn departments(&self) -> Result<Vec<Department>, FinderError>;

    // ─── Claims ──────────────────────────────────────────────

    /// `GET /api/claims`
    async fn list_claims(&self) -> Result<Vec<Claim>, FinderError>;

    /// `GET /api/claims/item/{itemId}`
    async fn claims_for_item(&self, item_id: ItemId) -> Result<Vec<Claim>, FinderError>;

    /// `GET /api/claims/user/{userId}`
    async fn claims_by_user(&self, user_id: UserId) -> Result<Vec<Claim>, FinderError>;

    /// `POST /api/claims`
    async fn submit_claim(&self, claim: &NewClaim) -> Result<Claim, FinderError>;

    /// `PUT /api/claims/{id}/verify` with a JSON boolean body
    async fn verify_claim(&self, claim_id: ClaimId, verified: bool) -> Result<Claim, FinderError>;

    /// `PUT /api/claims/{id}/approve`
    async fn approve_claim(&self, claim_id: ClaimId) -> Result<Claim, FinderError>;

    /// `PUT /api/claims/{id}/reject`
    async fn reject_claim(&self, claim_id: ClaimId) -> Result<Claim, FinderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_never_requests_elevated_role() {
        let registration = Registration {
            username: "boss@wildcatsf.com".into(),
            email: "boss@wildcatsf.com".into(),
            ..Registration::default()
        };
        let json = serde_json::to_value(registration.to_request()).unwrap();
        assert_eq!(json["role"], "USER");
        assert_eq!(json["username"], "boss@wildcatsf.com");
        assert!(json.get("fName").is_some());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("a@cit.edu", "hunter2");
        assert!(!format!("{creds:?}").contains("hunter2"));
    }

    #[test]
    fn test_status_update_is_partial() {
        let json = serde_json::to_value(ItemUpdate::status(ItemStatus::Claimed)).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "CLAIMED" }));
    }

    #[test]
    fn test_report_form_text_fields() {
        let form = ReportForm {
            title: "Blue Backpack".into(),
            description: "Navy".into(),
            location: "Main Campus".into(),
            status: ItemStatus::Found,
            user_id: UserId(1),
            category_id: CategoryId(2),
            department_id: DepartmentId(4),
            date_report: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            image: None,
        };
        let fields = form.text_fields();
        assert!(fields.contains(&("location", "Main Campus".to_string())));
        assert!(fields.contains(&("status", "FOUND".to_string())));
        assert!(fields.contains(&("dateReport", "2025-01-10".to_string())));
    }
}
