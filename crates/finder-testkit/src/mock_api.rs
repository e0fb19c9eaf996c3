//! Scripted in-memory backend.
//!
//! `MockApi` implements [`ApiBridge`] over plain vectors so workflows can be
//! exercised without a server. Every call is recorded; any endpoint can be
//! made to fail or to wait for a release signal.
//!
//! # Blocking Lock Usage
//!
//! State sits behind a `parking_lot::Mutex`. The guard is always dropped
//! before an await point.

use async_trait::async_trait;
use finder_app::{ApiBridge, Credentials, ItemUpdate, LoginGrant, Registration, ReportForm};
use finder_core::{
    AuthFailure, Category, Claim, ClaimId, ClaimStatus, Department, FinderError, Item, ItemId,
    ItemStats, NewClaim, User, UserId,
};
use futures::channel::oneshot;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// One backend endpoint, with its path parameter where it has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `POST /api/users/login`
    Login,
    /// `POST /api/users/register`
    Register,
    /// `GET /api/users/current`
    CurrentUser,
    /// `GET /api/items`
    ListItems,
    /// `GET /api/items/stats`
    ItemStats,
    /// `GET /api/items/user/{id}`
    ItemsByUser(UserId),
    /// `POST /api/items/report`
    ReportItem,
    /// `PUT /api/items/{id}`
    UpdateItem(ItemId),
    /// `DELETE /api/items/{id}`
    DeleteItem(ItemId),
    /// `GET /api/categories`
    Categories,
    /// `GET /api/departments`
    Departments,
    /// `GET /api/claims`
    ListClaims,
    /// `GET /api/claims/item/{id}`
    ClaimsForItem(ItemId),
    /// `GET /api/claims/user/{id}`
    ClaimsByUser(UserId),
    /// `POST /api/claims`
    SubmitClaim,
    /// `PUT /api/claims/{id}/verify`
    VerifyClaim(ClaimId),
    /// `PUT /api/claims/{id}/approve`
    ApproveClaim(ClaimId),
    /// `PUT /api/claims/{id}/reject`
    RejectClaim(ClaimId),
}

#[derive(Debug, Clone)]
struct Account {
    user: User,
    password: String,
}

#[derive(Debug, Default)]
struct MockState {
    accounts: Vec<Account>,
    tokens: HashMap<String, UserId>,
    withhold_tokens: bool,
    items: Vec<Item>,
    claims: Vec<Claim>,
    categories: Vec<Category>,
    departments: Vec<Department>,
    registrations: Vec<serde_json::Value>,
    failures: HashMap<Endpoint, FinderError>,
    holds: HashMap<Endpoint, oneshot::Receiver<()>>,
    calls: Vec<Endpoint>,
    next_user: i64,
    next_item: i64,
    next_claim: i64,
    issued: u64,
}

/// In-memory [`ApiBridge`].
#[derive(Debug, Clone, Default)]
pub struct MockApi {
    state: Arc<Mutex<MockState>>,
}

fn not_found(what: &str) -> FinderError {
    FinderError::server(404, format!("{what} not found"))
}

impl MockApi {
    /// Empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Seeding
    // ------------------------------------------------------------------------

    /// Add an account that can sign in with `password`.
    pub fn add_account(&self, user: User, password: &str) -> &Self {
        let mut state = self.state.lock();
        state.next_user = state.next_user.max(user.user_id.0);
        state.accounts.push(Account {
            user,
            password: password.to_string(),
        });
        self
    }

    /// Replace an account's profile, as a server-side edit would.
    pub fn update_account(&self, user: User) -> &Self {
        let mut state = self.state.lock();
        if let Some(account) = state.accounts.iter_mut().find(|a| a.user.user_id == user.user_id) {
            account.user = user;
        }
        self
    }

    /// Issue a token for `user` without a login round trip.
    pub fn issue_token(&self, user: UserId) -> String {
        let mut state = self.state.lock();
        state.issued += 1;
        let token = format!("token-{user}-{}", state.issued);
        state.tokens.insert(token.clone(), user);
        token
    }

    /// Invalidate every issued token.
    pub fn revoke_tokens(&self) {
        self.state.lock().tokens.clear();
    }

    /// Make login succeed without handing out a token.
    pub fn withhold_tokens(&self, withhold: bool) {
        self.state.lock().withhold_tokens = withhold;
    }

    /// Append items in listing order.
    pub fn seed_items(&self, items: impl IntoIterator<Item = Item>) -> &Self {
        let mut state = self.state.lock();
        for item in items {
            state.next_item = state.next_item.max(item.item_id.0);
            state.items.push(item);
        }
        self
    }

    /// Append claims.
    pub fn seed_claims(&self, claims: impl IntoIterator<Item = Claim>) -> &Self {
        let mut state = self.state.lock();
        for claim in claims {
            state.next_claim = state.next_claim.max(claim.claim_id.0);
            state.claims.push(claim);
        }
        self
    }

    /// Replace the reference lists.
    pub fn seed_reference(&self, categories: Vec<Category>, departments: Vec<Department>) -> &Self {
        let mut state = self.state.lock();
        state.categories = categories;
        state.departments = departments;
        self
    }

    // ------------------------------------------------------------------------
    // Scripting
    // ------------------------------------------------------------------------

    /// Fail every call to `endpoint` with `error` until cleared.
    pub fn fail(&self, endpoint: Endpoint, error: FinderError) {
        self.state.lock().failures.insert(endpoint, error);
    }

    /// Stop failing `endpoint`.
    pub fn clear_failure(&self, endpoint: Endpoint) {
        self.state.lock().failures.remove(&endpoint);
    }

    /// Park the next call to `endpoint` until the returned sender fires or
    /// is dropped.
    pub fn hold(&self, endpoint: Endpoint) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().holds.insert(endpoint, rx);
        tx
    }

    // ------------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------------

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<Endpoint> {
        self.state.lock().calls.clone()
    }

    /// Number of calls so far.
    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Calls matching `pred`.
    pub fn count_calls(&self, pred: impl Fn(&Endpoint) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| pred(c)).count()
    }

    /// Forget recorded calls.
    pub fn reset_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Server-side item.
    pub fn item(&self, id: ItemId) -> Option<Item> {
        self.state.lock().items.iter().find(|i| i.item_id == id).cloned()
    }

    /// Server-side items.
    pub fn items(&self) -> Vec<Item> {
        self.state.lock().items.clone()
    }

    /// Server-side claim.
    pub fn claim(&self, id: ClaimId) -> Option<Claim> {
        self.state.lock().claims.iter().find(|c| c.claim_id == id).cloned()
    }

    /// Server-side claims.
    pub fn claims(&self) -> Vec<Claim> {
        self.state.lock().claims.clone()
    }

    /// Registration bodies received, as sent on the wire.
    pub fn registrations(&self) -> Vec<serde_json::Value> {
        self.state.lock().registrations.clone()
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    async fn enter(&self, endpoint: Endpoint) -> Result<(), FinderError> {
        let (failure, hold) = {
            let mut state = self.state.lock();
            state.calls.push(endpoint);
            (
                state.failures.get(&endpoint).cloned(),
                state.holds.remove(&endpoint),
            )
        };
        if let Some(hold) = hold {
            let _ = hold.await;
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MockState) -> T) -> T {
        f(&mut self.state.lock())
    }
}

#[async_trait]
impl ApiBridge for MockApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginGrant, FinderError> {
        self.enter(Endpoint::Login).await?;
        let user = self.with_state(|s| {
            s.accounts
                .iter()
                .find(|a| a.user.username == credentials.username && a.password == credentials.password)
                .map(|a| a.user.clone())
        });
        let user = user.ok_or_else(|| {
            FinderError::auth(AuthFailure::InvalidCredentials, "Invalid username or password")
        })?;
        let token = if self.with_state(|s| s.withhold_tokens) {
            String::new()
        } else {
            self.issue_token(user.user_id)
        };
        Ok(LoginGrant { user, token })
    }

    async fn register(&self, registration: &Registration) -> Result<(), FinderError> {
        self.enter(Endpoint::Register).await?;
        let body = serde_json::to_value(registration.to_request())?;
        self.with_state(|s| {
            if s.accounts.iter().any(|a| a.user.username == registration.username) {
                return Err(FinderError::server(409, "Username already exists"));
            }
            s.next_user += 1;
            let mut user = User::new(UserId(s.next_user), registration.username.clone(), "USER");
            user.first_name = Some(registration.first_name.clone());
            user.last_name = Some(registration.last_name.clone());
            user.email = Some(registration.email.clone());
            user.contact_no = Some(registration.contact_no.clone());
            s.accounts.push(Account {
                user,
                password: registration.password.clone(),
            });
            s.registrations.push(body);
            Ok(())
        })
    }

    async fn current_user(&self, token: &str) -> Result<User, FinderError> {
        self.enter(Endpoint::CurrentUser).await?;
        self.with_state(|s| {
            let id = s.tokens.get(token).copied().ok_or_else(|| {
                FinderError::auth(AuthFailure::InvalidToken, "Session expired")
            })?;
            s.accounts
                .iter()
                .find(|a| a.user.user_id == id)
                .map(|a| a.user.clone())
                .ok_or_else(|| FinderError::auth(AuthFailure::InvalidToken, "Unknown user"))
        })
    }

    async fn list_items(&self) -> Result<Vec<Item>, FinderError> {
        self.enter(Endpoint::ListItems).await?;
        Ok(self.items())
    }

    async fn item_stats(&self) -> Result<ItemStats, FinderError> {
        self.enter(Endpoint::ItemStats).await?;
        Ok(self.with_state(|s| ItemStats::from_items(&s.items)))
    }

    async fn items_by_user(&self, user_id: UserId) -> Result<Vec<Item>, FinderError> {
        self.enter(Endpoint::ItemsByUser(user_id)).await?;
        Ok(self.with_state(|s| {
            s.items
                .iter()
                .filter(|i| i.is_reported_by(user_id))
                .cloned()
                .collect()
        }))
    }

    async fn report_item(&self, form: &ReportForm) -> Result<Item, FinderError> {
        self.enter(Endpoint::ReportItem).await?;
        Ok(self.with_state(|s| {
            s.next_item += 1;
            let item = Item {
                item_id: ItemId(s.next_item),
                title: form.title.clone(),
                description: form.description.clone(),
                location: form.location.clone(),
                status: form.status,
                date_report: Some(form.date_report),
                image_url: form
                    .image
                    .as_ref()
                    .map(|img| format!("/uploads/{}", img.file_name)),
                reporter_id: Some(form.user_id),
                category_id: Some(form.category_id),
                department_id: Some(form.department_id),
                category_name: s
                    .categories
                    .iter()
                    .find(|c| c.category_id == form.category_id)
                    .map(|c| c.category_name.clone()),
                department_name: s
                    .departments
                    .iter()
                    .find(|d| d.department_id == form.department_id)
                    .map(|d| d.name.clone()),
            };
            s.items.push(item.clone());
            item
        }))
    }

    async fn update_item(&self, item_id: ItemId, update: &ItemUpdate) -> Result<Item, FinderError> {
        self.enter(Endpoint::UpdateItem(item_id)).await?;
        self.with_state(|s| {
            let item = s
                .items
                .iter_mut()
                .find(|i| i.item_id == item_id)
                .ok_or_else(|| not_found("Item"))?;
            if let Some(title) = &update.item_title {
                item.title = title.clone();
            }
            if let Some(desc) = &update.item_desc {
                item.description = desc.clone();
            }
            if let Some(location) = &update.location {
                item.location = location.clone();
            }
            if let Some(status) = update.status {
                item.status = status;
            }
            if let Some(user) = update.user_id {
                item.reporter_id = Some(user);
            }
            if let Some(category) = update.category_id {
                item.category_id = Some(category);
            }
            if let Some(department) = update.department_id {
                item.department_id = Some(department);
            }
            if let Some(date) = update.date_report {
                item.date_report = Some(date);
            }
            if let Some(url) = &update.image_url {
                item.image_url = Some(url.clone());
            }
            Ok(item.clone())
        })
    }

    async fn delete_item(&self, item_id: ItemId) -> Result<(), FinderError> {
        self.enter(Endpoint::DeleteItem(item_id)).await?;
        self.with_state(|s| {
            let before = s.items.len();
            s.items.retain(|i| i.item_id != item_id);
            if s.items.len() == before {
                Err(not_found("Item"))
            } else {
                s.claims.retain(|c| c.item_id != item_id);
                Ok(())
            }
        })
    }

    async fn categories(&self) -> Result<Vec<Category>, FinderError> {
        self.enter(Endpoint::Categories).await?;
        Ok(self.with_state(|s| s.categories.clone()))
    }

    async fn departments(&self) -> Result<Vec<Department>, FinderError> {
        self.enter(Endpoint::Departments).await?;
        Ok(self.with_state(|s| s.departments.clone()))
    }

    async fn list_claims(&self) -> Result<Vec<Claim>, FinderError> {
        self.enter(Endpoint::ListClaims).await?;
        Ok(self.claims())
    }

    async fn claims_for_item(&self, item_id: ItemId) -> Result<Vec<Claim>, FinderError> {
        self.enter(Endpoint::ClaimsForItem(item_id)).await?;
        Ok(self.with_state(|s| {
            s.claims
                .iter()
                .filter(|c| c.item_id == item_id)
                .cloned()
                .collect()
        }))
    }

    async fn claims_by_user(&self, user_id: UserId) -> Result<Vec<Claim>, FinderError> {
        self.enter(Endpoint::ClaimsByUser(user_id)).await?;
        Ok(self.with_state(|s| {
            s.claims
                .iter()
                .filter(|c| c.claimant_id == user_id)
                .cloned()
                .collect()
        }))
    }

    async fn submit_claim(&self, claim: &NewClaim) -> Result<Claim, FinderError> {
        self.enter(Endpoint::SubmitClaim).await?;
        self.with_state(|s| {
            if !s.items.iter().any(|i| i.item_id == claim.item_id) {
                return Err(not_found("Item"));
            }
            s.next_claim += 1;
            let created = Claim {
                claim_id: ClaimId(s.next_claim),
                item_id: claim.item_id,
                claimant_id: claim.user_id,
                verification_answer: claim.verification_answer.clone(),
                contact_info: claim.contact_info.clone(),
                claim_date: None,
                status: claim.status,
                verified: claim.verified,
            };
            s.claims.push(created.clone());
            Ok(created)
        })
    }

    async fn verify_claim(&self, claim_id: ClaimId, verified: bool) -> Result<Claim, FinderError> {
        self.enter(Endpoint::VerifyClaim(claim_id)).await?;
        self.update_claim(claim_id, |c| c.verified = verified)
    }

    async fn approve_claim(&self, claim_id: ClaimId) -> Result<Claim, FinderError> {
        self.enter(Endpoint::ApproveClaim(claim_id)).await?;
        self.update_claim(claim_id, |c| {
            c.status = ClaimStatus::Approved;
            c.verified = true;
        })
    }

    async fn reject_claim(&self, claim_id: ClaimId) -> Result<Claim, FinderError> {
        self.enter(Endpoint::RejectClaim(claim_id)).await?;
        self.update_claim(claim_id, |c| {
            c.status = ClaimStatus::Rejected;
            c.verified = false;
        })
    }
}

impl MockApi {
    fn update_claim(
        &self,
        claim_id: ClaimId,
        f: impl FnOnce(&mut Claim),
    ) -> Result<Claim, FinderError> {
        self.with_state(|s| {
            let claim = s
                .claims
                .iter_mut()
                .find(|c| c.claim_id == claim_id)
                .ok_or_else(|| not_found("Claim"))?;
            f(claim);
            Ok(claim.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[tokio::test]
    async fn test_calls_are_recorded_and_failures_injected() {
        let api = MockApi::new();
        api.seed_items([fixtures::item(1, "Umbrella", finder_core::ItemStatus::Lost, 1)]);
        api.fail(Endpoint::ItemStats, FinderError::server(500, "down"));

        assert!(api.item_stats().await.is_err());
        assert_eq!(api.list_items().await.unwrap().len(), 1);
        assert_eq!(api.calls(), vec![Endpoint::ItemStats, Endpoint::ListItems]);

        api.clear_failure(Endpoint::ItemStats);
        assert_eq!(api.item_stats().await.unwrap().lost, 1);
    }

    #[tokio::test]
    async fn test_approve_and_reject_set_both_fields() {
        let api = MockApi::new();
        api.seed_claims([fixtures::claim(1, 1, 2), fixtures::claim(2, 1, 3)]);

        let approved = api.approve_claim(ClaimId(1)).await.unwrap();
        assert_eq!(approved.status, ClaimStatus::Approved);
        assert!(approved.verified);

        let rejected = api.reject_claim(ClaimId(2)).await.unwrap();
        assert_eq!(rejected.status, ClaimStatus::Rejected);
        assert!(!rejected.verified);
    }

    #[tokio::test]
    async fn test_unknown_token_is_rejected() {
        let api = MockApi::new();
        let err = api.current_user("nope").await.unwrap_err();
        assert!(err.is_rejection());
    }
}
