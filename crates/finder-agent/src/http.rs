//! HTTP implementation of [`ApiBridge`].
//!
//! Every failure is translated here; no `reqwest` error crosses into the
//! application core.

use async_trait::async_trait;
use finder_app::errors::server_message;
use finder_app::{ApiBridge, Credentials, ItemUpdate, LoginGrant, Registration, ReportForm};
use finder_core::{
    AuthFailure, Category, Claim, ClaimId, Department, FinderError, Item, ItemId, ItemStats,
    NewClaim, User, UserId,
};
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Login response: the user record, plus the credential token when the
/// server issues one in the body.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(flatten)]
    user: User,
    #[serde(default, alias = "accessToken", alias = "jwt")]
    token: Option<String>,
}

/// Error for a response that carried a non-success status.
///
/// 401/403 become authentication failures, everything else a server error
/// carrying the body's message.
pub fn classify_status(status: u16, body: &str, auth_failure: AuthFailure) -> FinderError {
    let message = server_message(status, body);
    match status {
        401 | 403 => FinderError::auth(auth_failure, message),
        _ => FinderError::server(status, message),
    }
}

/// HTTP client for the lost-and-found REST backend.
#[derive(Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: Arc<str>,
}

impl std::fmt::Debug for HttpApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpApi")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpApi {
    /// Client for `base_url` (no trailing slash needed).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FinderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FinderError::network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send and check the status; non-success bodies become errors.
    async fn send(
        &self,
        request: RequestBuilder,
        auth_failure: AuthFailure,
    ) -> Result<Response, FinderError> {
        let response = request
            .send()
            .await
            .map_err(|e| FinderError::network(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "request rejected");
        Err(classify_status(status.as_u16(), &body, auth_failure))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, FinderError> {
        let text = response
            .text()
            .await
            .map_err(|e| FinderError::network(format!("Failed to read response body: {e}")))?;
        serde_json::from_str(&text).map_err(FinderError::from)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FinderError> {
        let response = self
            .send(self.client.get(self.url(path)), AuthFailure::InvalidToken)
            .await?;
        Self::decode(response).await
    }

    async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, FinderError>
    where
        B: serde::Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .send(
                self.client.put(self.url(path)).json(body),
                AuthFailure::InvalidToken,
            )
            .await?;
        Self::decode(response).await
    }

    async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, FinderError> {
        let response = self
            .send(self.client.put(self.url(path)), AuthFailure::InvalidToken)
            .await?;
        Self::decode(response).await
    }

    fn multipart(form: &ReportForm) -> Result<Form, FinderError> {
        let mut multipart = form
            .text_fields()
            .into_iter()
            .fold(Form::new(), |acc, (name, value)| acc.text(name, value));
        if let Some(image) = &form.image {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.content_type)
                .map_err(|_| FinderError::validation("image", "Unsupported image type"))?;
            multipart = multipart.part("image", part);
        }
        Ok(multipart)
    }
}

fn bearer_token(response: &Response) -> Option<String> {
    response
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

#[async_trait]
impl ApiBridge for HttpApi {
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    async fn login(&self, credentials: &Credentials) -> Result<LoginGrant, FinderError> {
        let request = self.client.post(self.url("/api/users/login")).json(credentials);
        let response = request
            .send()
            .await
            .map_err(|e| FinderError::network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FinderError::auth(
                AuthFailure::InvalidCredentials,
                server_message(status.as_u16(), &body),
            ));
        }
        let header_token = bearer_token(&response);
        let body: LoginResponse = Self::decode(response).await?;
        let token = body
            .token
            .filter(|t| !t.trim().is_empty())
            .or(header_token)
            .ok_or_else(|| {
                FinderError::auth(AuthFailure::MissingToken, "login response carried no token")
            })?;
        Ok(LoginGrant {
            user: body.user,
            token,
        })
    }

    #[instrument(skip(self, registration))]
    async fn register(&self, registration: &Registration) -> Result<(), FinderError> {
        let request = self
            .client
            .post(self.url("/api/users/register"))
            .json(&registration.to_request());
        self.send(request, AuthFailure::InvalidCredentials).await?;
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn current_user(&self, token: &str) -> Result<User, FinderError> {
        let request = self
            .client
            .get(self.url("/api/users/current"))
            .header(AUTHORIZATION, format!("Bearer {token}"));
        let response = self.send(request, AuthFailure::InvalidToken).await?;
        Self::decode(response).await
    }

    #[instrument(skip(self))]
    async fn list_items(&self) -> Result<Vec<Item>, FinderError> {
        self.get_json("/api/items").await
    }

    #[instrument(skip(self))]
    async fn item_stats(&self) -> Result<ItemStats, FinderError> {
        self.get_json("/api/items/stats").await
    }

    #[instrument(skip(self))]
    async fn items_by_user(&self, user_id: UserId) -> Result<Vec<Item>, FinderError> {
        self.get_json(&format!("/api/items/user/{user_id}")).await
    }

    #[instrument(skip(self, form), fields(title = %form.title))]
    async fn report_item(&self, form: &ReportForm) -> Result<Item, FinderError> {
        let request = self
            .client
            .post(self.url("/api/items/report"))
            .multipart(Self::multipart(form)?);
        let response = self.send(request, AuthFailure::InvalidToken).await?;
        Self::decode(response).await
    }

    #[instrument(skip(self, update))]
    async fn update_item(&self, item_id: ItemId, update: &ItemUpdate) -> Result<Item, FinderError> {
        self.put_json(&format!("/api/items/{item_id}"), update).await
    }

    #[instrument(skip(self))]
    async fn delete_item(&self, item_id: ItemId) -> Result<(), FinderError> {
        let request = self.client.delete(self.url(&format!("/api/items/{item_id}")));
        self.send(request, AuthFailure::InvalidToken).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn categories(&self) -> Result<Vec<Category>, FinderError> {
        self.get_json("/api/categories").await
    }

    #[instrument(skip(self))]
    async fn departments(&self) -> Result<Vec<Department>, FinderError> {
        self.get_json("/api/departments").await
    }

    #[instrument(skip(self))]
    async fn list_claims(&self) -> Result<Vec<Claim>, FinderError> {
        self.get_json("/api/claims").await
    }

    #[instrument(skip(self))]
    async fn claims_for_item(&self, item_id: ItemId) -> Result<Vec<Claim>, FinderError> {
        self.get_json(&format!("/api/claims/item/{item_id}")).await
    }

    #[instrument(skip(self))]
    async fn claims_by_user(&self, user_id: UserId) -> Result<Vec<Claim>, FinderError> {
        self.get_json(&format!("/api/claims/user/{user_id}")).await
    }

    #[instrument(skip(self, claim), fields(item_id = %claim.item_id))]
    async fn submit_claim(&self, claim: &NewClaim) -> Result<Claim, FinderError> {
        let request = self.client.post(self.url("/api/claims")).json(claim);
        let response = self.send(request, AuthFailure::InvalidToken).await?;
        Self::decode(response).await
    }

    #[instrument(skip(self))]
    async fn verify_claim(&self, claim_id: ClaimId, verified: bool) -> Result<Claim, FinderError> {
        self.put_json(&format!("/api/claims/{claim_id}/verify"), &verified)
            .await
    }

    #[instrument(skip(self))]
    async fn approve_claim(&self, claim_id: ClaimId) -> Result<Claim, FinderError> {
        self.put_empty(&format!("/api/claims/{claim_id}/approve")).await
    }

    #[instrument(skip(self))]
    async fn reject_claim(&self, claim_id: ClaimId) -> Result<Claim, FinderError> {
        self.put_empty(&format!("/api/claims/{claim_id}/reject")).await
    }
}
