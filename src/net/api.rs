//! REST client for the HumanizeAI backend.
//!
//! Every request reads the token store and, when a token is present, sends
//! `Authorization: Bearer <token>`. Nothing is retried: a transport failure
//! becomes [`ApiError::Network`], a non-2xx status becomes
//! [`ApiError::Application`] carrying the server's message or the
//! operation's default.

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{ApiError, error_body_message};
use super::types::{
    Activity, ActivitiesEnvelope, ApiCall, ApiCallStat, ApiCallStatsEnvelope, ApiCallsEnvelope, AuthResponse,
    ChangePasswordData, HumanizeRequest, HumanizeResponse, LoginData, MessageResponse, RegisterData, UpdateSubscription,
    UserEnvelope, UserInfo, UserInfoEnvelope, UserSubscription, UsersEnvelope,
};
use crate::config::{ClientConfig, HttpTimeouts, normalize_api_url};
use crate::token_store::TokenStore;

pub const DEFAULT_ACTIVITY_LIMIT: u32 = 10;
pub const DEFAULT_STATS_DAYS: u32 = 7;

const NO_BODY: Option<&()> = None;

// =============================================================================
// BACKEND SEAM
// =============================================================================

/// The backend calls the session controller needs.
///
/// [`ApiClient`] is the production implementation; tests substitute mocks.
#[async_trait::async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or credentials are rejected.
    async fn login(&self, data: &LoginData) -> Result<AuthResponse, ApiError>;

    /// Create an account. Does not authenticate.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the server refuses it.
    async fn register(&self, data: &RegisterData) -> Result<AuthResponse, ApiError>;

    /// Update the caller's password.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the server refuses it.
    async fn change_password(&self, data: &ChangePasswordData) -> Result<MessageResponse, ApiError>;

    /// Fetch the caller's profile.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the token is rejected.
    async fn fetch_profile(&self) -> Result<UserInfo, ApiError>;
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// Build a client for `base_url` that reads its bearer token from `tokens`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(base_url: &str, timeouts: HttpTimeouts, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request())
            .connect_timeout(timeouts.connect())
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: normalize_api_url(base_url), tokens })
    }

    /// Build a client from parsed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        Self::new(&config.api_url, config.timeouts, tokens)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Untyped request against `path`, returning the JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] when no response arrives and
    /// [`ApiError::Application`] for non-success statuses.
    pub async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        self.send(method, path, body, "Request failed").await
    }

    // ---- auth ----------------------------------------------------------

    /// `POST /register`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn register(&self, data: &RegisterData) -> Result<AuthResponse, ApiError> {
        self.send(Method::POST, "/register", Some(data), "Registration failed")
            .await
    }

    /// `POST /login`. The caller decides where the returned token goes.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn login(&self, data: &LoginData) -> Result<AuthResponse, ApiError> {
        self.send(Method::POST, "/login", Some(data), "Login failed")
            .await
    }

    /// `POST /change-password`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn change_password(&self, data: &ChangePasswordData) -> Result<MessageResponse, ApiError> {
        self.send(Method::POST, "/change-password", Some(data), "Password change failed")
            .await
    }

    /// `GET /get-info`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get_info(&self) -> Result<UserInfo, ApiError> {
        let envelope: UserInfoEnvelope = self
            .send(Method::GET, "/get-info", NO_BODY, "Failed to fetch user info")
            .await?;
        Ok(envelope.user_info)
    }

    // ---- humanize + dashboard ------------------------------------------

    /// `POST /humanize`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn humanize(&self, req: &HumanizeRequest) -> Result<HumanizeResponse, ApiError> {
        self.send(Method::POST, "/humanize", Some(req), "Humanization failed")
            .await
    }

    /// `GET /recent-activities?limit=N`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn recent_activities(&self, limit: u32) -> Result<Vec<Activity>, ApiError> {
        let path = format!("/recent-activities?limit={limit}");
        let envelope: ActivitiesEnvelope = self
            .send(Method::GET, &path, NO_BODY, "Failed to fetch activities")
            .await?;
        Ok(envelope.activities)
    }

    /// `GET /recent-api-calls?limit=N`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn recent_api_calls(&self, limit: u32) -> Result<Vec<ApiCall>, ApiError> {
        let path = format!("/recent-api-calls?limit={limit}");
        let envelope: ApiCallsEnvelope = self
            .send(Method::GET, &path, NO_BODY, "Failed to fetch API calls")
            .await?;
        Ok(envelope.api_calls)
    }

    /// `GET /api-call-stats?days=N`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn api_call_stats(&self, days: u32) -> Result<Vec<ApiCallStat>, ApiError> {
        let path = format!("/api-call-stats?days={days}");
        let envelope: ApiCallStatsEnvelope = self
            .send(Method::GET, &path, NO_BODY, "Failed to fetch API call stats")
            .await?;
        Ok(envelope.api_call_stats)
    }

    /// `POST /reset-usage`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn reset_usage(&self) -> Result<MessageResponse, ApiError> {
        self.send(Method::POST, "/reset-usage", NO_BODY, "Failed to reset usage")
            .await
    }

    // ---- admin ---------------------------------------------------------

    /// `GET /admin/users`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn admin_users(&self) -> Result<Vec<UserSubscription>, ApiError> {
        let envelope: UsersEnvelope = self
            .send(Method::GET, "/admin/users", NO_BODY, "Failed to fetch users")
            .await?;
        Ok(envelope.users)
    }

    /// `GET /admin/users/:id`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn admin_user(&self, user_id: &str) -> Result<UserSubscription, ApiError> {
        let path = format!("/admin/users/{}", encode_segment(user_id));
        let envelope: UserEnvelope = self
            .send(Method::GET, &path, NO_BODY, "Failed to fetch user")
            .await?;
        Ok(envelope.user)
    }

    /// `GET /admin/users/:id/activities?limit=N`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn admin_user_activities(&self, user_id: &str, limit: u32) -> Result<Vec<Activity>, ApiError> {
        let path = format!("/admin/users/{}/activities?limit={limit}", encode_segment(user_id));
        let envelope: ActivitiesEnvelope = self
            .send(Method::GET, &path, NO_BODY, "Failed to fetch user activities")
            .await?;
        Ok(envelope.activities)
    }

    /// `POST /admin/update-subscription`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn update_subscription(&self, update: &UpdateSubscription) -> Result<MessageResponse, ApiError> {
        self.send(Method::POST, "/admin/update-subscription", Some(update), "Failed to update subscription")
            .await
    }

    /// `POST /admin/reset-usage/:id`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn admin_reset_usage(&self, user_id: &str) -> Result<MessageResponse, ApiError> {
        let path = format!("/admin/reset-usage/{}", encode_segment(user_id));
        self.send(Method::POST, &path, NO_BODY, "Failed to reset user usage")
            .await
    }

    /// `POST /admin/check-expired-memberships`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn check_expired_memberships(&self) -> Result<MessageResponse, ApiError> {
        self.send(
            Method::POST,
            "/admin/check-expired-memberships",
            NO_BODY,
            "Failed to check expired memberships",
        )
        .await
    }

    // ---- transport -----------------------------------------------------

    async fn send<T, B>(&self, method: Method, path: &str, body: Option<&B>, fallback: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method.clone(), &url);
        if let Some(token) = self.tokens.read()? {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
            value.set_sensitive(true);
            request = request.header(AUTHORIZATION, value);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "backend unreachable");
            ApiError::Network(e.to_string())
        })?;
        let status = response.status();
        // The status line arrived, so a body read failure is not a network error.
        let text = response.text().await.map_err(|e| {
            tracing::warn!(%method, path, status = status.as_u16(), error = %e, "response body unreadable");
            ApiError::Decode(e.to_string())
        })?;

        if !status.is_success() {
            let value = serde_json::from_str::<Value>(&text).unwrap_or(Value::Null);
            let message = error_body_message(&value).unwrap_or(fallback).to_owned();
            tracing::debug!(%method, path, status = status.as_u16(), %message, "backend returned error");
            return Err(ApiError::Application { status: status.as_u16(), message });
        }

        let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
        serde_json::from_str::<T>(text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl AuthBackend for ApiClient {
    async fn login(&self, data: &LoginData) -> Result<AuthResponse, ApiError> {
        ApiClient::login(self, data).await
    }

    async fn register(&self, data: &RegisterData) -> Result<AuthResponse, ApiError> {
        ApiClient::register(self, data).await
    }

    async fn change_password(&self, data: &ChangePasswordData) -> Result<MessageResponse, ApiError> {
        ApiClient::change_password(self, data).await
    }

    async fn fetch_profile(&self) -> Result<UserInfo, ApiError> {
        self.get_info().await
    }
}

/// Percent-encode a single path segment (user ids are opaque).
fn encode_segment(raw: &str) -> String {
    let Ok(mut url) = reqwest::Url::parse("http://segment.invalid/") else {
        return raw.to_owned();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(raw);
    }
    url.path().trim_start_matches('/').to_owned()
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
