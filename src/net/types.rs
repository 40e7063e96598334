//! Wire types for the backend's JSON endpoints.

use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// AUTH
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterData {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginData {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePasswordData {
    pub current_password: String,
    pub new_password: String,
}

/// Response from `/login` and `/register`. Only login carries a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Plain `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

// =============================================================================
// PROFILE
// =============================================================================

/// Billing cycle. The free tier resets daily.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipType {
    Daily,
    Monthly,
    Yearly,
    #[serde(other)]
    Other,
}

/// The caller's profile as returned by `/get-info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    pub email: String,
    pub membership: String,
    pub membership_type: MembershipType,
    pub word_limit: u64,
    pub words_used: u64,
    #[serde(default)]
    pub total_words_humanized: u64,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_admin: bool,
    #[serde(default)]
    pub expiration_date: String,
    #[serde(default)]
    pub days_remaining: i64,
}

impl UserInfo {
    /// Quota left in the current period, never negative.
    #[must_use]
    pub fn words_remaining(&self) -> u64 {
        self.word_limit.saturating_sub(self.words_used)
    }
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

// =============================================================================
// HUMANIZE + DASHBOARD
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanizeRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanizeResponse {
    pub humanized_text: String,
    pub word_count: u64,
    pub words_remaining: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub description: String,
    pub word_count: u64,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCall {
    pub id: String,
    pub endpoint: String,
    pub status_code: u16,
    pub timestamp: String,
    #[serde(default)]
    pub description: String,
}

/// Call count for one day bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCallStat {
    pub date: String,
    pub count: u64,
}

// =============================================================================
// ADMIN
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Canceled,
    Expired,
    Trial,
}

/// Cycle an admin may assign. The daily cycle belongs to the free tier and
/// is set by the server on downgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSubscription {
    pub id: String,
    pub user_id: String,
    pub user_email: String,
    pub user_name: String,
    pub membership: String,
    pub membership_type: MembershipType,
    pub word_limit: u64,
    pub words_used: u64,
    #[serde(default)]
    pub total_words_humanized: u64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub expiration_date: String,
    #[serde(default)]
    pub days_remaining: i64,
    pub status: SubscriptionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSubscription {
    pub user_id: String,
    pub membership: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub membership_type: Option<BillingCycle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SubscriptionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_usage: Option<bool>,
}

// =============================================================================
// ENVELOPES
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct UserInfoEnvelope {
    pub user_info: UserInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActivitiesEnvelope {
    pub activities: Vec<Activity>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCallsEnvelope {
    pub api_calls: Vec<ApiCall>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCallStatsEnvelope {
    pub api_call_stats: Vec<ApiCallStat>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UsersEnvelope {
    pub users: Vec<UserSubscription>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserEnvelope {
    pub user: UserSubscription,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
