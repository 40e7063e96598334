//! Word-quota arithmetic shown on the dashboard.
//!
//! The server is authoritative for quota enforcement; these helpers only let
//! the client refuse obviously over-limit submissions and render progress.

use crate::net::types::UserInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("text has {requested} words but only {remaining} remain in this period")]
pub struct QuotaExceeded {
    pub requested: u64,
    pub remaining: u64,
}

/// Whitespace-separated word count of `text`.
#[must_use]
pub fn count_words(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

/// Share of the quota consumed, rounded, capped at 100.
///
/// A zero limit reports 100 once anything has been used.
#[must_use]
pub fn usage_percent(used: u64, limit: u64) -> u8 {
    if limit == 0 {
        return if used == 0 { 0 } else { 100 };
    }
    let capped = used.min(limit);
    // Integer round-half-up of capped * 100 / limit.
    let percent = (u128::from(capped) * 200 + u128::from(limit)) / (u128::from(limit) * 2);
    u8::try_from(percent).unwrap_or(100)
}

/// Refuse `text` locally when it exceeds the profile's remaining words.
///
/// # Errors
///
/// Returns [`QuotaExceeded`] with the requested and remaining counts.
pub fn check_quota(text: &str, profile: &UserInfo) -> Result<u64, QuotaExceeded> {
    let requested = count_words(text);
    let remaining = profile.words_remaining();
    if requested > remaining {
        return Err(QuotaExceeded { requested, remaining });
    }
    Ok(requested)
}

#[cfg(test)]
#[path = "usage_test.rs"]
mod tests;
