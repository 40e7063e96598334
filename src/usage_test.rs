use super::*;
use crate::net::types::MembershipType;

fn profile(word_limit: u64, words_used: u64) -> UserInfo {
    UserInfo {
        name: "Ada".into(),
        email: "ada@example.com".into(),
        membership: "Free".into(),
        membership_type: MembershipType::Daily,
        word_limit,
        words_used,
        total_words_humanized: 0,
        is_admin: false,
        expiration_date: String::new(),
        days_remaining: 1,
    }
}

// =============================================================
// count_words
// =============================================================

#[test]
fn count_words_empty_and_blank() {
    assert_eq!(count_words(""), 0);
    assert_eq!(count_words("   \n\t "), 0);
}

#[test]
fn count_words_collapses_runs_of_whitespace() {
    assert_eq!(count_words("  one two\n\nthree\tfour  "), 4);
}

// =============================================================
// usage_percent
// =============================================================

#[test]
fn usage_percent_rounds() {
    assert_eq!(usage_percent(0, 500), 0);
    assert_eq!(usage_percent(120, 500), 24);
    assert_eq!(usage_percent(1, 3), 33);
    assert_eq!(usage_percent(2, 3), 67);
    assert_eq!(usage_percent(1, 200), 1);
}

#[test]
fn usage_percent_caps_at_hundred() {
    assert_eq!(usage_percent(500, 500), 100);
    assert_eq!(usage_percent(900, 500), 100);
}

#[test]
fn usage_percent_zero_limit() {
    assert_eq!(usage_percent(0, 0), 0);
    assert_eq!(usage_percent(5, 0), 100);
}

// =============================================================
// check_quota
// =============================================================

#[test]
fn check_quota_allows_exact_fit() {
    assert_eq!(check_quota("a b c", &profile(10, 7)), Ok(3));
}

#[test]
fn check_quota_rejects_over_limit() {
    assert_eq!(
        check_quota("a b c d", &profile(10, 7)),
        Err(QuotaExceeded { requested: 4, remaining: 3 })
    );
}

#[test]
fn check_quota_over_consumed_profile_has_nothing_left() {
    let err = check_quota("word", &profile(10, 12)).unwrap_err();
    assert_eq!(err.remaining, 0);
    assert!(err.to_string().contains("only 0 remain"));
}
