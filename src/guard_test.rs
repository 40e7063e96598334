use super::*;
use crate::net::types::{MembershipType, UserInfo};
use crate::state::session::SessionStatus;

fn user(is_admin: bool) -> UserInfo {
    UserInfo {
        name: "Ada".into(),
        email: "ada@example.com".into(),
        membership: "Pro".into(),
        membership_type: MembershipType::Monthly,
        word_limit: 50_000,
        words_used: 0,
        total_words_humanized: 0,
        is_admin,
        expiration_date: String::new(),
        days_remaining: 30,
    }
}

fn loading() -> SessionSnapshot {
    SessionSnapshot { status: SessionStatus::Checking, is_authenticated: false, is_loading: true, user: None }
}

fn anonymous() -> SessionSnapshot {
    SessionSnapshot { status: SessionStatus::Unauthenticated, is_authenticated: false, is_loading: false, user: None }
}

fn signed_in(user: Option<UserInfo>) -> SessionSnapshot {
    SessionSnapshot { status: SessionStatus::Authenticated, is_authenticated: true, is_loading: false, user }
}

// =============================================================
// Route parsing
// =============================================================

#[test]
fn parse_known_routes() {
    assert_eq!(Route::parse("/"), Some(Route::Home));
    assert_eq!(Route::parse("/login"), Some(Route::Login));
    assert_eq!(Route::parse("/dashboard/"), Some(Route::Dashboard));
    assert_eq!(Route::parse("/dashboard/humanize?draft=1"), Some(Route::Humanize));
    assert_eq!(Route::parse("/admin/users/abc123"), Some(Route::AdminUser("abc123".into())));
    assert_eq!(Route::parse("/admin/subscriptions#top"), Some(Route::AdminSubscriptions));
}

#[test]
fn parse_unknown_route() {
    assert_eq!(Route::parse("/pricing/enterprise"), None);
    assert_eq!(Route::parse("/admin/users/a/b"), None);
}

#[test]
fn path_round_trips_through_parse() {
    for route in [Route::Settings, Route::AdminUser("u-1".into()), Route::Signup] {
        assert_eq!(Route::parse(&route.path()), Some(route));
    }
}

#[test]
fn access_levels() {
    assert_eq!(Route::Login.access(), Access::Public);
    assert_eq!(Route::Humanize.access(), Access::Authenticated);
    assert_eq!(Route::AdminUsers.access(), Access::Admin);
}

// =============================================================
// AuthenticatedGuard
// =============================================================

#[test]
fn authenticated_guard_waits_while_loading() {
    assert_eq!(AuthenticatedGuard.evaluate(&loading()), GuardDecision::Loading);
}

#[test]
fn authenticated_guard_redirects_anonymous_to_login() {
    assert_eq!(AuthenticatedGuard.evaluate(&anonymous()), GuardDecision::Redirect(Route::Login));
}

#[test]
fn authenticated_guard_renders_without_profile() {
    assert_eq!(AuthenticatedGuard.evaluate(&signed_in(None)), GuardDecision::Render);
}

// =============================================================
// AdminGuard
// =============================================================

#[test]
fn admin_guard_waits_while_loading() {
    assert_eq!(AdminGuard.evaluate(&loading()), GuardDecision::Loading);
}

#[test]
fn admin_guard_redirects_anonymous_to_login() {
    assert_eq!(AdminGuard.evaluate(&anonymous()), GuardDecision::Redirect(Route::Login));
}

#[test]
fn admin_guard_redirects_non_admin_to_dashboard() {
    assert_eq!(AdminGuard.evaluate(&signed_in(Some(user(false)))), GuardDecision::Redirect(Route::Dashboard));
}

#[test]
fn admin_guard_denies_when_profile_missing() {
    assert_eq!(AdminGuard.evaluate(&signed_in(None)), GuardDecision::AccessDenied);
}

#[test]
fn admin_guard_renders_for_admin() {
    assert_eq!(AdminGuard.evaluate(&signed_in(Some(user(true)))), GuardDecision::Render);
}

// =============================================================
// resolve
// =============================================================

#[test]
fn unauthenticated_dashboard_visit_goes_to_login() {
    assert_eq!(resolve("/dashboard", &anonymous()), Some(GuardDecision::Redirect(Route::Login)));
}

#[test]
fn non_admin_admin_visit_goes_to_dashboard() {
    assert_eq!(
        resolve("/admin", &signed_in(Some(user(false)))),
        Some(GuardDecision::Redirect(Route::Dashboard))
    );
}

#[test]
fn admin_visit_renders() {
    assert_eq!(resolve("/admin/users", &signed_in(Some(user(true)))), Some(GuardDecision::Render));
}

#[test]
fn public_routes_always_render() {
    assert_eq!(resolve("/login", &loading()), Some(GuardDecision::Render));
    assert_eq!(resolve("/", &anonymous()), Some(GuardDecision::Render));
}

#[test]
fn unknown_path_resolves_to_none() {
    assert_eq!(resolve("/nowhere/at/all", &anonymous()), None);
}
