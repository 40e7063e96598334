//! Route table and the guards that gate authenticated and admin views.
//!
//! DESIGN
//! ======
//! Guards are pure functions of a [`SessionSnapshot`]. They decide; the
//! caller renders or navigates. Admin access fails closed: a missing or
//! false admin flag on the cached profile is enough to deny, whatever the
//! server would say.

use crate::state::session::SessionSnapshot;

pub const ACCESS_DENIED_MESSAGE: &str =
    "You don't have permission to access this page. This area is restricted to administrators only.";

// =============================================================================
// ROUTES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Signup,
    Dashboard,
    Humanize,
    Settings,
    Admin,
    AdminUsers,
    AdminUser(String),
    AdminSubscriptions,
}

/// Who may view a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Admin,
}

impl Route {
    /// Parse an application path. Query strings, fragments, and trailing
    /// slashes are ignored.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Some(Self::Home),
            ["login"] => Some(Self::Login),
            ["signup"] => Some(Self::Signup),
            ["dashboard"] => Some(Self::Dashboard),
            ["dashboard", "humanize"] => Some(Self::Humanize),
            ["dashboard", "settings"] => Some(Self::Settings),
            ["admin"] => Some(Self::Admin),
            ["admin", "users"] => Some(Self::AdminUsers),
            ["admin", "users", id] => Some(Self::AdminUser((*id).to_owned())),
            ["admin", "subscriptions"] => Some(Self::AdminSubscriptions),
            _ => None,
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_owned(),
            Self::Login => "/login".to_owned(),
            Self::Signup => "/signup".to_owned(),
            Self::Dashboard => "/dashboard".to_owned(),
            Self::Humanize => "/dashboard/humanize".to_owned(),
            Self::Settings => "/dashboard/settings".to_owned(),
            Self::Admin => "/admin".to_owned(),
            Self::AdminUsers => "/admin/users".to_owned(),
            Self::AdminUser(id) => format!("/admin/users/{id}"),
            Self::AdminSubscriptions => "/admin/subscriptions".to_owned(),
        }
    }

    #[must_use]
    pub fn access(&self) -> Access {
        match self {
            Self::Home | Self::Login | Self::Signup => Access::Public,
            Self::Dashboard | Self::Humanize | Self::Settings => Access::Authenticated,
            Self::Admin | Self::AdminUsers | Self::AdminUser(_) | Self::AdminSubscriptions => Access::Admin,
        }
    }
}

// =============================================================================
// GUARDS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// The session check is still running; show a loading indicator.
    Loading,
    /// Navigate elsewhere without rendering the protected content.
    Redirect(Route),
    /// Authenticated but the admin flag cannot be confirmed.
    AccessDenied,
    Render,
}

pub trait RouteGuard: Send + Sync {
    fn evaluate(&self, session: &SessionSnapshot) -> GuardDecision;
}

/// Requires a logged-in session.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthenticatedGuard;

impl RouteGuard for AuthenticatedGuard {
    fn evaluate(&self, session: &SessionSnapshot) -> GuardDecision {
        if session.is_loading {
            return GuardDecision::Loading;
        }
        if !session.is_authenticated {
            return GuardDecision::Redirect(Route::Login);
        }
        GuardDecision::Render
    }
}

/// Requires a logged-in session whose cached profile carries the admin flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminGuard;

impl RouteGuard for AdminGuard {
    fn evaluate(&self, session: &SessionSnapshot) -> GuardDecision {
        match AuthenticatedGuard.evaluate(session) {
            GuardDecision::Render => {}
            other => return other,
        }
        match &session.user {
            Some(user) if user.is_admin => GuardDecision::Render,
            Some(_) => GuardDecision::Redirect(Route::Dashboard),
            None => GuardDecision::AccessDenied,
        }
    }
}

/// Guard for a route, `None` for public routes.
#[must_use]
pub fn guard_for(route: &Route) -> Option<&'static dyn RouteGuard> {
    match route.access() {
        Access::Public => None,
        Access::Authenticated => Some(&AuthenticatedGuard),
        Access::Admin => Some(&AdminGuard),
    }
}

/// Decide what visiting `path` does for `session`. Unknown paths yield `None`.
#[must_use]
pub fn resolve(path: &str, session: &SessionSnapshot) -> Option<GuardDecision> {
    let route = Route::parse(path)?;
    Some(guard_for(&route).map_or(GuardDecision::Render, |guard| guard.evaluate(session)))
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
