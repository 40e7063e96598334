//! Authenticated session and the user-profile cache.
//!
//! DESIGN
//! ======
//! One controller per application owns the session status and a single
//! cache slot `(profile, fetched_at)`. `refresh(false)` serves the slot while
//! it is younger than the freshness window and fetches otherwise;
//! `refresh(true)` always fetches. Staleness is judged only when someone
//! asks, so any number of readers inside the window cost nothing.
//!
//! CONCURRENCY
//! ===========
//! - The slot sits behind a `std::sync::Mutex` that is never held across
//!   an `.await`.
//! - Fetches are serialized by a `tokio::sync::Mutex`. A non-forced caller
//!   that queued behind a fetch which then finished returns that fetch's
//!   outcome, error included, instead of issuing its own request.
//! - Each fetch remembers the session generation it started in. `login`
//!   and `logout` bump the generation, so a response that lands after
//!   either is dropped rather than written into the new session.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::config::DEFAULT_PROFILE_FRESHNESS_MS;
use crate::guard::Route;
use crate::net::types::{AuthResponse, ChangePasswordData, LoginData, MessageResponse, RegisterData, UserInfo};
use crate::net::{ApiError, AuthBackend};
use crate::token_store::{TokenStore, TokenStoreError};

// =============================================================================
// POLICY
// =============================================================================

/// What a failed profile fetch does to a session that holds a token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProfileFailurePolicy {
    /// Leave token and cache alone; stay logged in and let a later refresh retry.
    #[default]
    KeepSession,
    /// Log out when the server rejects the token (401/403). Network
    /// failures still keep the session.
    ClearSession,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    pub freshness: Duration,
    pub on_profile_failure: ProfileFailurePolicy,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            freshness: Duration::from_millis(DEFAULT_PROFILE_FRESHNESS_MS),
            on_profile_failure: ProfileFailurePolicy::default(),
        }
    }
}

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    TokenStore(#[from] TokenStoreError),
    /// A profile fetch failed. Every caller that shared the fetch sees the same error.
    #[error(transparent)]
    Profile(Arc<ApiError>),
    #[error("login succeeded but the server returned no access token")]
    MissingToken,
}

impl SessionError {
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::Api(err) => err.is_unauthorized(),
            Self::Profile(err) => err.is_unauthorized(),
            Self::TokenStore(_) | Self::MissingToken => false,
        }
    }
}

// =============================================================================
// STATE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Unauthenticated,
    Checking,
    Authenticated,
}

/// Read-only view handed to guards and views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub user: Option<UserInfo>,
}

/// Single-slot profile cache.
#[derive(Debug, Clone, Default)]
pub struct ProfileCache {
    profile: Option<UserInfo>,
    fetched_at: Option<Instant>,
}

impl ProfileCache {
    #[must_use]
    pub fn profile(&self) -> Option<&UserInfo> {
        self.profile.as_ref()
    }

    #[must_use]
    pub fn fetched_at(&self) -> Option<Instant> {
        self.fetched_at
    }

    /// Fresh while no more than `window` has passed since the last successful fetch.
    #[must_use]
    pub fn is_fresh(&self, now: Instant, window: Duration) -> bool {
        self.fetched_at
            .is_some_and(|at| now.saturating_duration_since(at) <= window)
    }

    fn store(&mut self, profile: UserInfo, at: Instant) {
        self.profile = Some(profile);
        self.fetched_at = Some(at);
    }

    fn clear(&mut self) {
        self.profile = None;
        self.fetched_at = None;
    }
}

struct SessionInner {
    status: SessionStatus,
    started: bool,
    cache: ProfileCache,
    generation: u64,
    attempted_fetches: u64,
    /// Outcome of the latest fetch that was not discarded; `None` on success.
    last_failure: Option<Arc<ApiError>>,
}

// =============================================================================
// CONTROLLER
// =============================================================================

pub struct SessionController<B: ?Sized> {
    tokens: Arc<dyn TokenStore>,
    policy: SessionPolicy,
    inner: Mutex<SessionInner>,
    fetch_lock: tokio::sync::Mutex<()>,
    backend: Arc<B>,
}

impl<B: AuthBackend + ?Sized> SessionController<B> {
    #[must_use]
    pub fn new(backend: Arc<B>, tokens: Arc<dyn TokenStore>, policy: SessionPolicy) -> Self {
        Self {
            tokens,
            policy,
            inner: Mutex::new(SessionInner {
                status: SessionStatus::Unauthenticated,
                started: false,
                cache: ProfileCache::default(),
                generation: 0,
                attempted_fetches: 0,
                last_failure: None,
            }),
            fetch_lock: tokio::sync::Mutex::new(()),
            backend,
        }
    }

    #[must_use]
    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    /// Current status, user, and loading flag.
    ///
    /// Loading is true until [`SessionController::start`] has run and while
    /// the initial check is in flight.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.lock_inner();
        SessionSnapshot {
            status: inner.status,
            is_authenticated: inner.status == SessionStatus::Authenticated,
            is_loading: !inner.started || inner.status == SessionStatus::Checking,
            user: inner.cache.profile().cloned(),
        }
    }

    /// The cached profile, without any network call.
    #[must_use]
    pub fn cached_profile(&self) -> Option<UserInfo> {
        self.lock_inner().cache.profile().cloned()
    }

    #[must_use]
    pub fn cache(&self) -> ProfileCache {
        self.lock_inner().cache.clone()
    }

    // ---- lifecycle -----------------------------------------------------

    /// Resolve the initial session from the stored token.
    ///
    /// With a token: `Checking`, then a forced profile fetch when nothing is
    /// cached yet. The status afterwards depends on the failure policy.
    ///
    /// # Errors
    ///
    /// Returns the profile fetch error after the status has been resolved, or
    /// a token store error if the token cannot be read.
    pub async fn start(&self) -> Result<SessionSnapshot, SessionError> {
        self.start_at(Instant::now()).await
    }

    /// [`SessionController::start`] with an explicit clock reading.
    ///
    /// # Errors
    ///
    /// See [`SessionController::start`].
    pub async fn start_at(&self, now: Instant) -> Result<SessionSnapshot, SessionError> {
        let has_token = match self.tokens.read() {
            Ok(token) => token.is_some(),
            Err(e) => {
                self.resolve_checking(false);
                return Err(e.into());
            }
        };

        let needs_profile = {
            let mut inner = self.lock_inner();
            inner.started = true;
            inner.status = if has_token { SessionStatus::Checking } else { SessionStatus::Unauthenticated };
            has_token && inner.cache.profile().is_none()
        };

        let fetched = if needs_profile { self.refresh_at(true, now).await.map(|_| ()) } else { Ok(()) };
        self.resolve_checking(self.tokens.is_present());
        fetched?;
        Ok(self.snapshot())
    }

    /// Authenticate, persist the token, and force a profile fetch.
    ///
    /// # Errors
    ///
    /// Returns the backend error for rejected credentials,
    /// [`SessionError::MissingToken`] when the server sends no token, or the
    /// profile fetch error (the session stays logged in under `KeepSession`).
    pub async fn login(&self, data: &LoginData) -> Result<AuthResponse, SessionError> {
        self.login_at(data, Instant::now()).await
    }

    /// [`SessionController::login`] with an explicit clock reading.
    ///
    /// # Errors
    ///
    /// See [`SessionController::login`].
    pub async fn login_at(&self, data: &LoginData, now: Instant) -> Result<AuthResponse, SessionError> {
        let response = self.backend.login(data).await?;
        let token = response
            .access_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .ok_or(SessionError::MissingToken)?;
        self.tokens.save(token)?;

        {
            let mut inner = self.lock_inner();
            inner.started = true;
            inner.status = SessionStatus::Authenticated;
            inner.generation += 1;
            inner.cache.clear();
        }
        tracing::info!(email = %data.email, "logged in");

        self.refresh_at(true, now).await?;
        Ok(response)
    }

    /// Create an account. The caller logs in separately.
    ///
    /// # Errors
    ///
    /// Returns the backend error if registration is refused.
    pub async fn register(&self, data: &RegisterData) -> Result<AuthResponse, SessionError> {
        let response = self.backend.register(data).await?;
        tracing::info!(email = %data.email, "registered account");
        Ok(response)
    }

    /// Change the caller's password. The session is unchanged.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the change is refused.
    pub async fn change_password(&self, data: &ChangePasswordData) -> Result<MessageResponse, SessionError> {
        Ok(self.backend.change_password(data).await?)
    }

    /// Drop the token and cached profile without contacting the backend.
    ///
    /// Returns where the caller should navigate next.
    pub fn logout(&self) -> Route {
        if let Err(e) = self.tokens.clear() {
            tracing::warn!(error = %e, "failed to clear stored token");
        }
        {
            let mut inner = self.lock_inner();
            inner.started = true;
            inner.status = SessionStatus::Unauthenticated;
            inner.generation += 1;
            inner.cache.clear();
        }
        tracing::info!("logged out");
        Route::Login
    }

    // ---- refresh -------------------------------------------------------

    /// Return the profile, fetching only when forced or stale.
    ///
    /// # Errors
    ///
    /// Returns the fetch error when a fetch was needed and failed.
    pub async fn refresh(&self, force: bool) -> Result<Option<UserInfo>, SessionError> {
        self.refresh_at(force, Instant::now()).await
    }

    /// [`SessionController::refresh`] with an explicit clock reading.
    ///
    /// # Errors
    ///
    /// See [`SessionController::refresh`].
    pub async fn refresh_at(&self, force: bool, now: Instant) -> Result<Option<UserInfo>, SessionError> {
        let seen_fetches = {
            let inner = self.lock_inner();
            if !force && inner.cache.is_fresh(now, self.policy.freshness) {
                tracing::debug!("profile served from cache");
                return Ok(inner.cache.profile().cloned());
            }
            inner.attempted_fetches
        };

        let _fetching = self.fetch_lock.lock().await;

        let generation = {
            let inner = self.lock_inner();
            if !force && inner.attempted_fetches != seen_fetches {
                tracing::debug!("profile joined an in-flight fetch");
                return match &inner.last_failure {
                    Some(err) => Err(SessionError::Profile(err.clone())),
                    None => Ok(inner.cache.profile().cloned()),
                };
            }
            inner.generation
        };

        tracing::debug!(force, "fetching profile");
        let result = self.backend.fetch_profile().await;

        let mut inner = self.lock_inner();
        if inner.generation != generation {
            tracing::warn!("discarding profile response from an ended session");
            return Ok(inner.cache.profile().cloned());
        }

        inner.attempted_fetches += 1;
        match result {
            Ok(profile) => {
                inner.cache.store(profile.clone(), now);
                inner.last_failure = None;
                if inner.status == SessionStatus::Checking {
                    inner.status = SessionStatus::Authenticated;
                }
                Ok(Some(profile))
            }
            Err(err) => {
                let err = Arc::new(err);
                inner.last_failure = Some(err.clone());
                self.apply_failure_policy(&mut inner, &err);
                Err(SessionError::Profile(err))
            }
        }
    }

    // ---- internals -----------------------------------------------------

    fn apply_failure_policy(&self, inner: &mut SessionInner, err: &ApiError) {
        let clear = self.policy.on_profile_failure == ProfileFailurePolicy::ClearSession && err.is_unauthorized();
        if !clear {
            tracing::warn!(error = %err, code = err.error_code(), "profile fetch failed; keeping session");
            return;
        }

        tracing::warn!(error = %err, "profile fetch rejected; clearing session");
        if let Err(e) = self.tokens.clear() {
            tracing::warn!(error = %e, "failed to clear stored token");
        }
        inner.status = SessionStatus::Unauthenticated;
        inner.generation += 1;
        inner.cache.clear();
    }

    fn resolve_checking(&self, has_token: bool) {
        let mut inner = self.lock_inner();
        inner.started = true;
        if inner.status == SessionStatus::Checking {
            inner.status = if has_token { SessionStatus::Authenticated } else { SessionStatus::Unauthenticated };
        }
    }

    fn lock_inner(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
