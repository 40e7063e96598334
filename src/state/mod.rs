//! Client-side application state.
//!
//! DESIGN
//! ======
//! `AppState` is built once at startup and owns the token store, API client,
//! and session controller. Consumers borrow it instead of reaching for
//! process-wide globals; dropping it (or `logout`) ends the session's
//! in-memory lifetime.

pub mod session;

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::net::{ApiClient, ApiError};
use crate::token_store::{FileTokenStore, TokenStore};
use session::{SessionController, SessionPolicy};

#[derive(Clone)]
pub struct AppState {
    pub config: ClientConfig,
    pub tokens: Arc<dyn TokenStore>,
    pub api: Arc<ApiClient>,
    pub session: Arc<SessionController<ApiClient>>,
}

impl AppState {
    /// Build state with a file-backed token store at `config.token_file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: ClientConfig) -> Result<Self, ApiError> {
        let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(&config.token_file));
        Self::with_token_store(config, tokens)
    }

    /// Build state around an existing token store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn with_token_store(config: ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let api = Arc::new(ApiClient::from_config(&config, tokens.clone())?);
        let policy = SessionPolicy { freshness: config.profile_freshness, on_profile_failure: config.profile_failure };
        let session = Arc::new(SessionController::new(api.clone(), tokens.clone(), policy));
        Ok(Self { config, tokens, api, session })
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
