//! HTTP access to the HumanizeAI backend.
//!
//! DESIGN
//! ======
//! `types` holds the serde wire models, `error` the failure taxonomy, and
//! `api` the reqwest client plus the [`api::AuthBackend`] seam the session
//! controller depends on.

pub mod api;
pub mod error;
pub mod types;

pub use api::{ApiClient, AuthBackend};
pub use error::ApiError;
