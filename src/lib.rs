//! # humanize
//!
//! Client library for the HumanizeAI backend.
//!
//! The server owns every business rule (authentication, word accounting, the
//! text rewrite itself, subscriptions). This crate owns the client side of the
//! contract: the persisted bearer token, the HTTP client that attaches it, the
//! authenticated session with its time-windowed profile cache, and the route
//! guards that gate dashboard and admin views.
//!
//! [`state::AppState`] wires everything together from a [`config::ClientConfig`].

pub mod config;
pub mod guard;
pub mod net;
pub mod state;
pub mod token_store;
pub mod usage;
