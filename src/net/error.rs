//! Failure taxonomy for backend calls.

/// User-facing message for transport failures.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again later.";

/// Errors produced by [`super::ApiClient`] operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response reached the client (connect refused, DNS, timeout).
    #[error("Network error. Please try again later.")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("{message}")]
    Application { status: u16, message: String },

    /// A response arrived but its body was unreadable or did not match the expected envelope.
    #[error("response parse failed: {0}")]
    Decode(String),

    /// The stored token cannot be sent as a header value.
    #[error("invalid authorization header: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// The token store could not be read.
    #[error(transparent)]
    TokenStore(#[from] crate::token_store::TokenStoreError),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Network(_) => "E_NETWORK",
            Self::Application { .. } => "E_APPLICATION",
            Self::Decode(_) => "E_DECODE",
            Self::InvalidHeader(_) => "E_INVALID_HEADER",
            Self::TokenStore(_) => "E_TOKEN_STORE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    /// The server rejected the caller's credentials or privileges.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Application { status: 401 | 403, .. })
    }

    /// HTTP status for application failures.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Application { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Pick the message an error body carries: `message`, then `error`.
#[must_use]
pub fn error_body_message(body: &serde_json::Value) -> Option<&str> {
    ["message", "error"]
        .into_iter()
        .find_map(|key| {
            body.get(key)
                .and_then(serde_json::Value::as_str)
                .filter(|msg| !msg.trim().is_empty())
        })
}
