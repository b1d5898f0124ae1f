//! # Gateway Error Types
//!
//! Error types for the session and API gateway layer.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Gateway Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Transport     │  │  Token Lifecycle│  │     Local               │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Network        │  │  TokenExpired   │  │  Storage                │ │
//! │  │  Http           │  │  RefreshFailed  │  │  Serialization          │ │
//! │  │                 │  │                 │  │  InvalidUrl             │ │
//! │  │                 │  │                 │  │  InvalidUpload / Core   │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Propagation Policy
//! - `TokenExpired` is fully absorbed inside the gateway: it either leads to
//!   a refresh-and-retry or to session teardown, never to the caller.
//! - `RefreshFailed` is the one error with a guaranteed observable effect:
//!   all persisted session records are cleared and the login redirect fires
//!   exactly once.
//! - `Http` errors are surfaced verbatim through the blocking alert sink;
//!   the caller receives no value.
//! - Only the Local category reaches callers as `Err`.

use thiserror::Error;

use crate::storage::StorageError;

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

// =============================================================================
// Expiry Classification
// =============================================================================

/// The backend's exact expired/invalid token messages.
///
/// Classification is string-equality on these sentinels: there is no
/// structured error code on the wire, so the message text itself is the
/// contract. A backend wording change silently breaks this - the constants
/// live here, in one place, so such a break is at least easy to find.
pub const TOKEN_EXPIRED_MESSAGES: [&str; 2] =
    ["Token expired! Please log in again.", "Invalid token!"];

/// Returns true if a backend error message means the access token is
/// expired or invalid.
pub fn is_token_expired_message(message: &str) -> bool {
    TOKEN_EXPIRED_MESSAGES.contains(&message)
}

// =============================================================================
// Gateway Error
// =============================================================================

/// Gateway error covering transport, token lifecycle, and local failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The HTTP request never produced a response (DNS, connect, timeout).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP response that is NOT an expiry sentinel.
    ///
    /// The message is shown verbatim to the user.
    #[error("{message}")]
    Http { status: u16, message: String },

    // =========================================================================
    // Token Lifecycle Errors
    // =========================================================================
    /// Response classified as an expired/invalid access token.
    ///
    /// Internal only - absorbed by the refresh-and-retry cycle.
    #[error("Access token rejected: {message}")]
    TokenExpired { message: String },

    /// Token refresh failed irrecoverably (missing refresh token, network
    /// failure, or non-success refresh response). Triggers session teardown.
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    // =========================================================================
    // Local Errors
    // =========================================================================
    /// Persisted storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// JSON (de)serialization failed.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A request URL could not be built from the base URL and path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A multipart form description could not be turned into a request body.
    #[error("Invalid upload part: {0}")]
    InvalidUpload(String),

    /// Domain-level failure from emporia-core.
    #[error(transparent)]
    Core(#[from] emporia_core::CoreError),
}

impl GatewayError {
    /// The text shown to the end user when this error is alerted.
    ///
    /// HTTP errors surface the backend's message verbatim; everything else
    /// falls back to the error's own rendering.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Http { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_classification_is_exact() {
        assert!(is_token_expired_message(
            "Token expired! Please log in again."
        ));
        assert!(is_token_expired_message("Invalid token!"));

        // Near misses must NOT classify as expiry
        assert!(!is_token_expired_message("Token expired"));
        assert!(!is_token_expired_message("invalid token!"));
        assert!(!is_token_expired_message(
            "Token expired! Please log in again. "
        ));
        assert!(!is_token_expired_message(""));
    }

    #[test]
    fn test_http_user_message_is_verbatim() {
        let err = GatewayError::Http {
            status: 403,
            message: "You do not own this ad".to_string(),
        };
        assert_eq!(err.user_message(), "You do not own this ad");
    }

    #[test]
    fn test_refresh_failed_message() {
        let err = GatewayError::RefreshFailed("no refresh token found".to_string());
        assert_eq!(
            err.to_string(),
            "Token refresh failed: no refresh token found"
        );
    }
}
