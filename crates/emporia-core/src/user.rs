//! # User Types
//!
//! The session's identity records: the user profile and the bearer
//! credential pair.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Credential Lifecycle                                │
//! │                                                                         │
//! │  login ──────────► Credential { access, refresh } persisted            │
//! │                         │                                               │
//! │  access expires ──► refresh succeeds ──► access REPLACED in place      │
//! │                         │                                               │
//! │  refresh fails ───► everything cleared, session terminated             │
//! │  logout ──────────► everything cleared                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The profile is a single record replaced wholesale on login or profile
//! update - never partially merged.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Credential
// =============================================================================

/// The bearer token pair issued at login.
///
/// Both values are opaque - the client never parses or validates them, it
/// only forwards them in `Authorization` headers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    /// Short-lived token authorizing API calls.
    pub access_token: String,

    /// Longer-lived token used only to mint a new access token.
    pub refresh_token: String,
}

impl Credential {
    /// Creates a credential pair.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Credential {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// =============================================================================
// User Profile
// =============================================================================

/// The signed-in user's identity record.
///
/// ## Serialized Shape
/// camelCase field names, matching the record the backend returns at login
/// and the frontend persists under the `user` key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserProfile {
    /// Server-assigned user id.
    pub id: String,

    /// Login name.
    pub username: String,

    /// Role name driving view-layer authorization (e.g. "admin", "buyer").
    pub role: String,

    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,

    pub email: String,
    pub phone: String,
    pub address: String,
}

// =============================================================================
// Unit Tests
// =============================================================================
