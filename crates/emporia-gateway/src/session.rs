//! # Session Management
//!
//! Token persistence and login/logout transitions.
//!
//! ## Session State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Session Lifecycle                                  │
//! │                                                                         │
//! │                 login(profile, credential)                              │
//! │  ┌──────────┐ ────────────────────────────► ┌──────────┐              │
//! │  │ Signed   │                               │ Signed   │              │
//! │  │ out      │ ◄──────────────────────────── │ in       │              │
//! │  └──────────┘   logout()                    └──────────┘              │
//! │       ▲         refresh failure (teardown)       │                     │
//! │       │                                          │                     │
//! │       └── isAuthenticated == false    isAuthenticated == true          │
//! │                                                                         │
//! │  isAuthenticated is DERIVED on every call from the presence of both    │
//! │  a profile record and an access token - never cached, so it can never  │
//! │  go stale across a logout/login pair.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::{debug, info, warn};

use emporia_core::{Credential, UserProfile};

use crate::error::GatewayResult;
use crate::storage::KeyValueStorage;

// =============================================================================
// Storage Keys
// =============================================================================

/// Key holding the short-lived access token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Key holding the long-lived refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Key holding the serialized user profile.
pub const USER_KEY: &str = "user";

// =============================================================================
// Token Store
// =============================================================================

/// Persisted holder for the credential pair and the user profile.
///
/// No logic beyond typed get/set/clear over the injected storage. Every
/// read goes back to storage - the store itself caches nothing.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl TokenStore {
    /// Creates a token store over the given storage.
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        TokenStore { storage }
    }

    /// Current access token, if one is stored.
    pub fn access_token(&self) -> GatewayResult<Option<String>> {
        Ok(self.storage.get(ACCESS_TOKEN_KEY)?)
    }

    /// Replaces the stored access token (login or successful refresh).
    pub fn set_access_token(&self, token: &str) -> GatewayResult<()> {
        self.storage.set(ACCESS_TOKEN_KEY, token)?;
        Ok(())
    }

    /// Current refresh token, if one is stored.
    pub fn refresh_token(&self) -> GatewayResult<Option<String>> {
        Ok(self.storage.get(REFRESH_TOKEN_KEY)?)
    }

    /// Replaces the stored refresh token.
    pub fn set_refresh_token(&self, token: &str) -> GatewayResult<()> {
        self.storage.set(REFRESH_TOKEN_KEY, token)?;
        Ok(())
    }

    /// Current user profile, if one is stored.
    ///
    /// A corrupt profile record is treated as absent (and logged) rather
    /// than wedging the session: the user can simply log in again.
    pub fn profile(&self) -> GatewayResult<Option<UserProfile>> {
        let Some(raw) = self.storage.get(USER_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                warn!(error = %e, "stored profile record is corrupt, ignoring");
                Ok(None)
            }
        }
    }

    /// Replaces the stored user profile wholesale.
    pub fn set_profile(&self, profile: &UserProfile) -> GatewayResult<()> {
        self.storage.set(USER_KEY, &serde_json::to_string(profile)?)?;
        Ok(())
    }

    /// Clears access token, refresh token, and profile.
    pub fn clear_all(&self) -> GatewayResult<()> {
        self.storage.remove(ACCESS_TOKEN_KEY)?;
        self.storage.remove(REFRESH_TOKEN_KEY)?;
        self.storage.remove(USER_KEY)?;
        Ok(())
    }
}

// =============================================================================
// Session Manager
// =============================================================================

/// Owns login/logout transitions and the derived authentication flag.
///
/// Consumed by the view layer's route guard, which re-evaluates
/// [`SessionManager::is_authenticated`] on every navigation.
#[derive(Clone)]
pub struct SessionManager {
    tokens: TokenStore,
}

impl SessionManager {
    /// Creates a session manager over the given token store.
    pub fn new(tokens: TokenStore) -> Self {
        SessionManager { tokens }
    }

    /// The underlying token store.
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Persists the profile and both tokens; the session is active once
    /// this returns.
    pub fn login(&self, profile: &UserProfile, credential: &Credential) -> GatewayResult<()> {
        self.tokens.set_access_token(&credential.access_token)?;
        self.tokens.set_refresh_token(&credential.refresh_token)?;
        self.tokens.set_profile(profile)?;
        info!(user = %profile.username, "session started");
        Ok(())
    }

    /// Clears all persisted session records; the session is inactive once
    /// this returns.
    pub fn logout(&self) -> GatewayResult<()> {
        self.tokens.clear_all()?;
        info!("session ended");
        Ok(())
    }

    /// Whether a user is currently signed in.
    ///
    /// Derived, not stored: `true` iff both a profile record and an access
    /// token are present right now. Recomputed from storage on every call.
    pub fn is_authenticated(&self) -> GatewayResult<bool> {
        let authenticated =
            self.tokens.profile()?.is_some() && self.tokens.access_token()?.is_some();
        debug!(authenticated, "authentication state evaluated");
        Ok(authenticated)
    }

    /// The signed-in user's profile, re-read from storage.
    pub fn current_profile(&self) -> GatewayResult<Option<UserProfile>> {
        self.tokens.profile()
    }

    /// Replaces the stored profile wholesale after an external profile
    /// edit. Field-level merging is the edit form's job, not ours.
    pub fn update_profile(&self, profile: &UserProfile) -> GatewayResult<()> {
        self.tokens.set_profile(profile)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn profile() -> UserProfile {
        UserProfile {
            id: "U1".to_string(),
            username: "jdoe".to_string(),
            role: "buyer".to_string(),
            ..UserProfile::default()
        }
    }

    fn manager() -> (SessionManager, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionManager::new(TokenStore::new(storage.clone()));
        (session, storage)
    }

    #[test]
    fn test_login_persists_all_three_records() {
        let (session, storage) = manager();
        session
            .login(&profile(), &Credential::new("acc-1", "ref-1"))
            .unwrap();

        assert_eq!(
            storage.get(ACCESS_TOKEN_KEY).unwrap(),
            Some("acc-1".to_string())
        );
        assert_eq!(
            storage.get(REFRESH_TOKEN_KEY).unwrap(),
            Some("ref-1".to_string())
        );
        assert!(storage.get(USER_KEY).unwrap().is_some());
        assert!(session.is_authenticated().unwrap());
    }

    #[test]
    fn test_logout_clears_everything() {
        let (session, storage) = manager();
        session
            .login(&profile(), &Credential::new("acc-1", "ref-1"))
            .unwrap();
        session.logout().unwrap();

        assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(REFRESH_TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
        assert!(!session.is_authenticated().unwrap());
    }

    #[test]
    fn test_is_authenticated_requires_both_records() {
        let (session, storage) = manager();
        assert!(!session.is_authenticated().unwrap());

        // Token without profile is not a session
        storage.set(ACCESS_TOKEN_KEY, "acc-1").unwrap();
        assert!(!session.is_authenticated().unwrap());

        // Profile without token is not a session either
        storage.remove(ACCESS_TOKEN_KEY).unwrap();
        session.update_profile(&profile()).unwrap();
        assert!(!session.is_authenticated().unwrap());

        storage.set(ACCESS_TOKEN_KEY, "acc-1").unwrap();
        assert!(session.is_authenticated().unwrap());
    }

    #[test]
    fn test_is_authenticated_never_stale_across_relogin() {
        let (session, _storage) = manager();

        session
            .login(&profile(), &Credential::new("acc-1", "ref-1"))
            .unwrap();
        assert!(session.is_authenticated().unwrap());

        session.logout().unwrap();
        assert!(!session.is_authenticated().unwrap());

        session
            .login(&profile(), &Credential::new("acc-2", "ref-2"))
            .unwrap();
        assert!(session.is_authenticated().unwrap());
        assert_eq!(
            session.tokens().access_token().unwrap(),
            Some("acc-2".to_string())
        );
    }

    #[test]
    fn test_corrupt_profile_reads_as_absent() {
        let (session, storage) = manager();
        storage.set(USER_KEY, "{definitely not json").unwrap();
        storage.set(ACCESS_TOKEN_KEY, "acc-1").unwrap();

        assert_eq!(session.current_profile().unwrap(), None);
        assert!(!session.is_authenticated().unwrap());
    }

    #[test]
    fn test_update_profile_replaces_wholesale() {
        let (session, _storage) = manager();
        session
            .login(&profile(), &Credential::new("acc-1", "ref-1"))
            .unwrap();

        let mut edited = profile();
        edited.email = "new@example.com".to_string();
        session.update_profile(&edited).unwrap();

        let stored = session.current_profile().unwrap().unwrap();
        assert_eq!(stored.email, "new@example.com");
    }
}
