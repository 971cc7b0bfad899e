// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session store: the single source of truth for authentication state.
//!
//! Handles:
//! - Restoring a persisted token at startup
//! - Establishing a session after login (token persisted, user kept in memory)
//! - Logout and token expiry
//! - In-memory profile patches after successful profile mutations
//!
//! Durable storage holds only the token. Storage failures are logged and
//! downgraded; they never fail a session operation.

use crate::error::{ApiError, Result};
use crate::models::{LoginRequest, LoginResponse, ProfilePatch, UserProfile};
use crate::services::ApiGateway;
use crate::storage::{keys, KeyValueStore};
use std::sync::Arc;
use tokio::sync::watch;

/// Coarse authentication status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Startup: the persisted token has not been read yet.
    Loading,
    Anonymous,
    Authenticated,
}

/// In-memory authentication state.
///
/// Only `Authenticated` carries a token, so "authenticated iff token present"
/// holds by construction.
#[derive(Clone, PartialEq)]
pub enum Session {
    Loading,
    Anonymous,
    Authenticated {
        token: String,
        /// Empty after a restore from storage until a collaborator fills it.
        user: Option<UserProfile>,
    },
}

impl Session {
    pub fn status(&self) -> SessionStatus {
        match self {
            Session::Loading => SessionStatus::Loading,
            Session::Anonymous => SessionStatus::Anonymous,
            Session::Authenticated { .. } => SessionStatus::Authenticated,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Session::Authenticated { token, .. } => Some(token),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            Session::Authenticated { user, .. } => user.as_ref(),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Session::Loading => f.write_str("Loading"),
            Session::Anonymous => f.write_str("Anonymous"),
            Session::Authenticated { user, .. } => f
                .debug_struct("Authenticated")
                .field("token", &"<redacted>")
                .field("user", user)
                .finish(),
        }
    }
}

/// Handle onto the process-wide session.
///
/// Clones share the same state; construct one per process and pass it to
/// every component that needs the token.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<watch::Sender<Session>>,
    store: KeyValueStore,
}

impl SessionStore {
    /// Create a session store in the `Loading` state.
    pub fn new(store: KeyValueStore) -> Self {
        let (tx, _rx) = watch::channel(Session::Loading);
        Self {
            state: Arc::new(tx),
            store,
        }
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────────

    /// Restore the session from durable storage.
    ///
    /// A stored token yields `Authenticated` with no user profile; a missing
    /// token or a storage failure yields `Anonymous`. No network access.
    pub async fn initialize(&self) -> SessionStatus {
        let session = match self.store.get(keys::TOKEN).await {
            Ok(Some(token)) if !token.is_empty() => {
                tracing::info!("Restored persisted session token");
                Session::Authenticated { token, user: None }
            }
            Ok(_) => {
                tracing::info!("No persisted session token");
                Session::Anonymous
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted token, starting anonymous");
                Session::Anonymous
            }
        };

        let status = session.status();
        self.state.send_replace(session);
        status
    }

    /// Exchange credentials for a token and establish the session.
    ///
    /// On failure the previous session is left untouched and the error
    /// (carrying the server's message) is returned.
    pub async fn login(
        &self,
        gateway: &ApiGateway,
        credentials: &LoginRequest,
    ) -> Result<()> {
        let response: LoginResponse = gateway
            .post("/users/login", credentials)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Login failed"))?;

        if response.token.trim().is_empty() {
            tracing::warn!("Login response carried an empty token");
            return Err(ApiError::Decode(
                "login response did not include a token".to_string(),
            ));
        }

        self.establish(response.token, response.user).await;
        tracing::info!(email = %credentials.email, "Logged in");
        Ok(())
    }

    /// Persist `token` and make it the current session.
    pub async fn establish(&self, token: String, user: Option<UserProfile>) {
        if let Err(e) = self.store.set(keys::TOKEN, &token).await {
            tracing::warn!(error = %e, "Failed to persist session token, keeping it in memory only");
        }

        self.state
            .send_replace(Session::Authenticated { token, user });
    }

    /// Clear the persisted token and the in-memory session.
    ///
    /// Always succeeds from the caller's point of view.
    pub async fn logout(&self) {
        if let Err(e) = self.store.remove(keys::TOKEN).await {
            tracing::error!(error = %e, "Failed to delete persisted token");
        }

        self.state.send_replace(Session::Anonymous);
        tracing::info!("Logged out");
    }

    /// Drop the session if its token is `rejected_token`.
    ///
    /// A rejection for a token that has since been replaced (a new login
    /// while the request was in flight) leaves the current session alone.
    pub async fn expire(&self, rejected_token: &str, reason: &str) {
        let ended = self.state.send_if_modified(|session| {
            if session.token() == Some(rejected_token) {
                *session = Session::Anonymous;
                true
            } else {
                false
            }
        });

        if !ended {
            tracing::debug!(reason, "Ignoring rejection of a token that is no longer current");
            return;
        }
        tracing::info!(reason, "Session token rejected, ending session");

        if let Err(e) = self.store.remove_if(keys::TOKEN, rejected_token).await {
            tracing::error!(error = %e, "Failed to delete persisted token");
        }
    }

    // ─── Profile ─────────────────────────────────────────────────────────────

    /// Merge `patch` into the in-memory user profile.
    ///
    /// Nothing is written to durable storage. Returns false (and leaves state
    /// alone) when there is no authenticated session.
    pub fn update_profile(&self, patch: ProfilePatch) -> bool {
        let applied = self.state.send_if_modified(|session| match session {
            Session::Authenticated { user, .. } => {
                user.get_or_insert_with(UserProfile::default).apply(patch);
                true
            }
            _ => false,
        });

        if !applied {
            tracing::warn!("Ignoring profile update without an authenticated session");
        }
        applied
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == SessionStatus::Authenticated
    }

    /// Current bearer token, if authenticated.
    pub fn token(&self) -> Option<String> {
        self.state.borrow().token().map(str::to_string)
    }

    /// Snapshot of the current user profile.
    pub fn user(&self) -> Option<UserProfile> {
        self.state.borrow().user().cloned()
    }

    /// Snapshot of the whole session.
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receiver notified on every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Wait until `initialize` has resolved the startup state.
    pub async fn wait_ready(&self) -> SessionStatus {
        let mut rx = self.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let ready = rx
            .wait_for(|s| s.status() != SessionStatus::Loading)
            .await
            .map(|session| session.status());
        ready.unwrap_or(SessionStatus::Anonymous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_starts_loading_and_initializes_anonymous() {
        let session = SessionStore::new(KeyValueStore::new_memory());
        assert_eq!(session.status(), SessionStatus::Loading);
        assert_eq!(session.token(), None);

        assert_eq!(session.initialize().await, SessionStatus::Anonymous);
        assert_eq!(session.wait_ready().await, SessionStatus::Anonymous);
    }

    #[tokio::test]
    async fn test_initialize_restores_token_without_user() {
        let store = KeyValueStore::new_memory();
        store.set(keys::TOKEN, "persisted").await.unwrap();

        let session = SessionStore::new(store);
        assert_eq!(session.initialize().await, SessionStatus::Authenticated);
        assert_eq!(session.token().as_deref(), Some("persisted"));
        assert_eq!(session.user(), None);
    }

    #[tokio::test]
    async fn test_storage_failure_downgrades_to_anonymous() {
        let session = SessionStore::new(KeyValueStore::new_offline());
        assert_eq!(session.initialize().await, SessionStatus::Anonymous);

        // Establish and logout still work in memory.
        session.establish("t".to_string(), None).await;
        assert_eq!(session.token().as_deref(), Some("t"));
        session.logout().await;
        assert_eq!(session.status(), SessionStatus::Anonymous);
    }

    #[tokio::test]
    async fn test_update_profile_requires_session() {
        let session = SessionStore::new(KeyValueStore::new_memory());
        session.initialize().await;

        let patch = ProfilePatch {
            height: Some(180.0),
            ..Default::default()
        };
        assert!(!session.update_profile(patch.clone()));
        assert_eq!(session.user(), None);

        session.establish("t".to_string(), None).await;
        assert!(session.update_profile(patch));
        assert_eq!(session.user().and_then(|u| u.height), Some(180.0));
        assert_eq!(session.token().as_deref(), Some("t"));
    }

    #[tokio::test]
    async fn test_wait_ready_resumes_after_initialize() {
        let session = SessionStore::new(KeyValueStore::new_memory());
        let waiter = {
            let session = session.clone();
            tokio::spawn(async move { session.wait_ready().await })
        };

        tokio::task::yield_now().await;
        session.initialize().await;
        assert_eq!(waiter.await.unwrap(), SessionStatus::Anonymous);
    }

    #[tokio::test]
    async fn test_expire_is_noop_when_anonymous() {
        let store = KeyValueStore::new_memory();
        let session = SessionStore::new(store.clone());
        session.initialize().await;
        session.expire("t", "401").await;
        assert_eq!(session.status(), SessionStatus::Anonymous);

        session.establish("t".to_string(), None).await;
        session.expire("t", "401").await;
        assert_eq!(session.status(), SessionStatus::Anonymous);
        assert!(!store.contains(keys::TOKEN).await.unwrap());
    }

    #[tokio::test]
    async fn test_expire_ignores_replaced_token() {
        let store = KeyValueStore::new_memory();
        let session = SessionStore::new(store.clone());
        session.initialize().await;

        session.establish("old".to_string(), None).await;
        session.establish("fresh".to_string(), None).await;
        let rx = session.subscribe();

        session.expire("old", "401").await;
        assert_eq!(session.token().as_deref(), Some("fresh"));
        assert_eq!(store.get(keys::TOKEN).await.unwrap().as_deref(), Some("fresh"));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::Authenticated {
            token: "secret-token".to_string(),
            user: None,
        };
        assert!(!format!("{:?}", session).contains("secret-token"));
    }
}
