//! # Session Context
//!
//! The signed-in user and the bearer token every backend call carries.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Session Lifecycle                                │
//! │                                                                         │
//! │   ┌────────────┐  exchange_session ok  ┌────────────────────┐          │
//! │   │ SignedOut  │──────────────────────►│ SignedIn(Session)  │          │
//! │   └─────┬──────┘                       └─────────┬──────────┘          │
//! │         │ 403 access_denied                      │ logout / HTTP 401   │
//! │         ▼                                        ▼                     │
//! │   ┌──────────────────────┐               ┌────────────┐                │
//! │   │ AccessDenied{email}  │               │ SignedOut  │                │
//! │   └──────────────────────┘               └────────────┘                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Persistence
//! When a session file is configured, the session survives restarts of the
//! command-line tool. The file holds the token and the user as JSON and is
//! removed again on sign-out.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::ClientResult;

// =============================================================================
// Session Types
// =============================================================================

/// A user allowed into the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    /// ISO-8601 timestamp as sent by the backend.
    #[serde(default)]
    pub created_at: String,
}

/// Bearer token plus the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Where the user stands with respect to sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    SignedOut,
    SignedIn(Session),
    /// The identity provider knows the user, the workspace does not allow them.
    AccessDenied { email: String },
}

impl AuthState {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, AuthState::SignedIn(_))
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: AuthState,
    return_to: Option<String>,
}

// =============================================================================
// Session Context
// =============================================================================

/// Shared, explicitly passed session context.
///
/// Cheap to clone; clones see the same state.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Inner>>,
    file: Option<PathBuf>,
}

impl SessionContext {
    /// In-memory context, signed out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context persisted to `path`. Nothing is read until [`load`](Self::load).
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        SessionContext {
            inner: Arc::default(),
            file: Some(path.into()),
        }
    }

    /// Restores a previously saved session from the session file.
    ///
    /// A missing file leaves the context signed out. An unreadable file is
    /// logged and ignored so a broken file never locks the user out.
    pub async fn load(&self) -> ClientResult<bool> {
        let Some(path) = &self.file else {
            return Ok(false);
        };
        if !path.exists() {
            debug!(?path, "No saved session");
            return Ok(false);
        }

        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) => {
                warn!(?path, error = %e, "Ignoring unreadable session file");
                return Ok(false);
            }
        };
        match serde_json::from_str::<Session>(&contents) {
            Ok(session) => {
                info!(email = %session.user.email, "Restored saved session");
                self.inner.write().await.state = AuthState::SignedIn(session);
                Ok(true)
            }
            Err(e) => {
                warn!(?path, error = %e, "Ignoring unreadable session file");
                Ok(false)
            }
        }
    }

    /// Records a successful sign-in.
    pub async fn sign_in(&self, session: Session) -> ClientResult<()> {
        info!(email = %session.user.email, "Signed in");
        if let Some(path) = &self.file {
            write_session_file(path, &session).await?;
        }
        self.inner.write().await.state = AuthState::SignedIn(session);
        Ok(())
    }

    /// Forgets the session and the return-to location.
    pub async fn sign_out(&self) -> ClientResult<()> {
        {
            let mut inner = self.inner.write().await;
            inner.state = AuthState::SignedOut;
            inner.return_to = None;
        }
        self.remove_file().await?;
        info!("Signed out");
        Ok(())
    }

    /// Called when the backend answers 401: the token is no longer valid.
    pub async fn on_auth_failure(&self) {
        let was_signed_in = {
            let mut inner = self.inner.write().await;
            let was = inner.state.is_signed_in();
            inner.state = AuthState::SignedOut;
            was
        };
        if was_signed_in {
            warn!("Session rejected by backend, signing out");
        }
        if let Err(e) = self.remove_file().await {
            warn!(error = %e, "Failed to remove session file");
        }
    }

    /// Records that `email` signed in but is not allowed.
    pub async fn deny(&self, email: impl Into<String>) {
        let email = email.into();
        warn!(email = %email, "Access denied");
        self.inner.write().await.state = AuthState::AccessDenied { email };
    }

    /// Current state (cloned).
    pub async fn state(&self) -> AuthState {
        self.inner.read().await.state.clone()
    }

    /// Token for the `Authorization: Bearer` header, if signed in.
    pub async fn bearer_token(&self) -> Option<String> {
        match &self.inner.read().await.state {
            AuthState::SignedIn(session) => Some(session.token.clone()),
            _ => None,
        }
    }

    /// The signed-in user, if any.
    pub async fn current_user(&self) -> Option<User> {
        match &self.inner.read().await.state {
            AuthState::SignedIn(session) => Some(session.user.clone()),
            _ => None,
        }
    }

    /// Replaces the user of the current session (after `/auth/me`).
    pub async fn refresh_user(&self, user: User) -> ClientResult<()> {
        let session = {
            let mut inner = self.inner.write().await;
            match &mut inner.state {
                AuthState::SignedIn(session) => {
                    session.user = user;
                    session.clone()
                }
                _ => return Ok(()),
            }
        };
        if let Some(path) = &self.file {
            write_session_file(path, &session).await?;
        }
        Ok(())
    }

    /// Remembers where to go once sign-in completes.
    pub async fn remember_return_to(&self, location: impl Into<String>) {
        self.inner.write().await.return_to = Some(location.into());
    }

    /// Takes the remembered location; `/` when none was remembered.
    pub async fn take_return_to(&self) -> String {
        self.inner
            .write()
            .await
            .return_to
            .take()
            .unwrap_or_else(|| "/".to_string())
    }

    async fn remove_file(&self) -> ClientResult<()> {
        if let Some(path) = &self.file {
            if path.exists() {
                tokio::fs::remove_file(path).await?;
                debug!(?path, "Session file removed");
            }
        }
        Ok(())
    }
}

async fn write_session_file(path: &Path, session: &Session) -> ClientResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let contents = serde_json::to_string_pretty(session)?;
    tokio::fs::write(path, contents).await?;
    debug!(?path, "Session saved");
    Ok(())
}
