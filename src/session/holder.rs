//! Session Holder
//! Mission: Keep the authenticated identity in memory and in durable storage
//!
//! Restore is optimistic: a stored token is trusted until a protected call
//! is rejected. Logout is local only; the token stays valid server-side
//! until it expires.

use crate::{
    auth::models::{LoginResponse, UserProfile},
    session::storage::{SessionStorage, StoredSession},
};
use anyhow::Result;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

pub struct SessionHolder {
    storage: Arc<dyn SessionStorage>,
    current: RwLock<Option<StoredSession>>,
}

impl SessionHolder {
    /// Empty holder over `storage`. Call `restore` to pick up a stored session.
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            storage,
            current: RwLock::new(None),
        }
    }

    /// Load a persisted session into memory without contacting the server.
    /// Returns whether a session was restored.
    pub fn restore(&self) -> Result<bool> {
        let stored = self.storage.load()?;
        let restored = stored.is_some();
        if let Some(session) = &stored {
            debug!("Restored session for {}", session.user.email);
        }
        *self.current.write() = stored;
        Ok(restored)
    }

    /// Persist a fresh login and make it current.
    pub fn establish(&self, login: LoginResponse) -> Result<UserProfile> {
        let session = StoredSession {
            token: login.token,
            user: login.user,
        };
        self.storage.save(&session)?;

        let user = session.user.clone();
        *self.current.write() = Some(session);
        info!("🔑 Session established for {} ({})", user.email, user.role);
        Ok(user)
    }

    /// Drop the session from memory and storage.
    pub fn clear(&self) -> Result<()> {
        let previous = self.current.write().take();
        self.storage.clear()?;
        if let Some(session) = previous {
            info!("Session cleared for {}", session.user.email);
        }
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().is_some()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.current.read().as_ref().map(|s| s.user.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.current.read().as_ref().map(|s| s.token.clone())
    }

    /// `Authorization` header value for outgoing calls
    pub fn bearer_header(&self) -> Option<String> {
        self.current
            .read()
            .as_ref()
            .map(|s| format!("Bearer {}", s.token))
    }
}
