//! Explicit session state.
//!
//! A `Session` is created on sign-in, dropped on sign-out, and passed by
//! reference into every mutating ledger call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quartermaster_core::UserId;

use crate::{Capabilities, Role};

/// The signed-in actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub role: Role,
    pub signed_in_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        user_id: UserId,
        user_name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
            email: email.into(),
            role,
            signed_in_at: Utc::now(),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.role.capabilities()
    }
}

/// Holds at most one active session.
#[derive(Debug, Default)]
pub struct SessionManager {
    current: Option<Session>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a freshly authenticated session, replacing any previous one.
    pub fn sign_in(&mut self, session: Session) -> &Session {
        tracing::info!(user_id = %session.user_id, role = %session.role, "signed in");
        self.current.insert(session)
    }

    /// Clear the active session, returning it if there was one.
    pub fn sign_out(&mut self) -> Option<Session> {
        let previous = self.current.take();
        if let Some(s) = &previous {
            tracing::info!(user_id = %s.user_id, "signed out");
        }
        previous
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current.is_some()
    }
}
