//! Local password sign-in for the built-in administrator.

use thiserror::Error;

use crate::user::{ADMIN_EMAIL, ADMIN_NAME, ADMIN_USER_ID};
use crate::{Role, Session};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
}

/// Checks a password against the configured administrator password.
#[derive(Clone)]
pub struct PasswordAuthenticator {
    admin_password: String,
}

impl PasswordAuthenticator {
    pub fn new(admin_password: impl Into<String>) -> Self {
        Self {
            admin_password: admin_password.into(),
        }
    }

    pub fn sign_in(&self, password: &str) -> Result<Session, AuthError> {
        if password.is_empty() || password != self.admin_password {
            tracing::warn!("rejected sign-in attempt");
            return Err(AuthError::InvalidCredentials);
        }
        Ok(Session::new(ADMIN_USER_ID, ADMIN_NAME, ADMIN_EMAIL, Role::Admin))
    }
}

impl core::fmt::Debug for PasswordAuthenticator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PasswordAuthenticator")
            .field("admin_password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_yields_admin_session() {
        let auth = PasswordAuthenticator::new("hunter2");
        let session = auth.sign_in("hunter2").unwrap();
        assert_eq!(session.user_id, ADMIN_USER_ID);
        assert_eq!(session.role, Role::Admin);
        assert_eq!(session.user_name, "Administrator");
    }

    #[test]
    fn wrong_or_empty_password_is_rejected() {
        let auth = PasswordAuthenticator::new("hunter2");
        assert_eq!(auth.sign_in("hunter3"), Err(AuthError::InvalidCredentials));
        assert_eq!(auth.sign_in(""), Err(AuthError::InvalidCredentials));
    }

    #[test]
    fn debug_output_hides_password() {
        let auth = PasswordAuthenticator::new("hunter2");
        assert!(!format!("{auth:?}").contains("hunter2"));
    }
}
