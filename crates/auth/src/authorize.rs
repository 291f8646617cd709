use serde::Serialize;
use thiserror::Error;

use crate::{Permission, Role, Session};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("not signed in")]
    NotSignedIn,

    #[error("forbidden: role '{role}' lacks permission '{permission}'")]
    Forbidden { role: Role, permission: Permission },
}

/// Authorize a session for a mutating operation.
///
/// - No IO
/// - No panics
/// - Static lookup against the role's capability record
pub fn authorize(session: &Session, required: Permission) -> Result<(), AuthzError> {
    if session.capabilities().allows(required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            role: session.role,
            permission: required,
        })
    }
}

/// Same as [`authorize`] but for callers that may not have a session yet.
pub fn authorize_optional(
    session: Option<&Session>,
    required: Permission,
) -> Result<(), AuthzError> {
    match session {
        Some(s) => authorize(s, required),
        None => Err(AuthzError::NotSignedIn),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub required_permission: Permission,
    pub granted: bool,
    pub role: Role,
    pub role_name: &'static str,
    pub effective_permissions: Vec<Permission>,
    pub reason: String,
}

/// Explain why an authorization decision was made (or would be made).
pub fn explain_authorization(session: &Session, required: Permission) -> AuthorizationExplanation {
    let effective = session.capabilities().granted();
    let granted = effective.contains(&required);

    let reason = if granted {
        format!("role '{}' grants '{}'", session.role, required)
    } else if session.role.is_legacy() {
        format!(
            "legacy role '{}' (treated as '{}') does not grant '{}'",
            session.role,
            session.role.canonical(),
            required
        )
    } else {
        format!("role '{}' does not grant '{}'", session.role, required)
    };

    AuthorizationExplanation {
        required_permission: required,
        granted,
        role: session.role,
        role_name: session.role.display_name(),
        effective_permissions: effective,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quartermaster_core::UserId;

    fn session(role: Role) -> Session {
        Session::new(UserId::new(), "Someone", "someone@example.org", role)
    }

    #[test]
    fn staff_may_checkout_but_not_delete() {
        let s = session(Role::Staff);
        assert!(authorize(&s, Permission::Checkout).is_ok());
        assert_eq!(
            authorize(&s, Permission::Delete),
            Err(AuthzError::Forbidden {
                role: Role::Staff,
                permission: Permission::Delete
            })
        );
    }

    #[test]
    fn member_is_view_only() {
        let s = session(Role::Member);
        for p in [
            Permission::Edit,
            Permission::Delete,
            Permission::Checkout,
            Permission::ManageUsers,
        ] {
            assert!(authorize(&s, p).is_err());
        }
    }

    #[test]
    fn missing_session_is_not_signed_in() {
        assert_eq!(
            authorize_optional(None, Permission::Edit),
            Err(AuthzError::NotSignedIn)
        );
    }

    #[test]
    fn explanation_mentions_legacy_mapping() {
        let explanation = explain_authorization(&session(Role::Cadet), Permission::Edit);
        assert!(!explanation.granted);
        assert!(explanation.reason.contains("treated as 'member'"));
        assert!(explanation.effective_permissions.is_empty());
    }

    #[test]
    fn explanation_lists_granted_permissions() {
        let explanation = explain_authorization(&session(Role::Lead), Permission::Delete);
        assert!(explanation.granted);
        assert_eq!(explanation.effective_permissions.len(), 3);
    }
}
