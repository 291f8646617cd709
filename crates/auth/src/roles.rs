use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::permissions::Capabilities;

/// Role identifier used for RBAC.
///
/// `Logistics` and `Cadet` are legacy names kept so older records still
/// deserialize; they carry the same capabilities as `Staff` and `Member`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Lead,
    Staff,
    Member,
    Logistics,
    Cadet,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::Lead,
        Role::Staff,
        Role::Member,
        Role::Logistics,
        Role::Cadet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Lead => "lead",
            Role::Staff => "staff",
            Role::Member => "member",
            Role::Logistics => "logistics",
            Role::Cadet => "cadet",
        }
    }

    /// Human-readable role name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Admin => "Admin (Instructor)",
            Role::Lead => "Lead",
            Role::Staff => "Staff",
            Role::Member => "Member",
            Role::Logistics => "Logistics Officer",
            Role::Cadet => "Cadet User",
        }
    }

    /// Whether this is one of the legacy role names.
    pub fn is_legacy(&self) -> bool {
        matches!(self, Role::Logistics | Role::Cadet)
    }

    /// The current role a legacy role maps onto.
    pub fn canonical(&self) -> Role {
        match self {
            Role::Logistics => Role::Staff,
            Role::Cadet => Role::Member,
            other => *other,
        }
    }

    /// Fixed capability set for the role.
    pub fn capabilities(&self) -> Capabilities {
        match self {
            Role::Admin => Capabilities {
                can_edit: true,
                can_delete: true,
                can_checkout: true,
                can_manage_users: true,
            },
            Role::Lead => Capabilities {
                can_edit: true,
                can_delete: true,
                can_checkout: true,
                can_manage_users: false,
            },
            Role::Staff | Role::Logistics => Capabilities {
                can_edit: true,
                can_delete: false,
                can_checkout: true,
                can_manage_users: false,
            },
            Role::Member | Role::Cadet => Capabilities::NONE,
        }
    }

    /// Resolve a stored role string, falling back to view-only access for
    /// anything missing or unrecognised.
    pub fn resolve(raw: Option<&str>) -> Role {
        raw.and_then(|s| s.parse().ok()).unwrap_or(Role::Member)
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_has_every_capability() {
        let caps = Role::Admin.capabilities();
        assert!(caps.can_edit && caps.can_delete && caps.can_checkout && caps.can_manage_users);
    }

    #[test]
    fn lead_cannot_manage_users() {
        let caps = Role::Lead.capabilities();
        assert!(caps.can_edit && caps.can_delete && caps.can_checkout);
        assert!(!caps.can_manage_users);
    }

    #[test]
    fn staff_can_edit_and_checkout_but_not_delete() {
        let caps = Role::Staff.capabilities();
        assert!(caps.can_edit && caps.can_checkout);
        assert!(!caps.can_delete && !caps.can_manage_users);
    }

    #[test]
    fn legacy_roles_match_their_canonical_roles() {
        assert_eq!(Role::Logistics.capabilities(), Role::Staff.capabilities());
        assert_eq!(Role::Cadet.capabilities(), Role::Member.capabilities());
        assert_eq!(Role::Member.capabilities(), Capabilities::NONE);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("LEAD".parse::<Role>().unwrap(), Role::Lead);
        assert_eq!(" logistics ".parse::<Role>().unwrap(), Role::Logistics);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn resolve_defaults_to_member() {
        assert_eq!(Role::resolve(None), Role::Member);
        assert_eq!(Role::resolve(Some("superuser")), Role::Member);
        assert_eq!(Role::resolve(Some("admin")), Role::Admin);
    }

    #[test]
    fn serializes_as_lowercase_string() {
        let json = serde_json::to_string(&Role::Logistics).unwrap();
        assert_eq!(json, "\"logistics\"");
        let role: Role = serde_json::from_str("\"cadet\"").unwrap();
        assert_eq!(role, Role::Cadet);
    }
}
