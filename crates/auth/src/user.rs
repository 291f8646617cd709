//! Directory record for a person who can sign in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quartermaster_core::{Entity, UserId};

use crate::Role;

/// Fixed identity of the built-in administrator account.
pub const ADMIN_USER_ID: UserId = UserId::from_uuid(Uuid::from_u128(1));
pub const ADMIN_NAME: &str = "Administrator";
pub const ADMIN_EMAIL: &str = "admin@quartermaster.local";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl LocalUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId::new(),
            name: name.into(),
            email: email.into(),
            role,
            created_at: Utc::now(),
        }
    }

    /// The administrator account that exists before any user is stored.
    pub fn default_admin() -> Self {
        Self {
            id: ADMIN_USER_ID,
            name: ADMIN_NAME.to_string(),
            email: ADMIN_EMAIL.to_string(),
            role: Role::Admin,
            created_at: Utc::now(),
        }
    }

    /// Case-insensitive match over name and email.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term) || self.email.to_lowercase().contains(&term)
    }
}

impl Entity for LocalUser {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Head-count of users per role, legacy roles folded into their canonical role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleCounts {
    pub total: usize,
    pub admins: usize,
    pub leads: usize,
    pub staff: usize,
    pub members: usize,
}

impl RoleCounts {
    pub fn tally<'a>(users: impl IntoIterator<Item = &'a LocalUser>) -> Self {
        let mut counts = RoleCounts::default();
        for user in users {
            counts.total += 1;
            match user.role.canonical() {
                Role::Admin => counts.admins += 1,
                Role::Lead => counts.leads += 1,
                Role::Staff | Role::Logistics => counts.staff += 1,
                Role::Member | Role::Cadet => counts.members += 1,
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_admin_has_fixed_identity() {
        let a = LocalUser::default_admin();
        let b = LocalUser::default_admin();
        assert_eq!(a.id, b.id);
        assert_eq!(a.role, Role::Admin);
    }

    #[test]
    fn search_covers_name_and_email() {
        let u = LocalUser::new("Jordan Reyes", "jreyes@school.edu", Role::Staff);
        assert!(u.matches_search("REYES"));
        assert!(u.matches_search("school.edu"));
        assert!(!u.matches_search("smith"));
    }

    #[test]
    fn tally_folds_legacy_roles() {
        let users = vec![
            LocalUser::default_admin(),
            LocalUser::new("a", "a@x", Role::Logistics),
            LocalUser::new("b", "b@x", Role::Staff),
            LocalUser::new("c", "c@x", Role::Cadet),
        ];
        let counts = RoleCounts::tally(&users);
        assert_eq!(counts.total, 4);
        assert_eq!(counts.admins, 1);
        assert_eq!(counts.staff, 2);
        assert_eq!(counts.members, 1);
    }
}
