use serde::{Deserialize, Serialize};

/// A mutating operation that must be granted by the actor's role.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Add items, edit item fields, edit total quantity.
    Edit,
    /// Delete items.
    Delete,
    /// Check items out and back in.
    Checkout,
    /// Change other users' roles.
    ManageUsers,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Edit => "inventory.edit",
            Permission::Delete => "inventory.delete",
            Permission::Checkout => "inventory.checkout",
            Permission::ManageUsers => "users.manage",
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability record attached to a role.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_checkout: bool,
    pub can_manage_users: bool,
}

impl Capabilities {
    /// View-only access.
    pub const NONE: Capabilities = Capabilities {
        can_edit: false,
        can_delete: false,
        can_checkout: false,
        can_manage_users: false,
    };

    pub fn allows(&self, permission: Permission) -> bool {
        match permission {
            Permission::Edit => self.can_edit,
            Permission::Delete => self.can_delete,
            Permission::Checkout => self.can_checkout,
            Permission::ManageUsers => self.can_manage_users,
        }
    }

    /// Permissions granted by this record, in declaration order.
    pub fn granted(&self) -> Vec<Permission> {
        [
            Permission::Edit,
            Permission::Delete,
            Permission::Checkout,
            Permission::ManageUsers,
        ]
        .into_iter()
        .filter(|p| self.allows(*p))
        .collect()
    }
}
