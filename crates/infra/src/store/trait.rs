use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use quartermaster_auth::{LocalUser, Role};
use quartermaster_core::{CheckoutId, ItemId, UserId};
use quartermaster_inventory::{
    ActivityLogEntry, CheckoutPatch, CheckoutRecord, InventoryChange, Item, ItemPatch,
    NewActivity, NewCheckout, NewInventoryChange, NewItem,
};

/// Persistence failure.
///
/// These are **infrastructure errors** as opposed to domain errors
/// (validation, capacity, missing records).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not (de)serialize collection '{collection}': {source}")]
    Serialization {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Item collection.
///
/// `all_items` returns newest first. `update_item` returns `None` when the id is
/// unknown and bumps `updated_at` otherwise.
pub trait ItemStore: Send + Sync {
    fn all_items(&self) -> Result<Vec<Item>, StoreError>;
    fn get_item(&self, id: ItemId) -> Result<Option<Item>, StoreError>;
    fn add_item(&self, item: NewItem) -> Result<Item, StoreError>;
    fn update_item(&self, id: ItemId, patch: ItemPatch) -> Result<Option<Item>, StoreError>;
    fn delete_item(&self, id: ItemId) -> Result<bool, StoreError>;
}

/// Checkout log.
pub trait CheckoutStore: Send + Sync {
    fn add_checkout(&self, record: NewCheckout) -> Result<CheckoutRecord, StoreError>;
    fn update_checkout(
        &self,
        id: CheckoutId,
        patch: CheckoutPatch,
    ) -> Result<Option<CheckoutRecord>, StoreError>;
    fn get_checkout(&self, id: CheckoutId) -> Result<Option<CheckoutRecord>, StoreError>;
    fn checkouts_for_item(&self, item_id: ItemId) -> Result<Vec<CheckoutRecord>, StoreError>;
    /// Records for `item_id` still in `out` status.
    fn active_checkouts_for_item(&self, item_id: ItemId)
    -> Result<Vec<CheckoutRecord>, StoreError>;
}

/// Capped, newest-first activity log. The cap is a property of the backend.
pub trait ActivityLogStore: Send + Sync {
    fn add_activity(&self, entry: NewActivity) -> Result<ActivityLogEntry, StoreError>;
    fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityLogEntry>, StoreError>;
}

/// Quantity-edit audit trail.
pub trait InventoryChangeStore: Send + Sync {
    fn add_inventory_change(
        &self,
        change: NewInventoryChange,
    ) -> Result<InventoryChange, StoreError>;
    /// Newest first.
    fn inventory_changes_for_item(
        &self,
        item_id: ItemId,
    ) -> Result<Vec<InventoryChange>, StoreError>;
}

/// User directory. An empty directory reads as the built-in administrator.
pub trait UserStore: Send + Sync {
    fn all_users(&self) -> Result<Vec<LocalUser>, StoreError>;
    fn update_user_role(&self, user_id: UserId, role: Role) -> Result<bool, StoreError>;
    fn upsert_user(&self, user: LocalUser) -> Result<(), StoreError>;
}

/// Everything the ledger needs from a backend.
pub trait Store:
    ItemStore + CheckoutStore + ActivityLogStore + InventoryChangeStore + UserStore
{
}

impl<T> Store for T where
    T: ItemStore + CheckoutStore + ActivityLogStore + InventoryChangeStore + UserStore + ?Sized
{
}

impl<S> ItemStore for Arc<S>
where
    S: ItemStore + ?Sized,
{
    fn all_items(&self) -> Result<Vec<Item>, StoreError> {
        (**self).all_items()
    }

    fn get_item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        (**self).get_item(id)
    }

    fn add_item(&self, item: NewItem) -> Result<Item, StoreError> {
        (**self).add_item(item)
    }

    fn update_item(&self, id: ItemId, patch: ItemPatch) -> Result<Option<Item>, StoreError> {
        (**self).update_item(id, patch)
    }

    fn delete_item(&self, id: ItemId) -> Result<bool, StoreError> {
        (**self).delete_item(id)
    }
}

impl<S> CheckoutStore for Arc<S>
where
    S: CheckoutStore + ?Sized,
{
    fn add_checkout(&self, record: NewCheckout) -> Result<CheckoutRecord, StoreError> {
        (**self).add_checkout(record)
    }

    fn update_checkout(
        &self,
        id: CheckoutId,
        patch: CheckoutPatch,
    ) -> Result<Option<CheckoutRecord>, StoreError> {
        (**self).update_checkout(id, patch)
    }

    fn get_checkout(&self, id: CheckoutId) -> Result<Option<CheckoutRecord>, StoreError> {
        (**self).get_checkout(id)
    }

    fn checkouts_for_item(&self, item_id: ItemId) -> Result<Vec<CheckoutRecord>, StoreError> {
        (**self).checkouts_for_item(item_id)
    }

    fn active_checkouts_for_item(
        &self,
        item_id: ItemId,
    ) -> Result<Vec<CheckoutRecord>, StoreError> {
        (**self).active_checkouts_for_item(item_id)
    }
}

impl<S> ActivityLogStore for Arc<S>
where
    S: ActivityLogStore + ?Sized,
{
    fn add_activity(&self, entry: NewActivity) -> Result<ActivityLogEntry, StoreError> {
        (**self).add_activity(entry)
    }

    fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityLogEntry>, StoreError> {
        (**self).recent_activity(limit)
    }
}

impl<S> InventoryChangeStore for Arc<S>
where
    S: InventoryChangeStore + ?Sized,
{
    fn add_inventory_change(
        &self,
        change: NewInventoryChange,
    ) -> Result<InventoryChange, StoreError> {
        (**self).add_inventory_change(change)
    }

    fn inventory_changes_for_item(
        &self,
        item_id: ItemId,
    ) -> Result<Vec<InventoryChange>, StoreError> {
        (**self).inventory_changes_for_item(item_id)
    }
}

impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    fn all_users(&self) -> Result<Vec<LocalUser>, StoreError> {
        (**self).all_users()
    }

    fn update_user_role(&self, user_id: UserId, role: Role) -> Result<bool, StoreError> {
        (**self).update_user_role(user_id, role)
    }

    fn upsert_user(&self, user: LocalUser) -> Result<(), StoreError> {
        (**self).upsert_user(user)
    }
}
