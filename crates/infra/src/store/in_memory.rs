use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use quartermaster_auth::{LocalUser, Role};
use quartermaster_core::{ActivityId, ChangeId, CheckoutId, Entity, ItemId, UserId};
use quartermaster_inventory::activity::{push_capped, recent};
use quartermaster_inventory::{
    ActivityLogEntry, CheckoutPatch, CheckoutRecord, InventoryChange, Item, ItemPatch,
    NewActivity, NewCheckout, NewInventoryChange, NewItem, DEFAULT_ACTIVITY_CAP,
};

use super::r#trait::{
    ActivityLogStore, CheckoutStore, InventoryChangeStore, ItemStore, StoreError, UserStore,
};

/// In-memory store.
///
/// Intended for tests/dev. Collections are kept newest-first, mirroring the
/// file-backed store.
#[derive(Debug)]
pub struct InMemoryStore {
    items: RwLock<Vec<Item>>,
    checkouts: RwLock<Vec<CheckoutRecord>>,
    activity: RwLock<Vec<ActivityLogEntry>>,
    changes: RwLock<Vec<InventoryChange>>,
    users: RwLock<Vec<LocalUser>>,
    activity_cap: usize,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::with_activity_cap(DEFAULT_ACTIVITY_CAP)
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_activity_cap(activity_cap: usize) -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            checkouts: RwLock::new(Vec::new()),
            activity: RwLock::new(Vec::new()),
            changes: RwLock::new(Vec::new()),
            users: RwLock::new(Vec::new()),
            activity_cap,
        }
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StoreError> {
    lock.read().map_err(|_| StoreError::LockPoisoned)
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StoreError> {
    lock.write().map_err(|_| StoreError::LockPoisoned)
}

impl ItemStore for InMemoryStore {
    fn all_items(&self) -> Result<Vec<Item>, StoreError> {
        Ok(read(&self.items)?.clone())
    }

    fn get_item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        Ok(read(&self.items)?.iter().find(|i| i.id == id).cloned())
    }

    fn add_item(&self, item: NewItem) -> Result<Item, StoreError> {
        let item = Item::from_new(ItemId::new(), item, Utc::now());
        write(&self.items)?.insert(0, item.clone());
        Ok(item)
    }

    fn update_item(&self, id: ItemId, patch: ItemPatch) -> Result<Option<Item>, StoreError> {
        let mut items = write(&self.items)?;
        Ok(items.iter_mut().find(|i| i.id == id).map(|item| {
            item.apply(&patch, Utc::now());
            item.clone()
        }))
    }

    fn delete_item(&self, id: ItemId) -> Result<bool, StoreError> {
        let mut items = write(&self.items)?;
        let before = items.len();
        items.retain(|i| i.id != id);
        Ok(items.len() != before)
    }
}

impl CheckoutStore for InMemoryStore {
    fn add_checkout(&self, record: NewCheckout) -> Result<CheckoutRecord, StoreError> {
        let record = CheckoutRecord::from_new(CheckoutId::new(), record, Utc::now());
        write(&self.checkouts)?.insert(0, record.clone());
        Ok(record)
    }

    fn update_checkout(
        &self,
        id: CheckoutId,
        patch: CheckoutPatch,
    ) -> Result<Option<CheckoutRecord>, StoreError> {
        let mut records = write(&self.checkouts)?;
        Ok(records.iter_mut().find(|r| r.id == id).map(|r| {
            r.apply(&patch);
            r.clone()
        }))
    }

    fn get_checkout(&self, id: CheckoutId) -> Result<Option<CheckoutRecord>, StoreError> {
        Ok(read(&self.checkouts)?.iter().find(|r| r.id == id).cloned())
    }

    fn checkouts_for_item(&self, item_id: ItemId) -> Result<Vec<CheckoutRecord>, StoreError> {
        Ok(read(&self.checkouts)?
            .iter()
            .filter(|r| r.item_id == item_id)
            .cloned()
            .collect())
    }

    fn active_checkouts_for_item(
        &self,
        item_id: ItemId,
    ) -> Result<Vec<CheckoutRecord>, StoreError> {
        Ok(read(&self.checkouts)?
            .iter()
            .filter(|r| r.item_id == item_id && r.is_open())
            .cloned()
            .collect())
    }
}

impl ActivityLogStore for InMemoryStore {
    fn add_activity(&self, entry: NewActivity) -> Result<ActivityLogEntry, StoreError> {
        let entry = ActivityLogEntry::from_new(ActivityId::new(), entry, Utc::now());
        let mut log = write(&self.activity)?;
        push_capped(&mut log, entry.clone(), self.activity_cap);
        Ok(entry)
    }

    fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityLogEntry>, StoreError> {
        Ok(recent(&read(&self.activity)?, limit))
    }
}

impl InventoryChangeStore for InMemoryStore {
    fn add_inventory_change(
        &self,
        change: NewInventoryChange,
    ) -> Result<InventoryChange, StoreError> {
        let change = InventoryChange::from_new(ChangeId::new(), change, Utc::now());
        write(&self.changes)?.insert(0, change.clone());
        Ok(change)
    }

    fn inventory_changes_for_item(
        &self,
        item_id: ItemId,
    ) -> Result<Vec<InventoryChange>, StoreError> {
        Ok(read(&self.changes)?
            .iter()
            .filter(|c| c.item_id == Some(item_id))
            .cloned()
            .collect())
    }
}

impl UserStore for InMemoryStore {
    fn all_users(&self) -> Result<Vec<LocalUser>, StoreError> {
        let users = read(&self.users)?;
        if users.is_empty() {
            return Ok(vec![LocalUser::default_admin()]);
        }
        Ok(users.clone())
    }

    fn update_user_role(&self, user_id: UserId, role: Role) -> Result<bool, StoreError> {
        let mut users = write(&self.users)?;
        if users.is_empty() {
            users.push(LocalUser::default_admin());
        }
        match users.iter_mut().find(|u| u.id == user_id) {
            Some(user) => {
                user.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn upsert_user(&self, user: LocalUser) -> Result<(), StoreError> {
        let mut users = write(&self.users)?;
        if users.is_empty() {
            users.push(LocalUser::default_admin());
        }
        match users.iter_mut().find(|u| u.id() == user.id()) {
            Some(existing) => *existing = user,
            None => users.insert(0, user),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quartermaster_auth::ADMIN_USER_ID;
    use quartermaster_inventory::{CheckoutStatus, Condition};

    fn new_item(name: &str) -> NewItem {
        NewItem {
            category: "drill".to_string(),
            name: name.to_string(),
            quantity: 5,
            condition: Condition::Good,
            location: "Armory".to_string(),
            notes: String::new(),
            created_by: None,
        }
    }

    fn new_checkout(item: &Item, qty: u32) -> NewCheckout {
        NewCheckout {
            item_id: item.id,
            item_name: item.name.clone(),
            cadet_name: "Alice".to_string(),
            quantity: qty,
            checkout_date: Utc::now(),
            notes: None,
            created_by: None,
        }
    }

    #[test]
    fn items_are_listed_newest_first() {
        let store = InMemoryStore::new();
        store.add_item(new_item("first")).unwrap();
        store.add_item(new_item("second")).unwrap();
        let names: Vec<_> = store.all_items().unwrap().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[test]
    fn update_and_delete_report_unknown_ids() {
        let store = InMemoryStore::new();
        assert!(store.update_item(ItemId::new(), ItemPatch::in_use(1)).unwrap().is_none());
        assert!(!store.delete_item(ItemId::new()).unwrap());

        let item = store.add_item(new_item("rifle")).unwrap();
        let updated = store.update_item(item.id, ItemPatch::in_use(2)).unwrap().unwrap();
        assert_eq!(updated.in_use, 2);
        assert!(updated.updated_at >= item.updated_at);
        assert!(store.delete_item(item.id).unwrap());
        assert!(store.get_item(item.id).unwrap().is_none());
    }

    #[test]
    fn active_checkouts_exclude_returned_records() {
        let store = InMemoryStore::new();
        let item = store.add_item(new_item("rifle")).unwrap();
        let a = store.add_checkout(new_checkout(&item, 1)).unwrap();
        store.add_checkout(new_checkout(&item, 2)).unwrap();

        store
            .update_checkout(
                a.id,
                CheckoutPatch {
                    status: Some(CheckoutStatus::Returned),
                    checkin_date: Some(Utc::now()),
                },
            )
            .unwrap();

        assert_eq!(store.checkouts_for_item(item.id).unwrap().len(), 2);
        let active = store.active_checkouts_for_item(item.id).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].quantity, 2);
    }

    #[test]
    fn activity_log_honours_cap() {
        let store = InMemoryStore::with_activity_cap(3);
        for n in 0..5 {
            store
                .add_activity(NewActivity::new(None, "A", format!("act {n}"), "x", None))
                .unwrap();
        }
        let recent = store.recent_activity(50).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].action, "act 4");
    }

    #[test]
    fn empty_directory_reads_as_default_admin() {
        let store = InMemoryStore::new();
        let users = store.all_users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, ADMIN_USER_ID);

        assert!(store.update_user_role(ADMIN_USER_ID, Role::Lead).unwrap());
        assert_eq!(store.all_users().unwrap()[0].role, Role::Lead);
        assert!(!store.update_user_role(UserId::new(), Role::Staff).unwrap());
    }

    #[test]
    fn upsert_adds_then_replaces() {
        let store = InMemoryStore::new();
        let mut user = LocalUser::new("Jordan", "j@school.edu", Role::Member);
        store.upsert_user(user.clone()).unwrap();
        user.name = "Jordan R.".to_string();
        store.upsert_user(user.clone()).unwrap();

        let users = store.all_users().unwrap();
        assert_eq!(users.len(), 2);
        assert!(users.iter().any(|u| u.name == "Jordan R."));
    }
}
