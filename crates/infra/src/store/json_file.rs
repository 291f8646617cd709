//! File-backed store: one JSON document per collection in a data directory.
//!
//! This is the local-device variant of the repository. Every mutation is a
//! read-modify-write of the whole collection under a per-handle mutex, and
//! each write replaces the file atomically (temp file + rename).

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

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

const ITEMS: &str = "items";
const CHECKOUT_LOG: &str = "checkout_log";
const ACTIVITY_LOG: &str = "activity_log";
const INVENTORY_CHANGES: &str = "inventory_changes";
const USERS: &str = "users";

#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    activity_cap: usize,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (and create if needed) a data directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open_with_activity_cap(dir, DEFAULT_ACTIVITY_CAP)
    }

    pub fn open_with_activity_cap(
        dir: impl Into<PathBuf>,
        activity_cap: usize,
    ) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        tracing::debug!(dir = %dir.display(), "opened json file store");
        Ok(Self {
            dir,
            activity_cap,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.json"))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// A missing file is an empty collection.
    fn load<T: DeserializeOwned>(&self, collection: &'static str) -> Result<Vec<T>, StoreError> {
        let path = self.path(collection);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_slice(&bytes)
            .map_err(|source| StoreError::Serialization { collection, source })
    }

    /// Write to a uniquely named temp file in the data directory, then
    /// rename it over the collection.
    fn save<T: Serialize>(&self, collection: &'static str, rows: &[T]) -> Result<(), StoreError> {
        let path = self.path(collection);
        let bytes = serde_json::to_vec_pretty(rows)
            .map_err(|source| StoreError::Serialization { collection, source })?;
        let io_err = |source: std::io::Error| StoreError::Io {
            path: path.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        tmp.write_all(&bytes).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&path).map_err(|e| io_err(e.error))?;
        Ok(())
    }

    /// Load a collection, let `f` modify it, and write it back.
    fn modify<T, R>(
        &self,
        collection: &'static str,
        f: impl FnOnce(&mut Vec<T>) -> R,
    ) -> Result<R, StoreError>
    where
        T: Serialize + DeserializeOwned,
    {
        let _guard = self.lock()?;
        let mut rows = self.load(collection)?;
        let out = f(&mut rows);
        self.save(collection, &rows)?;
        Ok(out)
    }

    /// Like [`Self::modify`], but the file is only rewritten when `f` returns
    /// `Some`.
    fn modify_if<T, R>(
        &self,
        collection: &'static str,
        f: impl FnOnce(&mut Vec<T>) -> Option<R>,
    ) -> Result<Option<R>, StoreError>
    where
        T: Serialize + DeserializeOwned,
    {
        let _guard = self.lock()?;
        let mut rows = self.load(collection)?;
        let Some(out) = f(&mut rows) else {
            return Ok(None);
        };
        self.save(collection, &rows)?;
        Ok(Some(out))
    }

    fn users_or_default(&self) -> Result<Vec<LocalUser>, StoreError> {
        let users: Vec<LocalUser> = self.load(USERS)?;
        if users.is_empty() {
            return Ok(vec![LocalUser::default_admin()]);
        }
        Ok(users)
    }
}

impl ItemStore for JsonFileStore {
    fn all_items(&self) -> Result<Vec<Item>, StoreError> {
        self.load(ITEMS)
    }

    fn get_item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        Ok(self.load::<Item>(ITEMS)?.into_iter().find(|i| i.id == id))
    }

    fn add_item(&self, item: NewItem) -> Result<Item, StoreError> {
        let item = Item::from_new(ItemId::new(), item, Utc::now());
        self.modify(ITEMS, |items: &mut Vec<Item>| items.insert(0, item.clone()))?;
        Ok(item)
    }

    fn update_item(&self, id: ItemId, patch: ItemPatch) -> Result<Option<Item>, StoreError> {
        self.modify_if(ITEMS, |items: &mut Vec<Item>| {
            items.iter_mut().find(|i| i.id == id).map(|item| {
                item.apply(&patch, Utc::now());
                item.clone()
            })
        })
    }

    fn delete_item(&self, id: ItemId) -> Result<bool, StoreError> {
        let removed = self.modify_if(ITEMS, |items: &mut Vec<Item>| {
            let before = items.len();
            items.retain(|i| i.id != id);
            (items.len() != before).then_some(())
        })?;
        Ok(removed.is_some())
    }
}

impl CheckoutStore for JsonFileStore {
    fn add_checkout(&self, record: NewCheckout) -> Result<CheckoutRecord, StoreError> {
        let record = CheckoutRecord::from_new(CheckoutId::new(), record, Utc::now());
        self.modify(CHECKOUT_LOG, |rows: &mut Vec<CheckoutRecord>| {
            rows.insert(0, record.clone())
        })?;
        Ok(record)
    }

    fn update_checkout(
        &self,
        id: CheckoutId,
        patch: CheckoutPatch,
    ) -> Result<Option<CheckoutRecord>, StoreError> {
        self.modify_if(CHECKOUT_LOG, |rows: &mut Vec<CheckoutRecord>| {
            rows.iter_mut().find(|r| r.id == id).map(|r| {
                r.apply(&patch);
                r.clone()
            })
        })
    }

    fn get_checkout(&self, id: CheckoutId) -> Result<Option<CheckoutRecord>, StoreError> {
        Ok(self
            .load::<CheckoutRecord>(CHECKOUT_LOG)?
            .into_iter()
            .find(|r| r.id == id))
    }

    fn checkouts_for_item(&self, item_id: ItemId) -> Result<Vec<CheckoutRecord>, StoreError> {
        let mut rows: Vec<CheckoutRecord> = self.load(CHECKOUT_LOG)?;
        rows.retain(|r| r.item_id == item_id);
        Ok(rows)
    }

    fn active_checkouts_for_item(
        &self,
        item_id: ItemId,
    ) -> Result<Vec<CheckoutRecord>, StoreError> {
        let mut rows = self.checkouts_for_item(item_id)?;
        rows.retain(CheckoutRecord::is_open);
        Ok(rows)
    }
}

impl ActivityLogStore for JsonFileStore {
    fn add_activity(&self, entry: NewActivity) -> Result<ActivityLogEntry, StoreError> {
        let entry = ActivityLogEntry::from_new(ActivityId::new(), entry, Utc::now());
        let cap = self.activity_cap;
        self.modify(ACTIVITY_LOG, |rows: &mut Vec<ActivityLogEntry>| {
            push_capped(rows, entry.clone(), cap)
        })?;
        Ok(entry)
    }

    fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityLogEntry>, StoreError> {
        let rows: Vec<ActivityLogEntry> = self.load(ACTIVITY_LOG)?;
        Ok(recent(&rows, limit))
    }
}

impl InventoryChangeStore for JsonFileStore {
    fn add_inventory_change(
        &self,
        change: NewInventoryChange,
    ) -> Result<InventoryChange, StoreError> {
        let change = InventoryChange::from_new(ChangeId::new(), change, Utc::now());
        self.modify(INVENTORY_CHANGES, |rows: &mut Vec<InventoryChange>| {
            rows.insert(0, change.clone())
        })?;
        Ok(change)
    }

    fn inventory_changes_for_item(
        &self,
        item_id: ItemId,
    ) -> Result<Vec<InventoryChange>, StoreError> {
        let mut rows: Vec<InventoryChange> = self.load(INVENTORY_CHANGES)?;
        rows.retain(|c| c.item_id == Some(item_id));
        Ok(rows)
    }
}

impl UserStore for JsonFileStore {
    fn all_users(&self) -> Result<Vec<LocalUser>, StoreError> {
        self.users_or_default()
    }

    fn update_user_role(&self, user_id: UserId, role: Role) -> Result<bool, StoreError> {
        let _guard = self.lock()?;
        let mut users = self.users_or_default()?;
        let Some(user) = users.iter_mut().find(|u| u.id == user_id) else {
            return Ok(false);
        };
        user.role = role;
        self.save(USERS, &users)?;
        Ok(true)
    }

    fn upsert_user(&self, user: LocalUser) -> Result<(), StoreError> {
        let _guard = self.lock()?;
        let mut users = self.users_or_default()?;
        match users.iter_mut().find(|u| u.id() == user.id()) {
            Some(existing) => *existing = user,
            None => users.insert(0, user),
        }
        self.save(USERS, &users)
    }
}
