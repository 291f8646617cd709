//! Inventory ledger: application-level orchestration over a [`Store`].
//!
//! Each mutating operation follows the same shape:
//!
//! ```text
//! read current state from the store
//!   ↓
//! plan (pure domain decision; validation/capacity errors stop here)
//!   ↓
//! write the planned records
//!   ↓
//! append an activity log entry (best effort)
//! ```
//!
//! There is no locking or versioning around the read-then-write sequence. Two
//! callers racing on the same item can leave `in_use` out of step with its open
//! checkout records. Role checks are not done here; see [`crate::guarded`].

use chrono::Utc;
use thiserror::Error;

use quartermaster_auth::{AuthzError, LocalUser, Role, RoleCounts, Session};
use quartermaster_core::{CheckoutId, DomainError, ItemId, UserId};
use quartermaster_inventory::checkout::history_for_item;
use quartermaster_inventory::dashboard::DEFAULT_LOW_STOCK_THRESHOLD;
use quartermaster_inventory::{
    category_summaries, plan_checkin, plan_checkout, plan_quantity_edit, ActivityLogEntry,
    CategorySummary, CheckoutRecord, CheckoutRequest, InventoryChange, InventoryStats, Item,
    ItemDetails, ItemFilter, ItemPatch, NewActivity, NewItem, QuantityPolicy,
    DEFAULT_RECENT_LIMIT,
};

use crate::config::Config;
use crate::store::{Store, StoreError};

/// Number of records returned by [`InventoryLedger::checkout_history`].
pub const CHECKOUT_HISTORY_LIMIT: usize = 20;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Authz(#[from] AuthzError),
}

impl LedgerError {
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            LedgerError::Domain(e) => Some(e),
            _ => None,
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerSettings {
    pub quantity_policy: QuantityPolicy,
    pub recent_activity_limit: usize,
    pub low_stock_threshold: i64,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            quantity_policy: QuantityPolicy::default(),
            recent_activity_limit: DEFAULT_RECENT_LIMIT,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

impl From<&Config> for LedgerSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            quantity_policy: cfg.quantity_policy,
            recent_activity_limit: cfg.recent_activity_limit,
            low_stock_threshold: cfg.low_stock_threshold,
        }
    }
}

/// Ungated inventory operations. Works the same on every backend.
#[derive(Debug)]
pub struct InventoryLedger<S> {
    store: S,
    settings: LedgerSettings,
}

impl<S: Store> InventoryLedger<S> {
    pub fn new(store: S) -> Self {
        Self::with_settings(store, LedgerSettings::default())
    }

    pub fn with_settings(store: S, settings: LedgerSettings) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────

    pub fn items(&self) -> LedgerResult<Vec<Item>> {
        Ok(self.store.all_items()?)
    }

    pub fn find_items(&self, filter: &ItemFilter) -> LedgerResult<Vec<Item>> {
        let mut items = self.store.all_items()?;
        items.retain(|i| filter.matches(i));
        Ok(items)
    }

    pub fn item(&self, id: ItemId) -> LedgerResult<Item> {
        self.store
            .get_item(id)?
            .ok_or_else(|| DomainError::not_found("item", id).into())
    }

    pub fn active_checkouts(&self, item_id: ItemId) -> LedgerResult<Vec<CheckoutRecord>> {
        Ok(self.store.active_checkouts_for_item(item_id)?)
    }

    /// Most recent checkout records for an item, newest first.
    pub fn checkout_history(&self, item_id: ItemId) -> LedgerResult<Vec<CheckoutRecord>> {
        let records = self.store.checkouts_for_item(item_id)?;
        Ok(history_for_item(item_id, &records, CHECKOUT_HISTORY_LIMIT))
    }

    pub fn quantity_changes(&self, item_id: ItemId) -> LedgerResult<Vec<InventoryChange>> {
        Ok(self.store.inventory_changes_for_item(item_id)?)
    }

    pub fn recent_activity(&self) -> LedgerResult<Vec<ActivityLogEntry>> {
        Ok(self
            .store
            .recent_activity(self.settings.recent_activity_limit)?)
    }

    pub fn stats(&self) -> LedgerResult<InventoryStats> {
        let items = self.store.all_items()?;
        Ok(InventoryStats::compute(
            &items,
            self.settings.low_stock_threshold,
        ))
    }

    pub fn category_summaries(&self) -> LedgerResult<Vec<CategorySummary>> {
        Ok(category_summaries(&self.store.all_items()?))
    }

    pub fn users(&self) -> LedgerResult<Vec<LocalUser>> {
        Ok(self.store.all_users()?)
    }

    pub fn role_counts(&self) -> LedgerResult<RoleCounts> {
        Ok(RoleCounts::tally(&self.store.all_users()?))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Item maintenance
    // ─────────────────────────────────────────────────────────────────────

    pub fn add_item(&self, session: &Session, new: NewItem) -> LedgerResult<Item> {
        let new = NewItem {
            created_by: Some(session.user_id),
            ..new.validate()?
        };
        let item = self.store.add_item(new)?;
        tracing::info!(item_id = %item.id, actor = %session.user_id, quantity = item.quantity, "item added");
        self.log(session, "Added item", &item.name, Some(item.id));
        Ok(item)
    }

    /// Edit descriptive fields. Quantities go through [`Self::edit_quantity`]
    /// and the checkout flow.
    pub fn update_item(
        &self,
        session: &Session,
        id: ItemId,
        details: ItemDetails,
    ) -> LedgerResult<Item> {
        if details.is_empty() {
            return Err(DomainError::validation("details", "no fields to update").into());
        }
        let patch = details.validate()?;
        let item = self
            .store
            .update_item(id, patch)?
            .ok_or_else(|| DomainError::not_found("item", id))?;
        tracing::info!(item_id = %id, actor = %session.user_id, "item updated");
        self.log(session, "Updated item", &item.name, Some(item.id));
        Ok(item)
    }

    /// Set an item's total quantity, writing one audit entry per accepted edit.
    pub fn edit_quantity(
        &self,
        session: &Session,
        id: ItemId,
        new_quantity: i64,
    ) -> LedgerResult<Item> {
        let item = self.item(id)?;
        let edit = plan_quantity_edit(
            &item,
            new_quantity,
            self.settings.quantity_policy,
            Some(session.user_id),
            &session.user_name,
        )?;

        if edit.below_in_use {
            tracing::warn!(
                item_id = %id,
                in_use = item.in_use,
                new_quantity = edit.new_quantity,
                "quantity set below amount currently checked out"
            );
        }

        let change = self.store.add_inventory_change(edit.change)?;
        let updated = self
            .store
            .update_item(id, ItemPatch::quantity(edit.new_quantity))?
            .ok_or_else(|| DomainError::not_found("item", id))?;

        tracing::info!(
            item_id = %id,
            actor = %session.user_id,
            old_quantity = item.quantity,
            new_quantity = updated.quantity,
            delta = change.delta(),
            "quantity edited"
        );
        self.log(
            session,
            format!("Updated quantity ({} → {})", item.quantity, updated.quantity),
            &updated.name,
            Some(id),
        );
        Ok(updated)
    }

    /// Remove an item. Its checkout records are left in place.
    pub fn delete_item(&self, session: &Session, id: ItemId) -> LedgerResult<()> {
        let item = self.item(id)?;

        let open = self.store.active_checkouts_for_item(id)?;
        if !open.is_empty() {
            tracing::warn!(
                item_id = %id,
                open_records = open.len(),
                "deleting item with open checkout records"
            );
        }

        if !self.store.delete_item(id)? {
            return Err(DomainError::not_found("item", id).into());
        }
        tracing::info!(item_id = %id, actor = %session.user_id, "item deleted");
        self.log(session, "Deleted item", &item.name, None);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Checkout / check-in
    // ─────────────────────────────────────────────────────────────────────

    /// Borrow `request.quantity` of an item.
    pub fn checkout(
        &self,
        session: &Session,
        item_id: ItemId,
        request: &CheckoutRequest,
    ) -> LedgerResult<CheckoutRecord> {
        let item = self.item(item_id)?;
        let active = self.store.active_checkouts_for_item(item_id)?;

        let plan = match plan_checkout(&item, &active, request, Some(session.user_id), Utc::now())
        {
            Ok(plan) => plan,
            Err(e) => {
                tracing::debug!(item_id = %item_id, error = %e, "checkout rejected");
                return Err(e.into());
            }
        };

        if let Some(stored) = plan.drift {
            tracing::warn!(
                item_id = %item_id,
                stored_in_use = stored,
                open_quantity = plan.open_before,
                "in_use disagreed with open checkout records; recomputing"
            );
        }

        let in_use_after = plan.in_use_after;
        let record = self.store.add_checkout(plan.record)?;
        let updated = self
            .store
            .update_item(item_id, ItemPatch::in_use(in_use_after))?
            .ok_or_else(|| DomainError::not_found("item", item_id))?;

        tracing::info!(
            item_id = %item_id,
            checkout_id = %record.id,
            actor = %session.user_id,
            quantity = record.quantity,
            available = updated.available(),
            "checked out"
        );
        if updated.is_fully_checked_out() {
            tracing::info!(item_id = %item_id, "no stock left on the shelf");
        }
        self.log(
            session,
            format!("Checked out {} to {}", record.quantity, record.cadet_name),
            &item.name,
            Some(item_id),
        );
        Ok(record)
    }

    /// Return an open checkout record.
    pub fn checkin(&self, session: &Session, checkout_id: CheckoutId) -> LedgerResult<CheckoutRecord> {
        let record = self
            .store
            .get_checkout(checkout_id)?
            .ok_or_else(|| DomainError::not_found("checkout record", checkout_id))?;
        let item = self.store.get_item(record.item_id)?;

        let plan = plan_checkin(&record, item.as_ref(), Utc::now())?;

        let returned = self
            .store
            .update_checkout(checkout_id, plan.patch)?
            .ok_or_else(|| DomainError::not_found("checkout record", checkout_id))?;

        match plan.in_use_after {
            Some(in_use) => {
                if plan.clamped {
                    tracing::warn!(
                        item_id = %record.item_id,
                        checkout_id = %checkout_id,
                        quantity = record.quantity,
                        "returned quantity exceeded in_use; clamped at zero"
                    );
                }
                self.store
                    .update_item(record.item_id, ItemPatch::in_use(in_use))?;
            }
            None => tracing::warn!(
                item_id = %record.item_id,
                checkout_id = %checkout_id,
                "returned record references a deleted item"
            ),
        }

        tracing::info!(
            item_id = %record.item_id,
            checkout_id = %checkout_id,
            actor = %session.user_id,
            quantity = record.quantity,
            "checked in"
        );
        self.log(
            session,
            format!("Checked in {} from {}", record.quantity, record.cadet_name),
            &record.item_name,
            item.map(|i| i.id),
        );
        Ok(returned)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────

    pub fn set_user_role(&self, session: &Session, user_id: UserId, role: Role) -> LedgerResult<()> {
        let user = self
            .store
            .all_users()?
            .into_iter()
            .find(|u| u.id == user_id)
            .ok_or_else(|| DomainError::not_found("user", user_id))?;

        if !self.store.update_user_role(user_id, role)? {
            return Err(DomainError::not_found("user", user_id).into());
        }
        tracing::info!(user_id = %user_id, actor = %session.user_id, from = %user.role, to = %role, "role changed");
        self.log(session, format!("Changed role to {role}"), &user.name, None);
        Ok(())
    }

    /// Activity is observational: a failed write is logged, never surfaced.
    fn log(&self, session: &Session, action: impl Into<String>, item_name: &str, item_id: Option<ItemId>) {
        let entry = NewActivity::new(
            Some(session.user_id),
            session.user_name.clone(),
            action,
            item_name,
            item_id,
        );
        if let Err(e) = self.store.add_activity(entry) {
            tracing::error!(error = %e, "failed to record activity");
        }
    }
}
