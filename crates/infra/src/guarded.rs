//! Role-gated access to the [`InventoryLedger`].
//!
//! Every mutating call is authorized against the session's capabilities
//! before it reaches the ledger. Reads are open to any signed-in session.

use quartermaster_auth::{authorize, explain_authorization, Permission, Role, Session};
use quartermaster_core::{CheckoutId, ItemId, UserId};
use quartermaster_inventory::{CheckoutRecord, CheckoutRequest, Item, ItemDetails, NewItem};

use crate::ledger::{InventoryLedger, LedgerResult};
use crate::store::Store;

#[derive(Debug)]
pub struct GuardedLedger<S> {
    inner: InventoryLedger<S>,
}

impl<S: Store> GuardedLedger<S> {
    pub fn new(inner: InventoryLedger<S>) -> Self {
        Self { inner }
    }

    /// Ungated access for reads.
    pub fn ledger(&self) -> &InventoryLedger<S> {
        &self.inner
    }

    pub fn add_item(&self, session: &Session, new: NewItem) -> LedgerResult<Item> {
        guard(session, Permission::Edit)?;
        self.inner.add_item(session, new)
    }

    pub fn update_item(
        &self,
        session: &Session,
        id: ItemId,
        details: ItemDetails,
    ) -> LedgerResult<Item> {
        guard(session, Permission::Edit)?;
        self.inner.update_item(session, id, details)
    }

    pub fn edit_quantity(&self, session: &Session, id: ItemId, quantity: i64) -> LedgerResult<Item> {
        guard(session, Permission::Edit)?;
        self.inner.edit_quantity(session, id, quantity)
    }

    pub fn delete_item(&self, session: &Session, id: ItemId) -> LedgerResult<()> {
        guard(session, Permission::Delete)?;
        self.inner.delete_item(session, id)
    }

    pub fn checkout(
        &self,
        session: &Session,
        item_id: ItemId,
        request: &CheckoutRequest,
    ) -> LedgerResult<CheckoutRecord> {
        guard(session, Permission::Checkout)?;
        self.inner.checkout(session, item_id, request)
    }

    pub fn checkin(&self, session: &Session, checkout_id: CheckoutId) -> LedgerResult<CheckoutRecord> {
        guard(session, Permission::Checkout)?;
        self.inner.checkin(session, checkout_id)
    }

    pub fn assign_role(&self, session: &Session, user_id: UserId, role: Role) -> LedgerResult<()> {
        guard(session, Permission::ManageUsers)?;
        self.inner.set_user_role(session, user_id, role)
    }
}

fn guard(session: &Session, required: Permission) -> LedgerResult<()> {
    authorize(session, required).map_err(|e| {
        let explanation = explain_authorization(session, required);
        tracing::warn!(
            user_id = %session.user_id,
            role = %session.role,
            permission = %required,
            reason = %explanation.reason,
            "authorization denied"
        );
        e.into()
    })
}
