//! Checkout (borrow) and check-in (return) accounting.
//!
//! An item's `in_use` is the summed quantity of its checkout records in `out`
//! status. The planning functions here are pure: they decide what the ledger
//! must write and never touch storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quartermaster_core::{CheckoutId, DomainError, DomainResult, Entity, ItemId, UserId};

use crate::item::Item;

const MAX_BORROWER_LEN: usize = 100;
const MAX_CHECKOUT_NOTES_LEN: usize = 500;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStatus {
    Out,
    Returned,
}

/// One borrowing event for a quantity of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRecord {
    pub id: CheckoutId,
    pub item_id: ItemId,
    pub item_name: String,
    pub cadet_name: String,
    pub quantity: u32,
    pub checkout_date: DateTime<Utc>,
    #[serde(default)]
    pub checkin_date: Option<DateTime<Utc>>,
    pub status: CheckoutStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl CheckoutRecord {
    pub fn from_new(id: CheckoutId, new: NewCheckout, now: DateTime<Utc>) -> Self {
        Self {
            id,
            item_id: new.item_id,
            item_name: new.item_name,
            cadet_name: new.cadet_name,
            quantity: new.quantity,
            checkout_date: new.checkout_date,
            checkin_date: None,
            status: CheckoutStatus::Out,
            notes: new.notes,
            created_by: new.created_by,
            created_at: now,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == CheckoutStatus::Out
    }

    pub fn apply(&mut self, patch: &CheckoutPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(date) = patch.checkin_date {
            self.checkin_date = Some(date);
        }
    }
}

impl Entity for CheckoutRecord {
    type Id = CheckoutId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A record ready to be stored (id and `created_at` assigned by the store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCheckout {
    pub item_id: ItemId,
    pub item_name: String,
    pub cadet_name: String,
    pub quantity: u32,
    pub checkout_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_by: Option<UserId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutPatch {
    pub status: Option<CheckoutStatus>,
    pub checkin_date: Option<DateTime<Utc>>,
}

/// Borrow request as entered by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub cadet_name: String,
    pub quantity: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CheckoutRequest {
    pub fn new(cadet_name: impl Into<String>, quantity: i64) -> Self {
        Self {
            cadet_name: cadet_name.into(),
            quantity,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Returns the trimmed borrower name, the quantity, and the notes (blank
    /// notes collapse to `None`).
    pub fn validate(&self) -> DomainResult<(String, u32, Option<String>)> {
        let name = self.cadet_name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("cadet_name", "cadet name is required"));
        }
        if name.chars().count() > MAX_BORROWER_LEN {
            return Err(DomainError::validation(
                "cadet_name",
                format!("name must be at most {MAX_BORROWER_LEN} characters"),
            ));
        }

        let quantity = u32::try_from(self.quantity)
            .ok()
            .filter(|q| *q >= 1)
            .ok_or_else(|| DomainError::validation("quantity", "quantity must be at least 1"))?;

        let notes = match self.notes.as_deref() {
            Some(n) if n.chars().count() > MAX_CHECKOUT_NOTES_LEN => {
                return Err(DomainError::validation(
                    "notes",
                    format!("notes must be at most {MAX_CHECKOUT_NOTES_LEN} characters"),
                ));
            }
            Some(n) if !n.trim().is_empty() => Some(n.to_string()),
            _ => None,
        };

        Ok((name.to_string(), quantity, notes))
    }
}

/// Summed quantity of open records belonging to `item_id`.
pub fn open_quantity<'a>(
    item_id: ItemId,
    records: impl IntoIterator<Item = &'a CheckoutRecord>,
) -> u32 {
    records
        .into_iter()
        .filter(|r| r.item_id == item_id && r.is_open())
        .map(|r| r.quantity)
        .fold(0u32, u32::saturating_add)
}

/// What the ledger must write to accept a borrow request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPlan {
    pub record: NewCheckout,
    /// Open quantity before this checkout.
    pub open_before: u32,
    /// The item's new `in_use`.
    pub in_use_after: u32,
    /// `Some(stored)` when the item's stored `in_use` disagreed with its open records.
    pub drift: Option<u32>,
}

/// Decide whether a borrow request can be accepted.
///
/// Availability is computed from the open records, not from the item's stored
/// `in_use`.
pub fn plan_checkout<'a>(
    item: &Item,
    active: impl IntoIterator<Item = &'a CheckoutRecord>,
    request: &CheckoutRequest,
    actor: Option<UserId>,
    now: DateTime<Utc>,
) -> DomainResult<CheckoutPlan> {
    let (cadet_name, quantity, notes) = request.validate()?;

    let open_before = open_quantity(item.id, active);
    let available = i64::from(item.quantity) - i64::from(open_before);
    if i64::from(quantity) > available {
        return Err(DomainError::insufficient_stock(quantity, available));
    }

    Ok(CheckoutPlan {
        record: NewCheckout {
            item_id: item.id,
            item_name: item.name.clone(),
            cadet_name,
            quantity,
            checkout_date: now,
            notes,
            created_by: actor,
        },
        open_before,
        in_use_after: open_before + quantity,
        drift: (item.in_use != open_before).then_some(item.in_use),
    })
}

/// What the ledger must write to accept a return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckinPlan {
    pub patch: CheckoutPatch,
    /// The item's new `in_use`, or `None` when the item no longer exists.
    pub in_use_after: Option<u32>,
    /// True when the record's quantity exceeded the item's `in_use`.
    pub clamped: bool,
}

pub fn plan_checkin(
    record: &CheckoutRecord,
    item: Option<&Item>,
    now: DateTime<Utc>,
) -> DomainResult<CheckinPlan> {
    if !record.is_open() {
        return Err(DomainError::conflict(format!(
            "checkout record {} is already returned",
            record.id
        )));
    }

    let (in_use_after, clamped) = match item {
        Some(item) => (
            Some(item.in_use.saturating_sub(record.quantity)),
            record.quantity > item.in_use,
        ),
        None => (None, false),
    };

    Ok(CheckinPlan {
        patch: CheckoutPatch {
            status: Some(CheckoutStatus::Returned),
            checkin_date: Some(now),
        },
        in_use_after,
        clamped,
    })
}

/// Newest-first history for an item, at most `limit` records.
pub fn history_for_item<'a>(
    item_id: ItemId,
    records: impl IntoIterator<Item = &'a CheckoutRecord>,
    limit: usize,
) -> Vec<CheckoutRecord> {
    let mut history: Vec<CheckoutRecord> = records
        .into_iter()
        .filter(|r| r.item_id == item_id)
        .cloned()
        .collect();
    history.sort_by(|a, b| b.checkout_date.cmp(&a.checkout_date));
    history.truncate(limit);
    history
}
