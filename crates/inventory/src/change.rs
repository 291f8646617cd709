//! Quantity-edit audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quartermaster_core::{ChangeId, DomainError, DomainResult, Entity, ItemId, UserId};

use crate::item::{validate_quantity, Item};

/// One direct edit of an item's total quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryChange {
    pub id: ChangeId,
    pub item_id: Option<ItemId>,
    pub item_name: String,
    pub old_quantity: u32,
    pub new_quantity: u32,
    #[serde(default)]
    pub changed_by: Option<UserId>,
    pub changed_by_name: String,
    pub changed_at: DateTime<Utc>,
}

impl InventoryChange {
    pub fn from_new(id: ChangeId, new: NewInventoryChange, now: DateTime<Utc>) -> Self {
        Self {
            id,
            item_id: new.item_id,
            item_name: new.item_name,
            old_quantity: new.old_quantity,
            new_quantity: new.new_quantity,
            changed_by: new.changed_by,
            changed_by_name: new.changed_by_name,
            changed_at: now,
        }
    }

    pub fn delta(&self) -> i64 {
        i64::from(self.new_quantity) - i64::from(self.old_quantity)
    }
}

impl Entity for InventoryChange {
    type Id = ChangeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInventoryChange {
    pub item_id: Option<ItemId>,
    pub item_name: String,
    pub old_quantity: u32,
    pub new_quantity: u32,
    pub changed_by: Option<UserId>,
    pub changed_by_name: String,
}

/// Whether a quantity edit may drop the total below what is checked out.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityPolicy {
    /// Accept the edit; `available` goes negative until items come back.
    #[default]
    AllowBelowInUse,
    /// Reject the edit with a conflict.
    RejectBelowInUse,
}

impl core::str::FromStr for QuantityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "allow_below_in_use" | "allow" => Ok(Self::AllowBelowInUse),
            "reject_below_in_use" | "reject" => Ok(Self::RejectBelowInUse),
            other => Err(format!("unknown quantity policy '{other}'")),
        }
    }
}

/// Accepted quantity edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantityEdit {
    pub change: NewInventoryChange,
    pub new_quantity: u32,
    /// The new total is below the item's current `in_use`.
    pub below_in_use: bool,
}

pub fn plan_quantity_edit(
    item: &Item,
    new_quantity: i64,
    policy: QuantityPolicy,
    changed_by: Option<UserId>,
    changed_by_name: &str,
) -> DomainResult<QuantityEdit> {
    let new_quantity = validate_quantity(new_quantity)?;
    let below_in_use = new_quantity < item.in_use;

    if below_in_use && policy == QuantityPolicy::RejectBelowInUse {
        return Err(DomainError::conflict(format!(
            "cannot set quantity of '{}' to {new_quantity}: {} currently checked out",
            item.name, item.in_use
        )));
    }

    Ok(QuantityEdit {
        change: NewInventoryChange {
            item_id: Some(item.id),
            item_name: item.name.clone(),
            old_quantity: item.quantity,
            new_quantity,
            changed_by,
            changed_by_name: changed_by_name.to_string(),
        },
        new_quantity,
        below_in_use,
    })
}
