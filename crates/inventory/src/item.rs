use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quartermaster_core::{DomainError, DomainResult, Entity, ItemId, UserId};

/// Upper bound (inclusive) for an item's total quantity.
pub const MAX_QUANTITY: u32 = 10_000;

const MAX_CATEGORY_LEN: usize = 50;
const MAX_NAME_LEN: usize = 200;
const MAX_LOCATION_LEN: usize = 200;
const MAX_NOTES_LEN: usize = 1_000;

/// Physical condition of an item.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    New,
    Good,
    NeedsRepair,
    Unserviceable,
}

impl Condition {
    pub const ALL: [Condition; 4] = [
        Condition::New,
        Condition::Good,
        Condition::NeedsRepair,
        Condition::Unserviceable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::Good => "good",
            Condition::NeedsRepair => "needs-repair",
            Condition::Unserviceable => "unserviceable",
        }
    }
}

impl FromStr for Condition {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| DomainError::validation("condition", "invalid condition selected"))
    }
}

impl core::fmt::Display for Condition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked inventory entry.
///
/// `in_use` is maintained by the checkout ledger and should equal the summed
/// quantity of the item's open checkout records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub category: String,
    pub name: String,
    pub quantity: u32,
    pub in_use: u32,
    pub condition: Condition,
    pub location: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Build a stored item from validated input. `in_use` always starts at zero.
    pub fn from_new(id: ItemId, new: NewItem, now: DateTime<Utc>) -> Self {
        Self {
            id,
            category: new.category,
            name: new.name,
            quantity: new.quantity,
            in_use: 0,
            condition: new.condition,
            location: new.location,
            notes: new.notes,
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Borrowable remainder. Negative when quantity was edited below `in_use`.
    pub fn available(&self) -> i64 {
        i64::from(self.quantity) - i64::from(self.in_use)
    }

    pub fn is_fully_checked_out(&self) -> bool {
        self.available() <= 0
    }

    /// Merge a patch into the item and bump `updated_at`.
    pub fn apply(&mut self, patch: &ItemPatch, now: DateTime<Utc>) {
        if let Some(v) = &patch.category {
            self.category = v.clone();
        }
        if let Some(v) = &patch.name {
            self.name = v.clone();
        }
        if let Some(v) = patch.quantity {
            self.quantity = v;
        }
        if let Some(v) = patch.in_use {
            self.in_use = v;
        }
        if let Some(v) = patch.condition {
            self.condition = v;
        }
        if let Some(v) = &patch.location {
            self.location = v.clone();
        }
        if let Some(v) = &patch.notes {
            self.notes = v.clone();
        }
        self.updated_at = now;
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub category: String,
    pub name: String,
    pub quantity: u32,
    pub condition: Condition,
    pub location: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_by: Option<UserId>,
}

impl NewItem {
    /// Validate and normalize (trim) the input.
    pub fn validate(self) -> DomainResult<NewItem> {
        if self.quantity > MAX_QUANTITY {
            return Err(quantity_out_of_range());
        }
        Ok(NewItem {
            category: required_text("category", &self.category, MAX_CATEGORY_LEN)?,
            name: required_text("name", &self.name, MAX_NAME_LEN)?,
            location: required_text("location", &self.location, MAX_LOCATION_LEN)?,
            notes: notes_text(&self.notes)?,
            ..self
        })
    }
}

/// Operator-editable item fields (everything except quantities).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDetails {
    pub category: Option<String>,
    pub name: Option<String>,
    pub condition: Option<Condition>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl ItemDetails {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.name.is_none()
            && self.condition.is_none()
            && self.location.is_none()
            && self.notes.is_none()
    }

    /// Validate present fields and convert into a store-level patch.
    pub fn validate(self) -> DomainResult<ItemPatch> {
        Ok(ItemPatch {
            category: self
                .category
                .map(|v| required_text("category", &v, MAX_CATEGORY_LEN))
                .transpose()?,
            name: self
                .name
                .map(|v| required_text("name", &v, MAX_NAME_LEN))
                .transpose()?,
            condition: self.condition,
            location: self
                .location
                .map(|v| required_text("location", &v, MAX_LOCATION_LEN))
                .transpose()?,
            notes: self.notes.map(|v| notes_text(&v)).transpose()?,
            ..ItemPatch::default()
        })
    }
}

/// Partial update applied by stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    pub category: Option<String>,
    pub name: Option<String>,
    pub quantity: Option<u32>,
    pub in_use: Option<u32>,
    pub condition: Option<Condition>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl ItemPatch {
    pub fn in_use(value: u32) -> Self {
        Self {
            in_use: Some(value),
            ..Self::default()
        }
    }

    pub fn quantity(value: u32) -> Self {
        Self {
            quantity: Some(value),
            ..Self::default()
        }
    }
}

/// Validate an operator-supplied total quantity (`0..=MAX_QUANTITY`).
pub fn validate_quantity(value: i64) -> DomainResult<u32> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v <= MAX_QUANTITY)
        .ok_or_else(quantity_out_of_range)
}

fn quantity_out_of_range() -> DomainError {
    DomainError::validation(
        "quantity",
        format!("quantity must be between 0 and {MAX_QUANTITY}"),
    )
}

fn required_text(field: &'static str, value: &str, max: usize) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, format!("{field} is required")));
    }
    if trimmed.chars().count() > max {
        return Err(DomainError::validation(
            field,
            format!("{field} must be at most {max} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

fn notes_text(value: &str) -> DomainResult<String> {
    if value.chars().count() > MAX_NOTES_LEN {
        return Err(DomainError::validation(
            "notes",
            format!("notes must be at most {MAX_NOTES_LEN} characters"),
        ));
    }
    Ok(value.to_string())
}
