//! Inventory domain module.
//!
//! Items, checkout accounting, the quantity-edit audit trail and the activity
//! log, implemented as deterministic domain logic (no IO, no storage).

pub mod activity;
pub mod category;
pub mod change;
pub mod checkout;
pub mod dashboard;
pub mod item;

pub use activity::{ActivityLogEntry, NewActivity, DEFAULT_ACTIVITY_CAP, DEFAULT_RECENT_LIMIT};
pub use category::{find_category, Category, CATEGORIES};
pub use change::{plan_quantity_edit, InventoryChange, NewInventoryChange, QuantityEdit, QuantityPolicy};
pub use checkout::{
    open_quantity, plan_checkin, plan_checkout, CheckinPlan, CheckoutPatch, CheckoutPlan,
    CheckoutRecord, CheckoutRequest, CheckoutStatus, NewCheckout,
};
pub use dashboard::{category_summaries, CategorySummary, InventoryStats, ItemFilter};
pub use item::{Condition, Item, ItemDetails, ItemPatch, NewItem, MAX_QUANTITY};
