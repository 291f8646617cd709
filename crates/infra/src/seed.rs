//! Demo inventory for first-run installs.

use chrono::Utc;

use quartermaster_auth::{user::ADMIN_NAME, ADMIN_USER_ID};
use quartermaster_inventory::{Condition, ItemPatch, NewActivity, NewCheckout, NewItem};

use crate::store::{Store, StoreError};

const DEMO_BORROWER: &str = "Demo Issue";

struct DemoItem {
    category: &'static str,
    name: &'static str,
    quantity: u32,
    in_use: u32,
    condition: Condition,
    location: &'static str,
    notes: &'static str,
}

const DEMO_ITEMS: [DemoItem; 6] = [
    DemoItem {
        category: "blues",
        name: "Service Dress Coat (Male)",
        quantity: 25,
        in_use: 5,
        condition: Condition::Good,
        location: "Storage Room A",
        notes: "Various sizes available",
    },
    DemoItem {
        category: "ocp",
        name: "ABU Pants",
        quantity: 40,
        in_use: 8,
        condition: Condition::Good,
        location: "Storage Room A",
        notes: "",
    },
    DemoItem {
        category: "drill",
        name: "Drill Rifles",
        quantity: 15,
        in_use: 3,
        condition: Condition::Good,
        location: "Armory",
        notes: "Demilitarized training rifles",
    },
    DemoItem {
        category: "pt",
        name: "PT Shorts",
        quantity: 50,
        in_use: 10,
        condition: Condition::New,
        location: "Storage Room B",
        notes: "",
    },
    DemoItem {
        category: "drill",
        name: "Color Guard Flags",
        quantity: 4,
        in_use: 0,
        condition: Condition::Good,
        location: "Ceremonial Closet",
        notes: "US, State, AF, AFJROTC",
    },
    DemoItem {
        category: "classroom",
        name: "Flight Simulators",
        quantity: 3,
        in_use: 1,
        condition: Condition::Good,
        location: "Computer Lab",
        notes: "Desktop flight sim setups",
    },
];

/// Populate an empty store with demo items.
///
/// Pre-existing usage is written as open checkout records so every item's
/// `in_use` matches its records. Returns `false` (and writes nothing) when the
/// store already holds items.
pub fn seed_demo_data<S: Store + ?Sized>(store: &S) -> Result<bool, StoreError> {
    if !store.all_items()?.is_empty() {
        tracing::debug!("store already has items; skipping demo seed");
        return Ok(false);
    }

    for demo in &DEMO_ITEMS {
        let item = store.add_item(NewItem {
            category: demo.category.to_string(),
            name: demo.name.to_string(),
            quantity: demo.quantity,
            condition: demo.condition,
            location: demo.location.to_string(),
            notes: demo.notes.to_string(),
            created_by: Some(ADMIN_USER_ID),
        })?;

        if demo.in_use > 0 {
            store.add_checkout(NewCheckout {
                item_id: item.id,
                item_name: item.name.clone(),
                cadet_name: DEMO_BORROWER.to_string(),
                quantity: demo.in_use,
                checkout_date: Utc::now(),
                notes: Some("Seeded demo usage".to_string()),
                created_by: Some(ADMIN_USER_ID),
            })?;
            store.update_item(item.id, ItemPatch::in_use(demo.in_use))?;
        }
    }

    store.add_activity(NewActivity::new(
        Some(ADMIN_USER_ID),
        ADMIN_NAME,
        "System initialized",
        "Demo data loaded",
        None,
    ))?;

    tracing::info!(items = DEMO_ITEMS.len(), "seeded demo data");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ActivityLogStore, CheckoutStore, InMemoryStore, ItemStore};
    use quartermaster_inventory::{find_category, open_quantity};

    #[test]
    fn seeds_once_with_consistent_usage() {
        let store = InMemoryStore::new();
        assert!(seed_demo_data(&store).unwrap());
        assert!(!seed_demo_data(&store).unwrap());

        let items = store.all_items().unwrap();
        assert_eq!(items.len(), 6);
        for item in &items {
            assert!(find_category(&item.category).is_some(), "{}", item.category);
            let active = store.active_checkouts_for_item(item.id).unwrap();
            assert_eq!(open_quantity(item.id, &active), item.in_use, "{}", item.name);
        }

        let log = store.recent_activity(50).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].action, "System initialized");
    }
}
