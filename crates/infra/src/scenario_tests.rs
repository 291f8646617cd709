//! End-to-end ledger scenarios run against every backend.
//!
//! Tests: Session → GuardedLedger → InventoryLedger → Store
//!
//! Verifies:
//! - Borrow/return accounting matches the open checkout records
//! - Capacity rejections leave no trace
//! - Both backends behave identically, and the file backend survives a reopen

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use quartermaster_auth::{Role, Session, ADMIN_USER_ID};
    use quartermaster_core::DomainError;
    use quartermaster_inventory::{open_quantity, CheckoutRequest, Condition, NewItem};

    use crate::guarded::GuardedLedger;
    use crate::ledger::{InventoryLedger, LedgerError};
    use crate::store::{CheckoutStore, InMemoryStore, JsonFileStore, Store};

    fn session() -> Session {
        Session::new(ADMIN_USER_ID, "Duty Staff", "staff@x", Role::Staff)
    }

    fn tents() -> NewItem {
        NewItem {
            category: "field".to_string(),
            name: "Tents".to_string(),
            quantity: 10,
            condition: Condition::Good,
            location: "Shed".to_string(),
            notes: String::new(),
            created_by: None,
        }
    }

    fn borrow_and_return_scenario<S: Store>(ledger: &GuardedLedger<S>) {
        let s = session();
        let item = ledger.add_item(&s, tents()).unwrap();
        assert_eq!((item.quantity, item.in_use), (10, 0));

        let alice = ledger
            .checkout(&s, item.id, &CheckoutRequest::new("Alice", 4))
            .unwrap();
        let item_now = ledger.ledger().item(item.id).unwrap();
        assert_eq!(item_now.in_use, 4);
        assert_eq!(item_now.available(), 6);

        let err = ledger
            .checkout(&s, item.id, &CheckoutRequest::new("Bob", 7))
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Domain(DomainError::InsufficientStock { requested: 7, available: 6 })
        ));
        assert_eq!(ledger.ledger().active_checkouts(item.id).unwrap().len(), 1);

        ledger
            .checkout(&s, item.id, &CheckoutRequest::new("Bob", 6))
            .unwrap();
        assert_eq!(ledger.ledger().item(item.id).unwrap().in_use, 10);

        ledger.checkin(&s, alice.id).unwrap();
        let item_now = ledger.ledger().item(item.id).unwrap();
        assert_eq!(item_now.in_use, 6);
        assert_eq!(item_now.available(), 4);

        let active = ledger.ledger().active_checkouts(item.id).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].cadet_name, "Bob");
        assert_eq!(open_quantity(item.id, &active), item_now.in_use);

        let history = ledger.ledger().checkout_history(item.id).unwrap();
        assert_eq!(history.len(), 2);

        let actions: Vec<String> = ledger
            .ledger()
            .recent_activity()
            .unwrap()
            .into_iter()
            .map(|e| e.action)
            .collect();
        assert_eq!(
            actions,
            vec![
                "Checked in 4 from Alice",
                "Checked out 6 to Bob",
                "Checked out 4 to Alice",
                "Added item",
            ]
        );
    }

    #[test]
    fn scenario_in_memory() {
        let ledger = GuardedLedger::new(InventoryLedger::new(InMemoryStore::new()));
        borrow_and_return_scenario(&ledger);
    }

    #[test]
    fn scenario_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = GuardedLedger::new(InventoryLedger::new(
            JsonFileStore::open(dir.path()).unwrap(),
        ));
        borrow_and_return_scenario(&ledger);
    }

    #[test]
    fn scenario_through_shared_trait_object() {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        let ledger = GuardedLedger::new(InventoryLedger::new(store));
        borrow_and_return_scenario(&ledger);
    }

    #[test]
    fn file_backend_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let item_id = {
            let ledger = InventoryLedger::new(JsonFileStore::open(dir.path()).unwrap());
            let item = ledger.add_item(&session(), tents()).unwrap();
            ledger
                .checkout(&session(), item.id, &CheckoutRequest::new("Alice", 3))
                .unwrap();
            item.id
        };

        let reopened = JsonFileStore::open(dir.path()).unwrap();
        let active = reopened.active_checkouts_for_item(item_id).unwrap();
        assert_eq!(open_quantity(item_id, &active), 3);

        let ledger = InventoryLedger::new(reopened);
        assert_eq!(ledger.item(item_id).unwrap().in_use, 3);
        ledger.checkin(&session(), active[0].id).unwrap();
        assert_eq!(ledger.item(item_id).unwrap().in_use, 0);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Borrow(i64),
            Return(usize),
            Edit(i64),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                4 => (-1i64..12).prop_map(Op::Borrow),
                3 => (0usize..16).prop_map(Op::Return),
                1 => (0i64..25).prop_map(Op::Edit),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 200,
                ..ProptestConfig::default()
            })]

            /// Property: through the ledger, in_use always equals the open
            /// record sum, and rejected operations change nothing.
            #[test]
            fn ledger_keeps_in_use_consistent(ops in prop::collection::vec(op(), 0..40)) {
                let ledger = InventoryLedger::new(InMemoryStore::new());
                let s = session();
                let item = ledger.add_item(&s, tents()).unwrap();
                let mut edits = 0usize;

                for op in ops {
                    let before = ledger.item(item.id).unwrap();
                    let open_before = ledger.active_checkouts(item.id).unwrap();
                    match op {
                        Op::Borrow(qty) => {
                            let result = ledger.checkout(&s, item.id, &CheckoutRequest::new("Cadet", qty));
                            let fits = qty >= 1 && qty <= i64::from(before.quantity) - i64::from(before.in_use);
                            prop_assert_eq!(result.is_ok(), fits);
                            if !fits {
                                prop_assert_eq!(ledger.item(item.id).unwrap().in_use, before.in_use);
                                prop_assert_eq!(ledger.active_checkouts(item.id).unwrap().len(), open_before.len());
                            }
                        }
                        Op::Return(idx) => {
                            if let Some(record) = open_before.get(idx) {
                                ledger.checkin(&s, record.id).unwrap();
                                prop_assert!(ledger.checkin(&s, record.id).is_err());
                            }
                        }
                        Op::Edit(quantity) => {
                            ledger.edit_quantity(&s, item.id, quantity).unwrap();
                            edits += 1;
                        }
                    }

                    let now = ledger.item(item.id).unwrap();
                    let open = ledger.active_checkouts(item.id).unwrap();
                    prop_assert_eq!(now.in_use, open_quantity(item.id, &open));
                }

                prop_assert_eq!(ledger.quantity_changes(item.id).unwrap().len(), edits);
            }
        }
    }
}
