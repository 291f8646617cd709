//! Infrastructure layer: storage backends, configuration and the ledger
//! services that orchestrate them.

pub mod app;
pub mod config;
pub mod guarded;
pub mod ledger;
pub mod seed;
pub mod store;

mod scenario_tests;

pub use app::{open_store, App, SharedStore};
pub use config::{Backend, Config};
pub use guarded::GuardedLedger;
pub use ledger::{InventoryLedger, LedgerError, LedgerResult, LedgerSettings, CHECKOUT_HISTORY_LIMIT};
pub use seed::seed_demo_data;
