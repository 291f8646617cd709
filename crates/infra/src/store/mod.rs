//! Repository contract and its two interchangeable backends.

pub mod in_memory;
pub mod json_file;
pub mod r#trait;

pub use in_memory::InMemoryStore;
pub use json_file::JsonFileStore;
pub use r#trait::{
    ActivityLogStore, CheckoutStore, InventoryChangeStore, ItemStore, Store, StoreError, UserStore,
};
