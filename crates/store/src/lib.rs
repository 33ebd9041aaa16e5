//! `labinv-store` — SQLite persistence for the lab inventory.
//!
//! Owns the item catalog and the usage ledger in a single database file and
//! guarantees that every usage entry lands together with its stock change.

mod backup;
mod catalog;
mod error;
mod export;
mod ledger;
mod rows;
mod store;

pub use error::{StoreError, StoreResult};
pub use export::{INVENTORY_HEADERS, USAGE_HEADERS, write_inventory_csv, write_usage_csv};
pub use store::InventoryStore;
