//! `labinv-ai`
//!
//! **Responsibility:** Optional prediction helpers.
//!
//! This crate is intentionally **not** part of the data model:
//! - It reads snapshots supplied by the caller.
//! - It must not mutate inventory state.
//! - It emits **insights**, not inventory changes.

pub mod job;
pub mod low_stock;
pub mod result;

pub use job::AiJob;
pub use low_stock::{
    DEFAULT_LOW_STOCK_THRESHOLD, InventoryItemSnapshot, InventorySnapshot, LowStockItem, LowStockJob,
};
pub use result::{AiError, AiResult};
