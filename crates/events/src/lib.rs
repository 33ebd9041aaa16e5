//! Post-commit notifications.
//!
//! Observers here consume what the store already committed; nothing in this
//! crate can change inventory data.

pub mod bus;
pub mod chain;
pub mod in_memory_bus;
pub mod usage;

pub use bus::{EventBus, Subscription};
pub use chain::{Block, ChainLog, ChainTransaction};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use usage::UsageRecorded;
