//! Lab inventory domain module.
//!
//! This crate contains the business rules for catalog items and the usage
//! ledger, implemented purely as deterministic domain logic (no IO, no SQL).

pub mod documents;
pub mod item;
pub mod report;
pub mod search;
pub mod summary;
pub mod usage;

pub use documents::{CoverSheet, LabIdentity, qr_payload};
pub use item::{Item, ItemFields, parse_quantity};
pub use report::{InventoryReport, LISTING_HEADERS, ListingRow, TypeListing};
pub use search::{ItemQuery, sort_by_name};
pub use summary::{InventorySummary, TypeSummary};
pub use usage::{RecordUsage, UsageLogEntry, UsageOrder, UsageRecord, UsageStatus, plan_debit};
