use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use labinv_core::{ItemId, UsageEntryId};

/// Event: a usage entry was committed and stock was debited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecorded {
    pub entry_id: UsageEntryId,
    pub item_id: ItemId,
    pub user: String,
    pub quantity_changed: i64,
    pub occurred_at: DateTime<Utc>,
}
