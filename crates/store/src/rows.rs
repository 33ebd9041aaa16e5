//! Row types and their conversion into domain records.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use labinv_core::{ItemId, ItemType, UsageEntryId};
use labinv_inventory::{Item, ItemFields, UsageLogEntry, UsageRecord};

use crate::error::StoreError;

/// Column list matching [`ItemRow`].
pub(crate) const ITEM_COLUMNS: &str = "id, name, name_cn, item_type, category, location, \
     quantity, unit, manufacturer, model_number, serial_number, purchase_date, \
     warranty_until, maintenance_contact, last_calibration, next_calibration, \
     safety_classification, last_updated, notes";

/// Column list matching [`UsageRow`] (usage_log aliased `u`, items aliased `i`).
pub(crate) const USAGE_COLUMNS: &str = "u.id, u.item_id, u.user, u.user_department, \
     u.quantity_changed, u.timestamp, u.purpose, u.notes, u.supervisor_approval, \
     u.return_time, i.name AS item_name, i.name_cn AS item_name_cn";

/// Timestamps are written as RFC 3339 text with microseconds. Queries order on
/// `julianday(timestamp)` so that legacy `CURRENT_TIMESTAMP` rows interleave.
pub(crate) fn encode_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Accepts RFC 3339 plus the naive `YYYY-MM-DD HH:MM:SS[.f]` forms SQLite's
/// `CURRENT_TIMESTAMP` and older databases produce (read as UTC).
pub(crate) fn decode_ts(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(naive.and_utc());
        }
    }
    Err(StoreError::Corrupt(format!("unreadable timestamp '{raw}'")))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug)]
pub(crate) struct ItemRow {
    id: String,
    name: String,
    name_cn: Option<String>,
    item_type: String,
    category: Option<String>,
    location: Option<String>,
    quantity: Option<i64>,
    unit: Option<String>,
    manufacturer: Option<String>,
    model_number: Option<String>,
    serial_number: Option<String>,
    purchase_date: Option<String>,
    warranty_until: Option<String>,
    maintenance_contact: Option<String>,
    last_calibration: Option<String>,
    next_calibration: Option<String>,
    safety_classification: Option<String>,
    last_updated: Option<String>,
    notes: Option<String>,
}

impl<'r> sqlx::FromRow<'r, SqliteRow> for ItemRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(ItemRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            name_cn: row.try_get("name_cn")?,
            item_type: row.try_get("item_type")?,
            category: row.try_get("category")?,
            location: row.try_get("location")?,
            quantity: row.try_get("quantity")?,
            unit: row.try_get("unit")?,
            manufacturer: row.try_get("manufacturer")?,
            model_number: row.try_get("model_number")?,
            serial_number: row.try_get("serial_number")?,
            purchase_date: row.try_get("purchase_date")?,
            warranty_until: row.try_get("warranty_until")?,
            maintenance_contact: row.try_get("maintenance_contact")?,
            last_calibration: row.try_get("last_calibration")?,
            next_calibration: row.try_get("next_calibration")?,
            safety_classification: row.try_get("safety_classification")?,
            last_updated: row.try_get("last_updated")?,
            notes: row.try_get("notes")?,
        })
    }
}

impl TryFrom<ItemRow> for Item {
    type Error = StoreError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let id: ItemId = row
            .id
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("items.id: {e}")))?;
        let item_type: ItemType = row
            .item_type
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("items.item_type for {id}: {e}")))?;
        let last_updated = match row.last_updated.as_deref() {
            Some(raw) if !raw.is_empty() => decode_ts(raw)?,
            _ => DateTime::<Utc>::UNIX_EPOCH,
        };

        let fields = ItemFields {
            name: row.name,
            name_localized: non_blank(row.name_cn),
            category: non_blank(row.category),
            location: non_blank(row.location),
            unit: non_blank(row.unit),
            quantity: row.quantity.unwrap_or(0),
            manufacturer: non_blank(row.manufacturer),
            model_number: non_blank(row.model_number),
            serial_number: non_blank(row.serial_number),
            purchase_date: non_blank(row.purchase_date),
            warranty_until: non_blank(row.warranty_until),
            maintenance_contact: non_blank(row.maintenance_contact),
            last_calibration: non_blank(row.last_calibration),
            next_calibration: non_blank(row.next_calibration),
            safety_classification: non_blank(row.safety_classification),
            notes: non_blank(row.notes),
        };

        Ok(Item::restore(id, item_type, fields, last_updated))
    }
}

#[derive(Debug)]
pub(crate) struct UsageRow {
    id: i64,
    item_id: String,
    user: String,
    user_department: Option<String>,
    quantity_changed: i64,
    timestamp: Option<String>,
    purpose: Option<String>,
    notes: Option<String>,
    supervisor_approval: Option<String>,
    return_time: Option<String>,
    item_name: String,
    item_name_cn: Option<String>,
}

impl<'r> sqlx::FromRow<'r, SqliteRow> for UsageRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(UsageRow {
            id: row.try_get("id")?,
            item_id: row.try_get("item_id")?,
            user: row.try_get("user")?,
            user_department: row.try_get("user_department")?,
            quantity_changed: row.try_get("quantity_changed")?,
            timestamp: row.try_get("timestamp")?,
            purpose: row.try_get("purpose")?,
            notes: row.try_get("notes")?,
            supervisor_approval: row.try_get("supervisor_approval")?,
            return_time: row.try_get("return_time")?,
            item_name: row.try_get("item_name")?,
            item_name_cn: row.try_get("item_name_cn")?,
        })
    }
}

impl TryFrom<UsageRow> for UsageRecord {
    type Error = StoreError;

    fn try_from(row: UsageRow) -> Result<Self, Self::Error> {
        let item_id: ItemId = row
            .item_id
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("usage_log.item_id of #{}: {e}", row.id)))?;
        let timestamp = match row.timestamp.as_deref() {
            Some(raw) => decode_ts(raw)?,
            None => DateTime::<Utc>::UNIX_EPOCH,
        };
        let return_time = match non_blank(row.return_time) {
            Some(raw) => Some(decode_ts(&raw)?),
            None => None,
        };

        Ok(UsageRecord {
            entry: UsageLogEntry {
                id: UsageEntryId::new(row.id),
                item_id,
                user: row.user,
                user_department: non_blank(row.user_department),
                quantity_changed: row.quantity_changed,
                timestamp,
                purpose: non_blank(row.purpose),
                notes: non_blank(row.notes),
                supervisor_approval: non_blank(row.supervisor_approval),
                return_time,
            },
            item_name: row.item_name,
            item_name_localized: non_blank(row.item_name_cn),
        })
    }
}
