//! Flat CSV dumps of the catalog and the ledger.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{info, instrument};

use labinv_inventory::{Item, UsageOrder, UsageRecord};

use crate::error::{StoreError, StoreResult};
use crate::rows::encode_ts;
use crate::store::InventoryStore;

pub const INVENTORY_HEADERS: [&str; 18] = [
    "ID",
    "Name",
    "Chinese Name",
    "Category",
    "Location",
    "Quantity",
    "Unit",
    "Manufacturer",
    "Model Number",
    "Serial Number",
    "Purchase Date",
    "Warranty Until",
    "Maintenance Contact",
    "Last Calibration",
    "Next calibration",
    "Safety Classification",
    "Last Updated",
    "Notes",
];

pub const USAGE_HEADERS: [&str; 11] = [
    "ID",
    "Item Name",
    "Item Chinese Name",
    "User",
    "Department",
    "Quantity Changed",
    "Timestamp",
    "Purpose",
    "Supervisor Approval",
    "Return Time",
    "Notes",
];

fn cell(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

/// Write `items` as CSV to `out`. Returns the number of data rows.
pub fn write_inventory_csv<W: Write>(out: W, items: &[Item]) -> StoreResult<usize> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(INVENTORY_HEADERS)?;

    for item in items {
        let f = item.fields();
        let quantity = f.quantity.to_string();
        let last_updated = encode_ts(item.last_updated());
        writer.write_record([
            item.id_typed().as_str(),
            f.name.as_str(),
            cell(&f.name_localized),
            cell(&f.category),
            cell(&f.location),
            quantity.as_str(),
            cell(&f.unit),
            cell(&f.manufacturer),
            cell(&f.model_number),
            cell(&f.serial_number),
            cell(&f.purchase_date),
            cell(&f.warranty_until),
            cell(&f.maintenance_contact),
            cell(&f.last_calibration),
            cell(&f.next_calibration),
            cell(&f.safety_classification),
            last_updated.as_str(),
            cell(&f.notes),
        ])?;
    }

    writer
        .flush()
        .map_err(|e| StoreError::Export(e.to_string()))?;
    Ok(items.len())
}

/// Write `records` as CSV to `out`. Returns the number of data rows.
pub fn write_usage_csv<W: Write>(out: W, records: &[UsageRecord]) -> StoreResult<usize> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(USAGE_HEADERS)?;

    for record in records {
        let e = &record.entry;
        let id = e.id.to_string();
        let quantity = e.quantity_changed.to_string();
        let timestamp = encode_ts(e.timestamp);
        let return_time = e.return_time.map(encode_ts).unwrap_or_default();
        writer.write_record([
            id.as_str(),
            record.item_name.as_str(),
            cell(&record.item_name_localized),
            e.user.as_str(),
            cell(&e.user_department),
            quantity.as_str(),
            timestamp.as_str(),
            cell(&e.purpose),
            cell(&e.supervisor_approval),
            return_time.as_str(),
            cell(&e.notes),
        ])?;
    }

    writer
        .flush()
        .map_err(|e| StoreError::Export(e.to_string()))?;
    Ok(records.len())
}

impl InventoryStore {
    /// Dump the whole catalog (type, category, name order) to `path`.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()), err)]
    pub async fn export_inventory_to(&self, path: impl AsRef<Path>) -> StoreResult<usize> {
        let items = self.all_items().await?;
        let rows = write_file(path.as_ref(), |out| write_inventory_csv(out, &items))?;
        info!(rows, "inventory exported");
        Ok(rows)
    }

    /// Dump the whole ledger, newest first, to `path`.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()), err)]
    pub async fn export_usage_to(&self, path: impl AsRef<Path>) -> StoreResult<usize> {
        let records = self.list_usage(UsageOrder::NewestFirst).await?;
        let rows = write_file(path.as_ref(), |out| write_usage_csv(out, &records))?;
        info!(rows, "usage log exported");
        Ok(rows)
    }
}

/// Write through a sibling temp file so a failed export leaves nothing behind.
fn write_file(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> StoreResult<usize>,
) -> StoreResult<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(StoreError::io(parent))?;
    }
    let partial = path.with_extension("csv.partial");

    let result = File::create(&partial)
        .map_err(StoreError::io(&partial))
        .and_then(|file| {
            let mut out = BufWriter::new(file);
            let rows = write(&mut out)?;
            out.flush().map_err(StoreError::io(&partial))?;
            Ok(rows)
        })
        .and_then(|rows| {
            std::fs::rename(&partial, path).map_err(StoreError::io(path))?;
            Ok(rows)
        });

    if result.is_err() {
        let _ = std::fs::remove_file(&partial);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use labinv_core::{ItemId, ItemType, UsageEntryId};
    use labinv_inventory::{ItemFields, UsageLogEntry};

    #[test]
    fn inventory_csv_writes_header_and_blank_optionals() {
        let fields = ItemFields {
            name: "Ethanol".into(),
            name_localized: Some("乙醇".into()),
            unit: Some("mL".into()),
            quantity: 50,
            notes: Some("flammable, keep cool".into()),
            ..ItemFields::default()
        };
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let item = Item::create(
            ItemId::compose(ItemType::Chemical, 1),
            ItemType::Chemical,
            fields,
            at,
        )
        .unwrap();

        let mut buf = Vec::new();
        assert_eq!(write_inventory_csv(&mut buf, &[item]).unwrap(), 1);
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next().unwrap(), INVENTORY_HEADERS.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "CHE0001,Ethanol,乙醇,,,50,mL,,,,,,,,,,2024-05-01T09:30:00.000000Z,\"flammable, keep cool\""
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn usage_csv_joins_item_names() {
        let record = UsageRecord {
            entry: UsageLogEntry {
                id: UsageEntryId::new(7),
                item_id: ItemId::compose(ItemType::Chemical, 1),
                user: "alice".into(),
                user_department: Some("Virology".into()),
                quantity_changed: 20,
                timestamp: Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0).unwrap(),
                purpose: None,
                notes: None,
                supervisor_approval: None,
                return_time: None,
            },
            item_name: "Ethanol".into(),
            item_name_localized: None,
        };

        let mut buf = Vec::new();
        write_usage_csv(&mut buf, &[record]).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(
            text.lines().nth(1).unwrap(),
            "7,Ethanol,,alice,Virology,20,2024-05-02T08:00:00.000000Z,,,,"
        );
    }

    #[test]
    fn empty_inputs_still_write_headers() {
        let mut buf = Vec::new();
        assert_eq!(write_usage_csv(&mut buf, &[]).unwrap(), 0);
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 1);
    }
}
