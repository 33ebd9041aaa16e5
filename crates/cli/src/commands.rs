//! Command handlers. Results go to `out`; diagnostics go through tracing.

use std::io::Write;

use tracing::debug;

use labinv_inventory::{Item, RecordUsage, UsageOrder, UsageRecord};

use crate::app::LabApp;
use crate::cli::{Command, ExportCommand, ItemCommand, UsageCommand};

pub async fn execute<W: Write>(app: &mut LabApp, command: Command, out: &mut W) -> anyhow::Result<()> {
    match command {
        Command::Item(cmd) => item(app, cmd, out).await,
        Command::Usage(cmd) => usage(app, cmd, out).await,
        Command::Export(ExportCommand::Inventory { out: path }) => {
            let (path, rows) = app.export_inventory(path).await?;
            writeln!(out, "Exported {rows} items to {}", path.display())?;
            Ok(())
        }
        Command::Export(ExportCommand::Usage { out: path }) => {
            let (path, rows) = app.export_usage(path).await?;
            writeln!(out, "Exported {rows} usage entries to {}", path.display())?;
            Ok(())
        }
        Command::Backup { dir } => {
            let path = app.backup(dir).await?;
            writeln!(out, "Backup written to {}", path.display())?;
            Ok(())
        }
        Command::Report => {
            let report = app.report().await?;
            if report.is_empty() {
                writeln!(out, "No items in the inventory.")?;
            } else {
                write!(out, "{}", report.render_text())?;
            }
            Ok(())
        }
        Command::LowStock { threshold } => {
            let result = app.low_stock(threshold).await?;
            writeln!(out, "{}", result.explanation.unwrap_or_default().trim_end())?;
            Ok(())
        }
        Command::Qr { id } => {
            writeln!(out, "{}", app.qr_payload(&id).await?)?;
            Ok(())
        }
        Command::Cover { id } => {
            write!(out, "{}", app.cover_sheet(&id).await?.render_text())?;
            Ok(())
        }
    }
}

/// Run `command`, then release the database whether or not it succeeded.
pub async fn execute_and_close<W: Write>(
    app: &mut LabApp,
    command: Command,
    out: &mut W,
) -> anyhow::Result<()> {
    let result = execute(app, command, out).await;
    app.store().close().await;
    result
}

async fn item<W: Write>(app: &mut LabApp, cmd: ItemCommand, out: &mut W) -> anyhow::Result<()> {
    match cmd {
        ItemCommand::Add { item_type, fields } => {
            let id = app.add_item(item_type, fields.into()).await?;
            writeln!(out, "{id}")?;
        }
        ItemCommand::Edit { id, fields } => {
            app.edit_item(&id, fields.into()).await?;
            writeln!(out, "Updated {id}")?;
        }
        ItemCommand::Delete { id } => {
            let removed = app.delete_item(&id).await?;
            writeln!(out, "Deleted {id} ({removed} usage entries removed)")?;
        }
        ItemCommand::Show { id } => {
            let item = app.get_item(&id).await?;
            let history = app.usage_for_item(&id).await?;
            write_item_details(out, &item)?;
            if !history.is_empty() {
                writeln!(out, "\nUsage history")?;
                write_usage_table(out, &history)?;
            }
        }
        ItemCommand::List { item_type } => {
            let items = app.search(item_type, "").await?;
            write_item_table(out, &items)?;
        }
        ItemCommand::Search { item_type, term } => {
            let items = app.search(item_type, term.as_deref().unwrap_or("")).await?;
            write_item_table(out, &items)?;
        }
    }
    Ok(())
}

async fn usage<W: Write>(app: &mut LabApp, cmd: UsageCommand, out: &mut W) -> anyhow::Result<()> {
    match cmd {
        UsageCommand::Record {
            item_id,
            user,
            quantity,
            department,
            purpose,
            notes,
            approval,
        } => {
            let request = RecordUsage {
                department,
                purpose,
                notes,
                supervisor_approval: approval,
                ..RecordUsage::new(item_id, user, quantity)
            };
            let entry = app.record_usage(request).await?;
            let chained = app.chain().transaction_count();
            debug!(entry_id = %entry, chained, "usage notification delivered");
            writeln!(out, "{entry}")?;
        }
        UsageCommand::List { oldest_first } => {
            let order = if oldest_first {
                UsageOrder::OldestFirst
            } else {
                UsageOrder::NewestFirst
            };
            let records = app.list_usage(order).await?;
            write_usage_table(out, &records)?;
        }
    }
    Ok(())
}

fn write_item_table<W: Write>(out: &mut W, items: &[Item]) -> std::io::Result<()> {
    writeln!(
        out,
        "{:<8} {:<28} {:<16} {:<16} {:<16} {:>8} {:<6}",
        "ID", "Name", "Chinese Name", "Category", "Location", "Quantity", "Unit"
    )?;
    for item in items {
        let f = item.fields();
        writeln!(
            out,
            "{:<8} {:<28} {:<16} {:<16} {:<16} {:>8} {:<6}",
            item.id_typed().as_str(),
            f.name,
            f.name_localized.as_deref().unwrap_or(""),
            f.category.as_deref().unwrap_or(""),
            f.location.as_deref().unwrap_or(""),
            f.quantity,
            f.unit.as_deref().unwrap_or("")
        )?;
    }
    Ok(())
}

fn write_item_details<W: Write>(out: &mut W, item: &Item) -> std::io::Result<()> {
    let f = item.fields();
    let rows: [(&str, Option<&str>); 15] = [
        ("Name", Some(f.name.as_str())),
        ("Chinese Name", f.name_localized.as_deref()),
        ("Category", f.category.as_deref()),
        ("Location", f.location.as_deref()),
        ("Unit", f.unit.as_deref()),
        ("Manufacturer", f.manufacturer.as_deref()),
        ("Model Number", f.model_number.as_deref()),
        ("Serial Number", f.serial_number.as_deref()),
        ("Purchase Date", f.purchase_date.as_deref()),
        ("Warranty Until", f.warranty_until.as_deref()),
        ("Maintenance Contact", f.maintenance_contact.as_deref()),
        ("Last Calibration", f.last_calibration.as_deref()),
        ("Next Calibration", f.next_calibration.as_deref()),
        ("Safety Classification", f.safety_classification.as_deref()),
        ("Notes", f.notes.as_deref()),
    ];

    writeln!(out, "{:<22} {}", "ID", item.id_typed())?;
    writeln!(out, "{:<22} {}", "Type", item.item_type().as_str())?;
    writeln!(out, "{:<22} {}", "Quantity", f.quantity)?;
    for (label, value) in rows {
        writeln!(out, "{label:<22} {}", value.unwrap_or(""))?;
    }
    writeln!(
        out,
        "{:<22} {}",
        "Last Updated",
        item.last_updated().format("%Y-%m-%d %H:%M:%S")
    )
}

fn write_usage_table<W: Write>(out: &mut W, records: &[UsageRecord]) -> std::io::Result<()> {
    writeln!(
        out,
        "{:>5} {:<19} {:<8} {:<24} {:<16} {:>8} {:<8}",
        "ID", "Timestamp", "Item", "Item Name", "User", "Quantity", "Status"
    )?;
    for r in records {
        let e = &r.entry;
        writeln!(
            out,
            "{:>5} {:<19} {:<8} {:<24} {:<16} {:>8} {:<8}",
            e.id.get(),
            e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            e.item_id.as_str(),
            r.item_name,
            e.user,
            e.quantity_changed,
            r.status().as_str()
        )?;
    }
    Ok(())
}
