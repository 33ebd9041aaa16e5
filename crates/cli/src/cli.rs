//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use labinv_core::{ItemId, ItemType};
use labinv_inventory::{ItemFields, parse_quantity};

#[derive(Debug, Parser)]
#[command(name = "labinv")]
#[command(about = "Laboratory inventory: catalog, usage ledger, exports and backups")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML). Defaults to ./labinv.toml when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding data/, data/backups/ and exports/.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage catalog items
    #[command(subcommand)]
    Item(ItemCommand),

    /// Record and review usage
    #[command(subcommand)]
    Usage(UsageCommand),

    /// Write CSV exports
    #[command(subcommand)]
    Export(ExportCommand),

    /// Copy the database file into the backups directory
    Backup {
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Per-type summary and item listings
    Report,

    /// Flag non-equipment items running low
    LowStock {
        #[arg(long)]
        threshold: Option<i64>,
    },

    /// Print the QR label text of an item
    Qr { id: ItemId },

    /// Print the cover sheet of an item
    Cover { id: ItemId },
}

#[derive(Debug, Subcommand)]
pub enum ItemCommand {
    /// Add an item; prints the new id
    Add {
        item_type: ItemType,
        #[command(flatten)]
        fields: ItemArgs,
    },

    /// Overwrite every field of an item
    Edit {
        id: ItemId,
        #[command(flatten)]
        fields: ItemArgs,
    },

    /// Delete an item and its usage history
    Delete { id: ItemId },

    /// Show one item with its usage history
    Show { id: ItemId },

    /// List all items of a type
    List { item_type: ItemType },

    /// Search items of a type by name, category, location or unit
    Search {
        item_type: ItemType,
        term: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum UsageCommand {
    /// Consume (positive) or return (negative) stock; prints the entry id
    Record {
        item_id: ItemId,
        #[arg(long)]
        user: String,
        #[arg(long, allow_negative_numbers = true)]
        quantity: i64,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        purpose: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        approval: Option<String>,
    },

    /// Show the usage ledger
    List {
        #[arg(long)]
        oldest_first: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ExportCommand {
    Inventory {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    Usage {
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Every editable item field.
#[derive(Debug, Args)]
pub struct ItemArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, value_parser = quantity_arg)]
    pub quantity: i64,
    #[arg(long)]
    pub name_local: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub unit: Option<String>,
    #[arg(long)]
    pub manufacturer: Option<String>,
    #[arg(long)]
    pub model_number: Option<String>,
    #[arg(long)]
    pub serial_number: Option<String>,
    #[arg(long)]
    pub purchase_date: Option<String>,
    #[arg(long)]
    pub warranty_until: Option<String>,
    #[arg(long)]
    pub maintenance_contact: Option<String>,
    #[arg(long)]
    pub last_calibration: Option<String>,
    #[arg(long)]
    pub next_calibration: Option<String>,
    #[arg(long)]
    pub safety_classification: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

fn quantity_arg(raw: &str) -> Result<i64, String> {
    parse_quantity(raw).map_err(|e| e.to_string())
}

impl From<ItemArgs> for ItemFields {
    fn from(a: ItemArgs) -> Self {
        ItemFields {
            name: a.name,
            name_localized: a.name_local,
            category: a.category,
            location: a.location,
            unit: a.unit,
            quantity: a.quantity,
            manufacturer: a.manufacturer,
            model_number: a.model_number,
            serial_number: a.serial_number,
            purchase_date: a.purchase_date,
            warranty_until: a.warranty_until,
            maintenance_contact: a.maintenance_contact,
            last_calibration: a.last_calibration,
            next_calibration: a.next_calibration,
            safety_classification: a.safety_classification,
            notes: a.notes,
        }
    }
}
