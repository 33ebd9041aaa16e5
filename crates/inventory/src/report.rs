//! Full inventory report: the per-type summary followed by one listing per
//! item type.

use serde::{Deserialize, Serialize};

use labinv_core::ItemType;

use crate::item::Item;
use crate::summary::InventorySummary;

pub const LISTING_HEADERS: [&str; 7] = [
    "Name",
    "Chinese Name",
    "Category",
    "Location",
    "Quantity",
    "Unit",
    "Manufacturer",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRow {
    pub name: String,
    pub name_localized: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub quantity: i64,
    pub unit: Option<String>,
    pub manufacturer: Option<String>,
}

impl From<&Item> for ListingRow {
    fn from(item: &Item) -> Self {
        let f = item.fields();
        Self {
            name: f.name.clone(),
            name_localized: f.name_localized.clone(),
            category: f.category.clone(),
            location: f.location.clone(),
            quantity: f.quantity,
            unit: f.unit.clone(),
            manufacturer: f.manufacturer.clone(),
        }
    }
}

/// Every item of one type, ordered by category then name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeListing {
    pub item_type: ItemType,
    pub rows: Vec<ListingRow>,
}

impl TypeListing {
    pub fn title(&self) -> &'static str {
        match self.item_type {
            ItemType::Equipment => "Equipment Inventory",
            ItemType::Chemical => "Chemicals Inventory",
            ItemType::Consumable => "Consumables Inventory",
            ItemType::Other => "Other Inventory",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryReport {
    pub summary: InventorySummary,
    /// Always one listing per type, in `ItemType::ALL` order, even when empty.
    pub listings: Vec<TypeListing>,
}

impl InventoryReport {
    pub fn from_items(items: &[Item]) -> Self {
        let listings = ItemType::ALL
            .iter()
            .map(|&item_type| {
                let mut of_type: Vec<&Item> =
                    items.iter().filter(|i| i.item_type() == item_type).collect();
                // Missing categories sort first.
                of_type.sort_by(|a, b| {
                    a.fields()
                        .category
                        .as_deref()
                        .cmp(&b.fields().category.as_deref())
                        .then_with(|| a.name().cmp(b.name()))
                        .then_with(|| a.id_typed().cmp(b.id_typed()))
                });
                TypeListing {
                    item_type,
                    rows: of_type.into_iter().map(ListingRow::from).collect(),
                }
            })
            .collect();

        Self {
            summary: InventorySummary::from_items(items),
            listings,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
    }

    pub fn render_text(&self) -> String {
        let mut out = self.summary.render_text();
        for listing in &self.listings {
            out.push('\n');
            out.push_str(listing.title());
            out.push('\n');
            out.push_str(&listing_line(LISTING_HEADERS.map(String::from)));
            for r in &listing.rows {
                out.push_str(&listing_line([
                    r.name.clone(),
                    r.name_localized.clone().unwrap_or_default(),
                    r.category.clone().unwrap_or_default(),
                    r.location.clone().unwrap_or_default(),
                    r.quantity.to_string(),
                    r.unit.clone().unwrap_or_default(),
                    r.manufacturer.clone().unwrap_or_default(),
                ]));
            }
        }
        out
    }
}

fn listing_line(cells: [String; 7]) -> String {
    let [name, local, category, location, quantity, unit, manufacturer] = cells;
    let line = format!(
        "{name:<28} {local:<16} {category:<16} {location:<16} {quantity:>8} {unit:<6} {manufacturer}"
    );
    format!("{}\n", line.trim_end())
}
