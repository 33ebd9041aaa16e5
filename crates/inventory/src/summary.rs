//! Per-type inventory summary (the report's first table).

use serde::{Deserialize, Serialize};

use labinv_core::ItemType;

use crate::item::Item;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSummary {
    pub item_type: ItemType,
    pub total_items: u64,
    pub out_of_stock: u64,
    /// Wide enough that no catalog of `i64` quantities can overflow it.
    pub total_quantity: i128,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub rows: Vec<TypeSummary>,
}

impl InventorySummary {
    /// Summarize every type present in `items`, in `ItemType::ALL` order.
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a Item>) -> Self {
        let mut rows: Vec<TypeSummary> = ItemType::ALL
            .iter()
            .map(|t| TypeSummary {
                item_type: *t,
                total_items: 0,
                out_of_stock: 0,
                total_quantity: 0,
            })
            .collect();

        for item in items {
            let Some(row) = rows.iter_mut().find(|r| r.item_type == item.item_type()) else {
                continue;
            };
            row.total_items += 1;
            if item.quantity() <= 0 {
                row.out_of_stock += 1;
            }
            row.total_quantity += i128::from(item.quantity());
        }

        rows.retain(|r| r.total_items > 0);
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fixed-width text table.
    pub fn render_text(&self) -> String {
        let mut out = format!(
            "{:<12} {:>11} {:>12} {:>14}\n",
            "Type", "Total Items", "Out of Stock", "Total Quantity"
        );
        for r in &self.rows {
            out.push_str(&format!(
                "{:<12} {:>11} {:>12} {:>14}\n",
                r.item_type.as_str(),
                r.total_items,
                r.out_of_stock,
                r.total_quantity
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemFields;
    use chrono::Utc;
    use labinv_core::ItemId;

    fn item(item_type: ItemType, seq: u32, quantity: i64) -> Item {
        Item::create(
            ItemId::compose(item_type, seq),
            item_type,
            ItemFields::new(format!("item {seq}"), quantity),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn counts_items_stock_and_empties_per_type() {
        let items = vec![
            item(ItemType::Chemical, 1, 50),
            item(ItemType::Chemical, 2, 0),
            item(ItemType::Equipment, 1, 2),
        ];
        let summary = InventorySummary::from_items(&items);

        assert_eq!(
            summary.rows,
            vec![
                TypeSummary {
                    item_type: ItemType::Equipment,
                    total_items: 1,
                    out_of_stock: 0,
                    total_quantity: 2,
                },
                TypeSummary {
                    item_type: ItemType::Chemical,
                    total_items: 2,
                    out_of_stock: 1,
                    total_quantity: 50,
                },
            ]
        );
    }

    #[test]
    fn totals_past_i64_do_not_overflow() {
        let items = vec![
            item(ItemType::Chemical, 1, i64::MAX),
            item(ItemType::Chemical, 2, i64::MAX),
        ];
        let summary = InventorySummary::from_items(&items);

        assert_eq!(summary.rows[0].total_quantity, 2 * i128::from(i64::MAX));
        assert!(summary.render_text().contains("18446744073709551614"));
    }

    #[test]
    fn empty_catalog_renders_header_only() {
        let summary = InventorySummary::from_items(std::iter::empty::<&Item>());
        assert!(summary.is_empty());
        assert_eq!(summary.render_text().lines().count(), 1);
    }
}
