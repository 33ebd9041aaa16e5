use serde::{Deserialize, Serialize};
use serde_json::json;

use labinv_core::ItemType;

use crate::job::AiJob;
use crate::result::{AiError, AiResult};

/// Default threshold: anything with fewer than 10 units left is flagged.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// One item as seen by the predictor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItemSnapshot {
    pub item_id: String,
    pub name: String,
    pub quantity: i64,
    pub item_type: ItemType,
}

/// Read-only catalog snapshot handed to the job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub items: Vec<InventoryItemSnapshot>,
}

/// A consumable/chemical/other item running low.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockItem {
    pub item_id: String,
    pub name: String,
    pub quantity: i64,
}

/// Stock-threshold filter. Equipment is never flagged.
#[derive(Debug, Clone)]
pub struct LowStockJob {
    input: InventorySnapshot,
    threshold: i64,
}

impl LowStockJob {
    pub fn new(input: InventorySnapshot) -> Self {
        Self {
            input,
            threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: i64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Flagged items in snapshot order.
    pub fn low_stock_items(&self) -> Vec<LowStockItem> {
        self.input
            .items
            .iter()
            .filter(|i| i.quantity < self.threshold && i.item_type != ItemType::Equipment)
            .map(|i| LowStockItem {
                item_id: i.item_id.clone(),
                name: i.name.clone(),
                quantity: i.quantity,
            })
            .collect()
    }
}

impl AiJob for LowStockJob {
    type Input = InventorySnapshot;

    fn kind(&self) -> &'static str {
        "inventory.low_stock"
    }

    fn input(&self) -> &Self::Input {
        &self.input
    }

    fn run(&self) -> Result<AiResult, AiError> {
        if self.threshold <= 0 {
            return Err(AiError::InvalidInput(
                "threshold must be a positive number of units".to_string(),
            ));
        }

        let flagged = self.low_stock_items();
        let explanation = if flagged.is_empty() {
            "No low stock items detected.".to_string()
        } else {
            let mut msg = String::from("Low stock items:\n");
            for item in &flagged {
                msg.push_str(&format!("{} - {} left\n", item.name, item.quantity));
            }
            msg
        };

        Ok(AiResult::scored(flagged.len() as f64)
            .with_explanation(explanation)
            .with_metadata(json!({
                "kind": self.kind(),
                "threshold": self.threshold,
                "items": flagged,
            })))
    }
}
