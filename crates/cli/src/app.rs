//! Application state: the store plus everything that hangs off it.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{Local, Utc};
use tracing::{debug, info, instrument, warn};

use labinv_ai::{AiJob, AiResult, InventoryItemSnapshot, InventorySnapshot, LowStockJob};
use labinv_core::{ItemId, ItemType, UsageEntryId};
use labinv_events::{ChainLog, EventBus, InMemoryEventBus, Subscription, UsageRecorded};
use labinv_inventory::{
    CoverSheet, InventoryReport, Item, ItemFields, LabIdentity, RecordUsage, UsageOrder,
    UsageRecord, qr_payload,
};
use labinv_store::InventoryStore;

use crate::config::AppConfig;

/// Everything a command needs.
///
/// Usage notifications reach the chain log through the event bus after the
/// store has committed; the chain never feeds back into the store.
pub struct LabApp {
    config: AppConfig,
    store: InventoryStore,
    bus: Arc<InMemoryEventBus<UsageRecorded>>,
    chain: ChainLog,
    chain_feed: Subscription<UsageRecorded>,
}

impl LabApp {
    /// Open the database under the configured data dir.
    pub async fn open(config: AppConfig) -> anyhow::Result<Self> {
        let db_path = config.db_path();
        let store = InventoryStore::open(&db_path)
            .await
            .with_context(|| format!("failed to open inventory database at {}", db_path.display()))?;

        let bus: Arc<InMemoryEventBus<UsageRecorded>> = Arc::new(InMemoryEventBus::new());
        let chain_feed = bus.subscribe();

        Ok(Self {
            config,
            store,
            bus,
            chain: ChainLog::new(),
            chain_feed,
        })
    }

    pub fn store(&self) -> &InventoryStore {
        &self.store
    }

    pub fn lab(&self) -> LabIdentity {
        self.config.lab_identity()
    }

    pub async fn add_item(&self, item_type: ItemType, fields: ItemFields) -> anyhow::Result<ItemId> {
        Ok(self.store.add_item(item_type, fields).await?)
    }

    pub async fn edit_item(&self, id: &ItemId, fields: ItemFields) -> anyhow::Result<()> {
        Ok(self.store.edit_item(id, fields).await?)
    }

    pub async fn delete_item(&self, id: &ItemId) -> anyhow::Result<u64> {
        Ok(self.store.delete_item(id).await?)
    }

    pub async fn get_item(&self, id: &ItemId) -> anyhow::Result<Item> {
        Ok(self.store.get_item(id).await?)
    }

    pub async fn search(&self, item_type: ItemType, term: &str) -> anyhow::Result<Vec<Item>> {
        Ok(self.store.search(item_type, term).await?)
    }

    /// Record usage, then announce it. Announcement failures are logged only.
    #[instrument(skip(self, usage), fields(item_id = %usage.item_id))]
    pub async fn record_usage(&self, usage: RecordUsage) -> anyhow::Result<UsageEntryId> {
        let item_id = usage.item_id.clone();
        let user = usage.user.trim().to_string();
        let quantity_changed = usage.quantity_changed;

        let entry_id = self.store.record_usage(usage).await?;

        let event = UsageRecorded {
            entry_id,
            item_id,
            user,
            quantity_changed,
            occurred_at: Utc::now(),
        };
        match self.bus.publish(event) {
            Ok(delivered) => debug!(entry_id = %entry_id, delivered, "usage announced"),
            Err(err) => warn!(error = %err, "usage notification dropped"),
        }
        Ok(entry_id)
    }

    pub async fn list_usage(&self, order: UsageOrder) -> anyhow::Result<Vec<UsageRecord>> {
        Ok(self.store.list_usage(order).await?)
    }

    pub async fn usage_for_item(&self, id: &ItemId) -> anyhow::Result<Vec<UsageRecord>> {
        Ok(self.store.usage_for_item(id).await?)
    }

    /// Export the catalog; defaults to `exports/inventory_<timestamp>.csv`.
    pub async fn export_inventory(&self, out: Option<PathBuf>) -> anyhow::Result<(PathBuf, usize)> {
        let path = out.unwrap_or_else(|| self.default_export_path("inventory"));
        let rows = self
            .store
            .export_inventory_to(&path)
            .await
            .with_context(|| format!("failed to export inventory to {}", path.display()))?;
        Ok((path, rows))
    }

    /// Export the ledger; defaults to `exports/usage_log_<timestamp>.csv`.
    pub async fn export_usage(&self, out: Option<PathBuf>) -> anyhow::Result<(PathBuf, usize)> {
        let path = out.unwrap_or_else(|| self.default_export_path("usage_log"));
        let rows = self
            .store
            .export_usage_to(&path)
            .await
            .with_context(|| format!("failed to export usage log to {}", path.display()))?;
        Ok((path, rows))
    }

    fn default_export_path(&self, stem: &str) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        self.config.exports_dir().join(format!("{stem}_{stamp}.csv"))
    }

    pub async fn backup(&self, dir: Option<PathBuf>) -> anyhow::Result<PathBuf> {
        let dir = dir.unwrap_or_else(|| self.config.backups_dir());
        let path = self
            .store
            .backup_to(&dir)
            .await
            .with_context(|| format!("failed to back up database into {}", dir.display()))?;
        Ok(path)
    }

    /// Per-type summary followed by a listing of every type.
    pub async fn report(&self) -> anyhow::Result<InventoryReport> {
        let items = self.store.all_items().await?;
        Ok(InventoryReport::from_items(&items))
    }

    /// Run the low-stock predictor over the current catalog.
    #[instrument(skip(self))]
    pub async fn low_stock(&self, threshold: Option<i64>) -> anyhow::Result<AiResult> {
        let items = self.store.all_items().await?;
        let snapshot = InventorySnapshot {
            items: items
                .iter()
                .map(|item| InventoryItemSnapshot {
                    item_id: item.id_typed().to_string(),
                    name: item.name().to_string(),
                    quantity: item.quantity(),
                    item_type: item.item_type(),
                })
                .collect(),
        };

        let job = LowStockJob::new(snapshot)
            .with_threshold(threshold.unwrap_or(self.config.low_stock_threshold));
        let result = job.run()?;
        info!(flagged = result.score, "low stock check finished");
        Ok(result)
    }

    /// QR label text for an existing item.
    pub async fn qr_payload(&self, id: &ItemId) -> anyhow::Result<String> {
        let item = self.store.get_item(id).await?;
        Ok(qr_payload(item.id_typed(), &self.lab()))
    }

    pub async fn cover_sheet(&self, id: &ItemId) -> anyhow::Result<CoverSheet> {
        let item = self.store.get_item(id).await?;
        Ok(CoverSheet::for_item(&item, &self.lab(), Utc::now()))
    }

    /// The chain log, after taking in every pending notification.
    pub fn chain(&mut self) -> &ChainLog {
        let absorbed = self.chain.absorb(&self.chain_feed);
        if absorbed > 0 {
            info!(absorbed, "chain log updated");
        }
        &self.chain
    }
}
