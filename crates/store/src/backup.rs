use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{info, instrument, warn};

use crate::error::{StoreError, StoreResult};
use crate::store::{InventoryStore, connect};

impl InventoryStore {
    /// Copy the database file into `dir` as `lab_inventory_backup_<timestamp>.db`.
    ///
    /// The pool is closed for the copy and reopened afterwards, whether or not
    /// the copy succeeded. Holding the pool lock keeps other operations out
    /// until the store is usable again.
    #[instrument(skip(self, dir), fields(dir = %dir.as_ref().display()), err)]
    pub async fn backup_to(&self, dir: impl AsRef<Path>) -> StoreResult<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(StoreError::io(dir))?;
        let target = unused_backup_path(dir);

        let mut slot = self.pool_slot().lock().await;
        if let Some(pool) = slot.take() {
            pool.close().await;
        }

        let copied = std::fs::copy(self.db_path(), &target).map_err(StoreError::io(&target));

        match connect(self.db_path()).await {
            Ok(pool) => *slot = Some(pool),
            // Left empty; the next operation retries the connection.
            Err(err) => warn!(error = %err, "reopening database after backup failed"),
        }
        drop(slot);

        let bytes = copied?;
        info!(target = %target.display(), bytes, "database backed up");
        Ok(target)
    }
}

fn unused_backup_path(dir: &Path) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let mut candidate = dir.join(format!("lab_inventory_backup_{stamp}.db"));
    let mut n = 1;
    while candidate.exists() {
        candidate = dir.join(format!("lab_inventory_backup_{stamp}_{n}.db"));
        n += 1;
    }
    candidate
}
