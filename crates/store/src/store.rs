//! SQLite-backed inventory store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::error::{StoreError, StoreResult, map_sqlx_error};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS items (
        id                    TEXT PRIMARY KEY,
        name                  TEXT NOT NULL,
        name_cn               TEXT,
        item_type             TEXT NOT NULL,
        category              TEXT,
        location              TEXT,
        quantity              INTEGER NOT NULL DEFAULT 0 CHECK (quantity >= 0),
        unit                  TEXT,
        manufacturer          TEXT,
        model_number          TEXT,
        serial_number         TEXT,
        purchase_date         TEXT,
        warranty_until        TEXT,
        maintenance_contact   TEXT,
        last_calibration      TEXT,
        next_calibration      TEXT,
        safety_classification TEXT,
        last_updated          TEXT,
        notes                 TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS usage_log (
        id                  INTEGER PRIMARY KEY AUTOINCREMENT,
        item_id             TEXT NOT NULL,
        user                TEXT NOT NULL,
        user_department     TEXT,
        quantity_changed    INTEGER NOT NULL,
        timestamp           TEXT NOT NULL,
        purpose             TEXT,
        notes               TEXT,
        supervisor_approval TEXT,
        return_time         TEXT,
        FOREIGN KEY (item_id) REFERENCES items (id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_usage_log_item ON usage_log (item_id)",
    "CREATE INDEX IF NOT EXISTS idx_items_type ON items (item_type)",
    r#"
    CREATE TABLE IF NOT EXISTS item_sequences (
        item_type     TEXT PRIMARY KEY,
        last_sequence INTEGER NOT NULL
    )
    "#,
];

/// Durable catalog and usage ledger in a single SQLite file.
///
/// The pool sits behind `Arc<Mutex<Option<_>>>` so that it can be opened
/// lazily, shared across clones, and closed for a consistent file backup.
#[derive(Debug, Clone)]
pub struct InventoryStore {
    db_path: PathBuf,
    pool: Arc<Mutex<Option<SqlitePool>>>,
}

impl InventoryStore {
    /// Open (creating if needed) the database at `db_path` and apply the schema.
    #[instrument(skip(db_path), fields(db = %db_path.as_ref().display()), err)]
    pub async fn open(db_path: impl AsRef<Path>) -> StoreResult<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(StoreError::io(parent))?;
        }

        let store = Self {
            db_path,
            pool: Arc::new(Mutex::new(None)),
        };
        store.pool().await?;
        Ok(store)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// The live pool, reconnecting if it was closed.
    pub(crate) async fn pool(&self) -> StoreResult<SqlitePool> {
        let mut guard = self.pool.lock().await;
        if let Some(pool) = guard.as_ref() {
            return Ok(pool.clone());
        }
        let pool = connect(&self.db_path).await?;
        *guard = Some(pool.clone());
        Ok(pool)
    }

    pub(crate) fn pool_slot(&self) -> &Mutex<Option<SqlitePool>> {
        &self.pool
    }

    /// Whether a pool is currently held.
    pub async fn is_open(&self) -> bool {
        self.pool.lock().await.is_some()
    }

    /// Close the pool. The next operation reopens it.
    pub async fn close(&self) {
        if let Some(pool) = self.pool.lock().await.take() {
            pool.close().await;
        }
    }
}

pub(crate) async fn connect(db_path: &Path) -> StoreResult<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Delete);

    // One connection: writes are serialized and the file can be closed cleanly.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| map_sqlx_error("connect", e))?;

    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .map_err(|e| map_sqlx_error("apply_schema", e))?;
    }

    debug!(db = %db_path.display(), "sqlite pool ready");
    Ok(pool)
}
