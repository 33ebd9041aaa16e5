//! Usage ledger and the atomic stock debit.

use chrono::Utc;
use tracing::{info, instrument, warn};

use labinv_core::{DomainError, ItemId, UsageEntryId};
use labinv_inventory::{RecordUsage, UsageOrder, UsageRecord};

use crate::catalog::fetch_item;
use crate::error::{StoreResult, map_sqlx_error};
use crate::rows::{USAGE_COLUMNS, UsageRow, encode_ts};
use crate::store::InventoryStore;

impl InventoryStore {
    /// Append a usage entry and adjust the item's stock in one transaction.
    ///
    /// A positive `quantity_changed` consumes stock, a negative one restores it.
    /// Either both writes land or neither does.
    #[instrument(
        skip(self, usage),
        fields(
            item_id = %usage.item_id,
            user = %usage.user,
            quantity_changed = usage.quantity_changed
        ),
        err
    )]
    pub async fn record_usage(&self, usage: RecordUsage) -> StoreResult<UsageEntryId> {
        let usage = usage.validate()?;
        let pool = self.pool().await?;
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let Some(mut item) = fetch_item(&mut tx, &usage.item_id).await? else {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback_transaction", e))?;
            return Err(DomainError::not_found(format!("item {}", usage.item_id)).into());
        };

        let remaining = match item.apply_usage(usage.quantity_changed) {
            Ok(remaining) => remaining,
            Err(err) => {
                tx.rollback()
                    .await
                    .map_err(|e| map_sqlx_error("rollback_transaction", e))?;
                warn!(available = item.quantity(), error = %err, "usage rejected");
                return Err(err.into());
            }
        };

        sqlx::query("UPDATE items SET quantity = ?1 WHERE id = ?2")
            .bind(remaining)
            .bind(usage.item_id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_quantity", e))?;

        // Dropping `tx` on any error below rolls the quantity update back.
        let entry_id = sqlx::query(
            r#"
            INSERT INTO usage_log
                (item_id, user, user_department, quantity_changed, timestamp,
                 purpose, notes, supervisor_approval)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(usage.item_id.as_str())
        .bind(&usage.user)
        .bind(&usage.department)
        .bind(usage.quantity_changed)
        .bind(encode_ts(Utc::now()))
        .bind(&usage.purpose)
        .bind(&usage.notes)
        .bind(&usage.supervisor_approval)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_usage", e))?
        .last_insert_rowid();

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        info!(entry_id, remaining, "usage recorded");
        Ok(UsageEntryId::new(entry_id))
    }

    /// Every usage entry joined with its item's names.
    ///
    /// Entries sharing a timestamp fall back to insertion order.
    #[instrument(skip(self), err)]
    pub async fn list_usage(&self, order: UsageOrder) -> StoreResult<Vec<UsageRecord>> {
        let direction = match order {
            UsageOrder::NewestFirst => "DESC",
            UsageOrder::OldestFirst => "ASC",
        };
        let pool = self.pool().await?;
        let rows: Vec<UsageRow> = sqlx::query_as(&format!(
            "SELECT {USAGE_COLUMNS} FROM usage_log u JOIN items i ON u.item_id = i.id \
             ORDER BY julianday(u.timestamp) {direction}, u.id {direction}"
        ))
        .fetch_all(&pool)
        .await
        .map_err(|e| map_sqlx_error("list_usage", e))?;

        rows.into_iter().map(UsageRecord::try_from).collect()
    }

    #[instrument(skip(self), fields(entry_id = %id), err)]
    pub async fn get_usage(&self, id: UsageEntryId) -> StoreResult<UsageRecord> {
        let pool = self.pool().await?;
        let row: Option<UsageRow> = sqlx::query_as(&format!(
            "SELECT {USAGE_COLUMNS} FROM usage_log u JOIN items i ON u.item_id = i.id \
             WHERE u.id = ?1"
        ))
        .bind(id.get())
        .fetch_optional(&pool)
        .await
        .map_err(|e| map_sqlx_error("load_usage", e))?;

        match row {
            Some(row) => UsageRecord::try_from(row),
            None => Err(DomainError::not_found(format!("usage entry {id}")).into()),
        }
    }

    /// Usage history of one item, newest first.
    #[instrument(skip(self), fields(item_id = %item_id), err)]
    pub async fn usage_for_item(&self, item_id: &ItemId) -> StoreResult<Vec<UsageRecord>> {
        let pool = self.pool().await?;
        let rows: Vec<UsageRow> = sqlx::query_as(&format!(
            "SELECT {USAGE_COLUMNS} FROM usage_log u JOIN items i ON u.item_id = i.id \
             WHERE u.item_id = ?1 ORDER BY julianday(u.timestamp) DESC, u.id DESC"
        ))
        .bind(item_id.as_str())
        .fetch_all(&pool)
        .await
        .map_err(|e| map_sqlx_error("list_item_usage", e))?;

        rows.into_iter().map(UsageRecord::try_from).collect()
    }
}
