//! Item catalog operations.

use chrono::Utc;
use sqlx::{Sqlite, SqliteConnection};
use tracing::{info, instrument};

use labinv_core::{DomainError, ItemId, ItemType};
use labinv_inventory::{Item, ItemFields, ItemQuery};

use crate::error::{StoreError, StoreResult, map_sqlx_error};
use crate::rows::{ITEM_COLUMNS, ItemRow, encode_ts};
use crate::store::InventoryStore;

impl InventoryStore {
    /// Insert a new item under a freshly allocated id.
    ///
    /// Allocation and insert share one transaction, so an id is never handed
    /// out twice, even after the item holding it has been deleted.
    #[instrument(skip(self, fields), fields(item_type = %item_type, name = %fields.name), err)]
    pub async fn add_item(&self, item_type: ItemType, fields: ItemFields) -> StoreResult<ItemId> {
        let fields = fields.validate()?;
        let pool = self.pool().await?;
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let id = allocate_item_id(&mut tx, item_type).await?;
        let item = Item::create(id.clone(), item_type, fields, Utc::now())?;
        insert_item(&mut tx, &item).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        info!(item_id = %id, "item added");
        Ok(id)
    }

    /// Overwrite every mutable field of an existing item and refresh `last_updated`.
    #[instrument(skip(self, fields), fields(item_id = %id), err)]
    pub async fn edit_item(&self, id: &ItemId, fields: ItemFields) -> StoreResult<()> {
        let fields = fields.validate()?;
        let pool = self.pool().await?;
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let Some(mut item) = fetch_item(&mut tx, id).await? else {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback_transaction", e))?;
            return Err(DomainError::not_found(format!("item {id}")).into());
        };
        item.edit(fields, Utc::now())?;

        let f = item.fields();
        sqlx::query(
            r#"
            UPDATE items SET
                name = ?1, name_cn = ?2, category = ?3, location = ?4, quantity = ?5,
                unit = ?6, manufacturer = ?7, model_number = ?8, serial_number = ?9,
                purchase_date = ?10, warranty_until = ?11, maintenance_contact = ?12,
                last_calibration = ?13, next_calibration = ?14,
                safety_classification = ?15, notes = ?16, last_updated = ?17
            WHERE id = ?18
            "#,
        )
        .bind(&f.name)
        .bind(&f.name_localized)
        .bind(&f.category)
        .bind(&f.location)
        .bind(f.quantity)
        .bind(&f.unit)
        .bind(&f.manufacturer)
        .bind(&f.model_number)
        .bind(&f.serial_number)
        .bind(&f.purchase_date)
        .bind(&f.warranty_until)
        .bind(&f.maintenance_contact)
        .bind(&f.last_calibration)
        .bind(&f.next_calibration)
        .bind(&f.safety_classification)
        .bind(&f.notes)
        .bind(encode_ts(item.last_updated()))
        .bind(id.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_item", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        info!(quantity = item.quantity(), "item edited");
        Ok(())
    }

    /// Delete an item together with its usage history.
    ///
    /// Returns how many usage entries went with it.
    #[instrument(skip(self), fields(item_id = %id), err)]
    pub async fn delete_item(&self, id: &ItemId) -> StoreResult<u64> {
        let pool = self.pool().await?;
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let history: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM usage_log WHERE item_id = ?1")
            .bind(id.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("count_usage", e))?;

        let result = sqlx::query("DELETE FROM items WHERE id = ?1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_item", e))?;

        if result.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback_transaction", e))?;
            return Err(DomainError::not_found(format!("item {id}")).into());
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        let removed = u64::try_from(history).unwrap_or(0);
        info!(usage_entries_removed = removed, "item deleted");
        Ok(removed)
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    pub async fn get_item(&self, id: &ItemId) -> StoreResult<Item> {
        let pool = self.pool().await?;
        let mut conn = pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("acquire_connection", e))?;
        fetch_item(&mut conn, id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("item {id}")).into())
    }

    /// All items of one type, ordered by name.
    #[instrument(skip(self), err)]
    pub async fn list(&self, item_type: ItemType) -> StoreResult<Vec<Item>> {
        self.search(item_type, "").await
    }

    /// Items of one type whose name, localized name, category, location or
    /// unit contains `term` (case-insensitive), ordered by name.
    #[instrument(skip(self), err)]
    pub async fn search(&self, item_type: ItemType, term: &str) -> StoreResult<Vec<Item>> {
        let pool = self.pool().await?;
        let rows: Vec<ItemRow> = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE item_type = ?1"
        ))
        .bind(item_type.as_str())
        .fetch_all(&pool)
        .await
        .map_err(|e| map_sqlx_error("list_items", e))?;

        let items = rows
            .into_iter()
            .map(Item::try_from)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(ItemQuery::new(item_type, term).apply(items))
    }

    /// Every item, ordered by type, category and name.
    #[instrument(skip(self), err)]
    pub async fn all_items(&self) -> StoreResult<Vec<Item>> {
        let pool = self.pool().await?;
        let rows: Vec<ItemRow> = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM items ORDER BY item_type, category, name"
        ))
        .fetch_all(&pool)
        .await
        .map_err(|e| map_sqlx_error("list_all_items", e))?;

        rows.into_iter().map(Item::try_from).collect()
    }
}

pub(crate) async fn fetch_item(
    conn: &mut SqliteConnection,
    id: &ItemId,
) -> StoreResult<Option<Item>> {
    let row: Option<ItemRow> =
        sqlx::query_as(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1"))
            .bind(id.as_str())
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("load_item", e))?;

    row.map(Item::try_from).transpose()
}

/// Next id for `item_type`: one past the larger of the persisted counter and
/// the highest sequence already present, skipping ids that are taken.
async fn allocate_item_id(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    item_type: ItemType,
) -> StoreResult<ItemId> {
    let counter: Option<i64> =
        sqlx::query_scalar("SELECT last_sequence FROM item_sequences WHERE item_type = ?1")
            .bind(item_type.as_str())
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("read_sequence", e))?;

    let existing: Vec<String> = sqlx::query_scalar("SELECT id FROM items WHERE item_type = ?1")
        .bind(item_type.as_str())
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("scan_item_ids", e))?;

    let highest_existing = existing
        .iter()
        .filter_map(|raw| raw.parse::<ItemId>().ok())
        .filter(|id| id.item_type() == item_type)
        .map(|id| i64::from(id.sequence()))
        .max()
        .unwrap_or(0);

    let mut next = counter.unwrap_or(0).max(highest_existing) + 1;
    let id = loop {
        let sequence = u32::try_from(next).map_err(|_| {
            StoreError::Domain(DomainError::validation(format!(
                "identifier space for {item_type} is exhausted"
            )))
        })?;
        let candidate = ItemId::compose(item_type, sequence);
        if !existing.iter().any(|raw| raw == candidate.as_str()) {
            break candidate;
        }
        next += 1;
    };

    sqlx::query(
        r#"
        INSERT INTO item_sequences (item_type, last_sequence) VALUES (?1, ?2)
        ON CONFLICT (item_type) DO UPDATE SET last_sequence = excluded.last_sequence
        "#,
    )
    .bind(item_type.as_str())
    .bind(next)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("write_sequence", e))?;

    Ok(id)
}

async fn insert_item(tx: &mut sqlx::Transaction<'_, Sqlite>, item: &Item) -> StoreResult<()> {
    let f = item.fields();
    sqlx::query(&format!(
        "INSERT INTO items ({ITEM_COLUMNS}) VALUES \
         (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)"
    ))
    .bind(item.id_typed().as_str())
    .bind(&f.name)
    .bind(&f.name_localized)
    .bind(item.item_type().as_str())
    .bind(&f.category)
    .bind(&f.location)
    .bind(f.quantity)
    .bind(&f.unit)
    .bind(&f.manufacturer)
    .bind(&f.model_number)
    .bind(&f.serial_number)
    .bind(&f.purchase_date)
    .bind(&f.warranty_until)
    .bind(&f.maintenance_contact)
    .bind(&f.last_calibration)
    .bind(&f.next_calibration)
    .bind(&f.safety_classification)
    .bind(encode_ts(item.last_updated()))
    .bind(&f.notes)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_item", e))?;
    Ok(())
}
