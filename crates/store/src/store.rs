//! Item store adapter: load-all and reconciliation save.

use std::path::{Path, PathBuf};

use sqlx::Row;
use sqlx::sqlite::{Sqlite, SqliteRow};

use restock_inventory::{EditedRow, InventoryItem, NormalizedRow, StoredRow, partition_edits};

use crate::error::StoreResult;
use crate::schema::{self, SchemaReport};

const SELECT_ALL: &str = "\
SELECT id, name, sku, category, quantity_on_hand, reorder_point, \
replenishment_status, available_in_market, supplier, last_purchase_date, \
expected_delivery_date FROM items";

const UPDATE_ROW: &str = "\
UPDATE items SET name = ?, sku = ?, category = ?, quantity_on_hand = ?, \
reorder_point = ?, replenishment_status = ?, available_in_market = ?, \
supplier = ?, last_purchase_date = ?, expected_delivery_date = ?, \
daily_consumption = ? WHERE id = ?";

const INSERT_ROW: &str = "\
INSERT INTO items (name, sku, category, quantity_on_hand, reorder_point, \
replenishment_status, available_in_market, supplier, last_purchase_date, \
expected_delivery_date, daily_consumption) \
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

/// Durable table of inventory items, keyed by a store-assigned integer
/// identity.
///
/// Holds only the database path: every operation opens a connection pool,
/// runs one batch of statements, and closes it. No transaction spans a user
/// interaction; overlapping saves from two sessions resolve as
/// last-writer-wins at row granularity.
#[derive(Debug, Clone)]
pub struct ItemStore {
    db_path: PathBuf,
}

impl ItemStore {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Run the schema guard once at startup.
    ///
    /// **Destructive** on schema drift: see [`schema::ensure_schema`].
    pub async fn ensure_schema(&self) -> StoreResult<SchemaReport> {
        schema::ensure_schema(&self.db_path).await
    }

    /// Load every persisted item, unfiltered and unsorted.
    ///
    /// Ordering is a presentation concern applied after derivation. Rows pass
    /// through the domain defaulting boundary, so quantities come back
    /// non-negative and unparseable stored dates come back as `None`.
    pub async fn load_all(&self) -> StoreResult<Vec<InventoryItem>> {
        let pool = schema::connect(&self.db_path).await?;
        let rows = sqlx::query(SELECT_ALL).fetch_all(&pool).await?;
        pool.close().await;

        let items = rows
            .into_iter()
            .map(|row| stored_row(&row).map(InventoryItem::from_stored))
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        tracing::debug!(count = items.len(), "loaded item snapshot");
        Ok(items)
    }

    /// Write an edited snapshot back to the store.
    ///
    /// Rows with an identity are overwritten in full; rows without one are
    /// inserted and assigned a fresh identity. Rows whose identity cell does
    /// not coerce are skipped silently, and rows missing from the snapshot
    /// are left untouched (deletions do not propagate). All rows are written
    /// before success is reported; a failed statement aborts the save with no
    /// per-row rollback and no partial-success detail.
    pub async fn save(&self, edited: Vec<EditedRow>) -> StoreResult<()> {
        let batch = partition_edits(edited);

        let pool = schema::connect(&self.db_path).await?;
        for (identity, row) in &batch.updates {
            bind_columns(sqlx::query(UPDATE_ROW), row)
                .bind(*identity)
                .execute(&pool)
                .await?;
        }
        for row in &batch.inserts {
            bind_columns(sqlx::query(INSERT_ROW), row)
                .execute(&pool)
                .await?;
        }
        pool.close().await;

        tracing::debug!(
            updates = batch.updates.len(),
            inserts = batch.inserts.len(),
            skipped = batch.skipped,
            "saved edited snapshot"
        );
        Ok(())
    }
}

type SqlQuery<'q> = sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>>;

/// Bind the eleven writable columns in table order. The legacy
/// `daily_consumption` column is always written as NULL.
fn bind_columns<'q>(query: SqlQuery<'q>, row: &'q NormalizedRow) -> SqlQuery<'q> {
    query
        .bind(row.name.as_deref())
        .bind(row.sku.as_deref())
        .bind(row.category.as_deref())
        .bind(row.quantity_on_hand)
        .bind(row.reorder_point)
        .bind(row.replenishment_status.as_str())
        .bind(if row.available_in_market { 1i64 } else { 0i64 })
        .bind(row.supplier.as_deref())
        .bind(row.last_purchase_date.as_deref())
        .bind(row.expected_delivery_date.as_deref())
        .bind(None::<f64>)
}

fn stored_row(row: &SqliteRow) -> Result<StoredRow, sqlx::Error> {
    Ok(StoredRow {
        identity: row.try_get("id")?,
        name: row.try_get("name")?,
        sku: row.try_get("sku")?,
        category: row.try_get("category")?,
        supplier: row.try_get("supplier")?,
        quantity_on_hand: row.try_get("quantity_on_hand")?,
        reorder_point: row.try_get("reorder_point")?,
        replenishment_status: row.try_get("replenishment_status")?,
        available_in_market: row.try_get("available_in_market")?,
        last_purchase_date: row.try_get("last_purchase_date")?,
        expected_delivery_date: row.try_get("expected_delivery_date")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use restock_inventory::ReplenishmentStatus;
    use serde_json::json;

    fn edited(value: serde_json::Value) -> EditedRow {
        serde_json::from_value(value).unwrap()
    }

    async fn fresh_store(dir: &tempfile::TempDir) -> ItemStore {
        restock_observability::init();
        let store = ItemStore::new(dir.path().join("stock.db"));
        store.ensure_schema().await.unwrap();
        store
    }

    #[tokio::test]
    async fn insert_then_reload_assigns_identity_and_keeps_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(&dir).await;

        store
            .save(vec![edited(json!({
                "name": "Saline",
                "sku": "SKU010",
                "category": "Supply",
                "supplier": "Supplier A",
                "quantity_on_hand": 40,
                "reorder_point": 70,
                "replenishment_status": "requested",
                "available_in_market": true,
                "last_purchase_date": "2024-02-01",
            }))])
            .await
            .unwrap();

        let items = store.load_all().await.unwrap();
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert!(item.identity.unwrap() > 0);
        assert_eq!(item.name.as_deref(), Some("Saline"));
        assert_eq!(item.sku.as_deref(), Some("SKU010"));
        assert_eq!(item.quantity_on_hand, 40);
        assert_eq!(item.reorder_point, 70);
        assert_eq!(item.replenishment_status, ReplenishmentStatus::Requested);
        assert!(item.available_in_market);
        assert_eq!(
            item.last_purchase_date,
            NaiveDate::from_ymd_opt(2024, 2, 1)
        );
    }

    #[tokio::test]
    async fn identities_are_fresh_and_increasing() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(&dir).await;

        store
            .save(vec![
                edited(json!({"name": "a"})),
                edited(json!({"name": "b"})),
            ])
            .await
            .unwrap();

        let mut ids: Vec<i64> = store
            .load_all()
            .await
            .unwrap()
            .iter()
            .map(|i| i.identity.unwrap())
            .collect();
        ids.sort();
        assert_eq!(ids.len(), 2);
        assert!(ids[0] > 0);
        assert!(ids[1] > ids[0]);
    }

    #[tokio::test]
    async fn unedited_round_trip_preserves_persisted_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(&dir).await;

        store
            .save(vec![edited(json!({
                "name": "Gauze",
                "sku": "SKU020",
                "quantity_on_hand": 12,
                "reorder_point": 35,
                "replenishment_status": "in_transit",
                "available_in_market": false,
                "expected_delivery_date": "2024-09-15",
            }))])
            .await
            .unwrap();

        let first = store.load_all().await.unwrap();
        let identity = first[0].identity.unwrap();

        // resubmit the row exactly as loaded, no edits
        store
            .save(vec![edited(json!({
                "id": identity,
                "name": "Gauze",
                "sku": "SKU020",
                "quantity_on_hand": 12,
                "reorder_point": 35,
                "replenishment_status": "in_transit",
                "available_in_market": false,
                "expected_delivery_date": "2024-09-15",
            }))])
            .await
            .unwrap();

        let second = store.load_all().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn update_overwrites_the_full_row() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(&dir).await;

        store
            .save(vec![edited(json!({
                "name": "Tape",
                "supplier": "Supplier B",
                "quantity_on_hand": 9,
            }))])
            .await
            .unwrap();
        let identity = store.load_all().await.unwrap()[0].identity.unwrap();

        // the update omits supplier, so the overwrite nulls it out
        store
            .save(vec![edited(json!({
                "id": identity,
                "name": "Tape (wide)",
                "quantity_on_hand": 4,
            }))])
            .await
            .unwrap();

        let items = store.load_all().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name.as_deref(), Some("Tape (wide)"));
        assert_eq!(items[0].quantity_on_hand, 4);
        assert_eq!(items[0].supplier, None);
    }

    #[tokio::test]
    async fn rows_missing_from_snapshot_are_not_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(&dir).await;

        store
            .save(vec![
                edited(json!({"name": "keep-me"})),
                edited(json!({"name": "edit-me"})),
            ])
            .await
            .unwrap();
        let items = store.load_all().await.unwrap();
        let edit_id = items
            .iter()
            .find(|i| i.name.as_deref() == Some("edit-me"))
            .and_then(|i| i.identity)
            .unwrap();

        // the edited snapshot only contains one of the two rows
        store
            .save(vec![edited(json!({"id": edit_id, "name": "edited"}))])
            .await
            .unwrap();

        let loaded = store.load_all().await.unwrap();
        let names: Vec<Option<&str>> = loaded
            .iter()
            .map(|i| i.name.as_deref())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&Some("keep-me")));
        assert!(names.contains(&Some("edited")));
    }

    #[tokio::test]
    async fn rows_with_garbage_identity_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(&dir).await;

        store
            .save(vec![edited(json!({"id": "oops", "name": "ghost"}))])
            .await
            .unwrap();

        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unparseable_date_text_survives_a_save_as_literal_text() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(&dir).await;

        store
            .save(vec![edited(json!({
                "name": "Masks",
                "last_purchase_date": "sometime in march",
            }))])
            .await
            .unwrap();

        // the literal text is persisted, but the date-typed load reads None
        let items = store.load_all().await.unwrap();
        assert_eq!(items[0].last_purchase_date, None);

        let pool = schema::connect(store.path()).await.unwrap();
        let row = sqlx::query("SELECT last_purchase_date FROM items")
            .fetch_one(&pool)
            .await
            .unwrap();
        pool.close().await;
        assert_eq!(
            row.try_get::<Option<String>, _>("last_purchase_date").unwrap(),
            Some("sometime in march".to_string())
        );
    }

    #[tokio::test]
    async fn null_quantities_load_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = fresh_store(&dir).await;

        store
            .save(vec![edited(json!({"name": "Swabs", "quantity_on_hand": "??"}))])
            .await
            .unwrap();

        let items = store.load_all().await.unwrap();
        assert_eq!(items[0].quantity_on_hand, 0);
        assert_eq!(items[0].reorder_point, 0);
    }
}
