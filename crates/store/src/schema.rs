//! Schema-drift guard.
//!
//! Compares the persisted `items` table against the required column set and,
//! on any mismatch or inspection failure, deletes the database file so a
//! fresh, fully-columned table can be created. There is no in-place column
//! addition and no data preservation across schema versions.

use std::path::Path;

use sqlx::{Row, SqlitePool};
use sqlx::sqlite::SqliteConnectOptions;

use crate::error::StoreResult;

/// Columns the application requires on the `items` table.
///
/// `daily_consumption` is a legacy column: still part of the schema (and so
/// still guarded), always written as NULL, never read. The consumption shown
/// to users is derived from the reorder point at load time.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "id",
    "name",
    "sku",
    "category",
    "quantity_on_hand",
    "reorder_point",
    "replenishment_status",
    "available_in_market",
    "supplier",
    "last_purchase_date",
    "expected_delivery_date",
    "daily_consumption",
];

const CREATE_ITEMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT,
    sku TEXT,
    category TEXT,
    quantity_on_hand INTEGER,
    reorder_point INTEGER,
    replenishment_status TEXT,
    available_in_market INTEGER,
    supplier TEXT,
    last_purchase_date TEXT,
    expected_delivery_date TEXT,
    daily_consumption REAL
)
"#;

/// Outcome of a guard pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaReport {
    /// True when drift (or an uninspectable file) forced a destructive
    /// rebuild. All previously persisted rows are gone.
    pub rebuilt: bool,
}

/// Ensure the store file carries the full required schema.
///
/// **Destructive**: if the file exists and the `items` table is missing any
/// required column, or the schema cannot be inspected at all (corrupt file,
/// lock error), the database file is deleted and every row is lost. Callers
/// can only surface this as "data reset" via [`SchemaReport::rebuilt`].
pub async fn ensure_schema(db_path: &Path) -> StoreResult<SchemaReport> {
    let mut rebuilt = false;

    if db_path.exists() {
        match existing_columns(db_path).await {
            // an empty column list means the table was never created; the
            // CREATE below handles that without dropping anything
            Ok(existing) if !existing.is_empty() && missing_any(&existing) => {
                tracing::warn!(path = %db_path.display(), "schema drift detected; rebuilding store (all rows lost)");
                remove_store_files(db_path)?;
                rebuilt = true;
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(path = %db_path.display(), %err, "schema inspection failed; rebuilding store (all rows lost)");
                remove_store_files(db_path)?;
                rebuilt = true;
            }
        }
    }

    let pool = connect(db_path).await?;
    sqlx::query(CREATE_ITEMS_TABLE).execute(&pool).await?;
    pool.close().await;

    Ok(SchemaReport { rebuilt })
}

/// Open a short-lived pool for one batch of statements, creating the file if
/// it does not exist yet.
pub(crate) async fn connect(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true);
    SqlitePool::connect_with(options).await
}

/// Column names of the persisted `items` table, in table order. Empty when
/// the table does not exist.
pub(crate) async fn existing_columns(db_path: &Path) -> Result<Vec<String>, sqlx::Error> {
    let options = SqliteConnectOptions::new().filename(db_path);
    let pool = SqlitePool::connect_with(options).await?;
    let rows = sqlx::query("PRAGMA table_info(items)")
        .fetch_all(&pool)
        .await?;
    pool.close().await;

    rows.iter().map(|row| row.try_get::<String, _>("name")).collect()
}

fn missing_any(existing: &[String]) -> bool {
    REQUIRED_COLUMNS
        .iter()
        .any(|required| !existing.iter().any(|col| col == required))
}

/// Delete the database file plus SQLite's `-wal`/`-shm` siblings.
fn remove_store_files(db_path: &Path) -> std::io::Result<()> {
    remove_if_exists(db_path)?;
    for suffix in ["-wal", "-shm"] {
        let mut sibling = db_path.as_os_str().to_owned();
        sibling.push(suffix);
        remove_if_exists(Path::new(&sibling))?;
    }
    Ok(())
}

fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}
