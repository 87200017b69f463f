//! SQLite-backed durable store for inventory items.
//!
//! Infrastructure counterpart to `restock-inventory`: the schema-drift guard,
//! the load path (raw rows through the domain defaulting boundary) and the
//! reconciliation write path (partitioned update/insert batches). Connections
//! are opened per call and closed before returning; nothing here outlives one
//! load or save.

pub mod error;
pub mod schema;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use schema::SchemaReport;
pub use store::ItemStore;
