//! Inventory domain module.
//!
//! This crate contains the replenishment business rules, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage): the item record
//! and its defaulting boundary, the derived-state engine (situation, priority,
//! consumption and stockout estimates), and the edit-normalization step that
//! turns loosely typed editor rows into a partitioned update/insert batch.

pub mod derive;
pub mod item;
pub mod reconcile;

mod dates;

pub use derive::{
    DerivedItem, Situation, StockSummary, category_options, derive_states, supplier_options,
    urgent,
};
pub use item::{InventoryItem, ReplenishmentStatus, StoredRow};
pub use reconcile::{EditedRow, NormalizedRow, RowBatch, partition_edits};
