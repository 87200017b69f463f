//! Edit normalization and update/insert partitioning.
//!
//! The edit surface hands back a snapshot of loosely typed rows: cells may be
//! numbers, numeric strings, blanks, or free text, and the snapshot may be a
//! subset, a reordering, or carry brand-new rows. This module is the single
//! boundary where those cells are coerced into typed column values and split
//! into full-row updates (existing identity) and inserts (no identity). The
//! write itself lives in the store crate.

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::dates;
use crate::item::ReplenishmentStatus;

/// One row exactly as submitted by the edit surface. Missing cells
/// deserialize as JSON null.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EditedRow {
    #[serde(rename = "id")]
    pub identity: JsonValue,
    pub name: JsonValue,
    pub sku: JsonValue,
    pub category: JsonValue,
    pub supplier: JsonValue,
    pub quantity_on_hand: JsonValue,
    pub reorder_point: JsonValue,
    pub replenishment_status: JsonValue,
    pub available_in_market: JsonValue,
    pub last_purchase_date: JsonValue,
    pub expected_delivery_date: JsonValue,
}

/// Column values after coercion, ready to bind to a store statement.
///
/// Quantities stay optional here: NULL is written back as NULL, and the
/// 0-default is applied at load time, not at write time. Date fields hold
/// either an ISO date string or, when the submitted text does not parse, the
/// literal text itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub supplier: Option<String>,
    pub quantity_on_hand: Option<i64>,
    pub reorder_point: Option<i64>,
    pub replenishment_status: ReplenishmentStatus,
    pub available_in_market: bool,
    pub last_purchase_date: Option<String>,
    pub expected_delivery_date: Option<String>,
}

/// An edited snapshot partitioned for persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowBatch {
    /// Full-row overwrites keyed by identity.
    pub updates: Vec<(i64, NormalizedRow)>,
    /// New rows; the store assigns identities on insert.
    pub inserts: Vec<NormalizedRow>,
    /// Rows that carried a non-coercible identity and were dropped.
    pub skipped: usize,
}

/// Outcome of coercing an identity cell.
enum IdentityCell {
    /// No identity submitted: the row has never been persisted.
    Absent,
    /// An existing row key.
    Existing(i64),
    /// Something was submitted but it is not a usable key.
    Invalid,
}

/// Normalize and partition an edited snapshot.
///
/// Rows with a coercible identity become updates; rows with no identity cell
/// become inserts; rows whose identity cell holds garbage are skipped
/// silently (traced at warn, never reported to the caller). Rows that were
/// loaded but are missing from the snapshot are not touched at all, so
/// editor-side deletions do not propagate.
pub fn partition_edits(rows: Vec<EditedRow>) -> RowBatch {
    let mut batch = RowBatch::default();

    for row in rows {
        match coerce_identity(&row.identity) {
            IdentityCell::Existing(identity) => {
                batch.updates.push((identity, normalize(&row)));
            }
            IdentityCell::Absent => {
                batch.inserts.push(normalize(&row));
            }
            IdentityCell::Invalid => {
                tracing::warn!(identity = %row.identity, "skipping edited row with non-coercible identity");
                batch.skipped += 1;
            }
        }
    }

    batch
}

fn normalize(row: &EditedRow) -> NormalizedRow {
    NormalizedRow {
        name: coerce_text(&row.name),
        sku: coerce_text(&row.sku),
        category: coerce_text(&row.category),
        supplier: coerce_text(&row.supplier),
        quantity_on_hand: coerce_int(&row.quantity_on_hand),
        reorder_point: coerce_int(&row.reorder_point),
        replenishment_status: ReplenishmentStatus::parse_or_default(row.replenishment_status.as_str()),
        available_in_market: coerce_flag(&row.available_in_market),
        last_purchase_date: coerce_date(&row.last_purchase_date),
        expected_delivery_date: coerce_date(&row.expected_delivery_date),
    }
}

fn coerce_identity(cell: &JsonValue) -> IdentityCell {
    if cell.is_null() {
        return IdentityCell::Absent;
    }
    match coerce_int(cell) {
        Some(identity) => IdentityCell::Existing(identity),
        None => IdentityCell::Invalid,
    }
}

/// Integer coercion accepting plain integers, integral floats (grid editors
/// round-trip numeric columns through floats), and numeric strings.
fn coerce_int(cell: &JsonValue) -> Option<i64> {
    match cell {
        JsonValue::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        }),
        JsonValue::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<i64>().ok()
        }
        _ => None,
    }
}

/// Text cells pass through; numbers stringify (grid editors emit numbers for
/// digit-only cells, and a full-row overwrite must not drop them).
fn coerce_text(cell: &JsonValue) -> Option<String> {
    match cell {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Market availability: invalid or absent cells default to available.
fn coerce_flag(cell: &JsonValue) -> bool {
    match cell {
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        _ => true,
    }
}

/// Date cells normalize to an ISO `YYYY-MM-DD` string. Text that fails date
/// parsing is preserved as its literal form rather than dropped; downstream
/// date-only readers treat it as absent.
fn coerce_date(cell: &JsonValue) -> Option<String> {
    match cell {
        JsonValue::Null => None,
        JsonValue::String(s) => {
            if s.trim().is_empty() {
                return None;
            }
            match dates::parse_loose(s) {
                Some(date) => Some(date.format("%Y-%m-%d").to_string()),
                None => Some(s.clone()),
            }
        }
        other => Some(other.to_string()),
    }
}
