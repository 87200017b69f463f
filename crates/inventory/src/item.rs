use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates;

/// Replenishment request lifecycle for an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplenishmentStatus {
    #[default]
    NotRequested,
    Requested,
    InTransit,
    Received,
}

impl ReplenishmentStatus {
    /// Stored text token; also the wire form accepted from the edit surface.
    pub fn as_str(self) -> &'static str {
        match self {
            ReplenishmentStatus::NotRequested => "not_requested",
            ReplenishmentStatus::Requested => "requested",
            ReplenishmentStatus::InTransit => "in_transit",
            ReplenishmentStatus::Received => "received",
        }
    }

    /// Parse a stored/submitted token. Blank or unknown tokens fall back to
    /// `NotRequested` rather than failing the row.
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("requested") => ReplenishmentStatus::Requested,
            Some("in_transit") => ReplenishmentStatus::InTransit,
            Some("received") => ReplenishmentStatus::Received,
            _ => ReplenishmentStatus::NotRequested,
        }
    }
}

impl core::fmt::Display for ReplenishmentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single tracked inventory item, as the rest of the system sees it after
/// the defaulting boundary has run.
///
/// `identity` is the store-assigned surrogate key: `None` means the row has
/// never been persisted; once assigned it never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub identity: Option<i64>,
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub supplier: Option<String>,
    pub quantity_on_hand: i64,
    pub reorder_point: i64,
    pub replenishment_status: ReplenishmentStatus,
    pub available_in_market: bool,
    pub last_purchase_date: Option<NaiveDate>,
    pub expected_delivery_date: Option<NaiveDate>,
}

impl Default for InventoryItem {
    fn default() -> Self {
        Self {
            identity: None,
            name: None,
            sku: None,
            category: None,
            supplier: None,
            quantity_on_hand: 0,
            reorder_point: 0,
            replenishment_status: ReplenishmentStatus::NotRequested,
            available_in_market: true,
            last_purchase_date: None,
            expected_delivery_date: None,
        }
    }
}

/// Raw column values as they come out of the store, before any defaulting.
///
/// Every field except the primary key is nullable at the storage layer; this
/// type exists so that coercion happens in exactly one place
/// ([`InventoryItem::from_stored`]) instead of being scattered per call site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredRow {
    pub identity: i64,
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub supplier: Option<String>,
    pub quantity_on_hand: Option<i64>,
    pub reorder_point: Option<i64>,
    pub replenishment_status: Option<String>,
    pub available_in_market: Option<i64>,
    pub last_purchase_date: Option<String>,
    pub expected_delivery_date: Option<String>,
}

impl InventoryItem {
    /// Single defaulting/coercion boundary for persisted rows.
    ///
    /// Quantities materialize as non-negative integers (NULL or negative input
    /// becomes 0), availability defaults to true, an unknown status token
    /// becomes `NotRequested`, and a date cell whose text does not parse as a
    /// calendar date loads as `None`.
    pub fn from_stored(row: StoredRow) -> Self {
        Self {
            identity: Some(row.identity),
            name: row.name,
            sku: row.sku,
            category: row.category,
            supplier: row.supplier,
            quantity_on_hand: row.quantity_on_hand.unwrap_or(0).max(0),
            reorder_point: row.reorder_point.unwrap_or(0).max(0),
            replenishment_status: ReplenishmentStatus::parse_or_default(
                row.replenishment_status.as_deref(),
            ),
            available_in_market: row.available_in_market.map(|v| v != 0).unwrap_or(true),
            last_purchase_date: row.last_purchase_date.as_deref().and_then(dates::parse_loose),
            expected_delivery_date: row
                .expected_delivery_date
                .as_deref()
                .and_then(dates::parse_loose),
        }
    }

    /// In-memory starter rows offered to the edit surface when the store is
    /// empty. They carry no identity and are only persisted if the user saves.
    pub fn starter_items() -> Vec<Self> {
        vec![
            Self {
                name: Some("Example 1".to_string()),
                sku: Some("SKU001".to_string()),
                category: Some("Medication".to_string()),
                supplier: Some("Supplier A".to_string()),
                quantity_on_hand: 5,
                // sized for ~10 units/day over the 35-day coverage window
                reorder_point: 350,
                ..Self::default()
            },
            Self {
                name: Some("Example 2".to_string()),
                sku: Some("SKU002".to_string()),
                category: Some("Supply".to_string()),
                supplier: Some("Supplier B".to_string()),
                quantity_on_hand: 0,
                reorder_point: 700,
                replenishment_status: ReplenishmentStatus::Requested,
                available_in_market: false,
                ..Self::default()
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_stored_defaults_null_quantities_to_zero() {
        let item = InventoryItem::from_stored(StoredRow {
            identity: 7,
            ..StoredRow::default()
        });
        assert_eq!(item.identity, Some(7));
        assert_eq!(item.quantity_on_hand, 0);
        assert_eq!(item.reorder_point, 0);
        assert!(item.available_in_market);
        assert_eq!(item.replenishment_status, ReplenishmentStatus::NotRequested);
    }

    #[test]
    fn from_stored_clamps_negative_quantities() {
        let item = InventoryItem::from_stored(StoredRow {
            identity: 1,
            quantity_on_hand: Some(-4),
            reorder_point: Some(-10),
            ..StoredRow::default()
        });
        assert_eq!(item.quantity_on_hand, 0);
        assert_eq!(item.reorder_point, 0);
    }

    #[test]
    fn from_stored_reads_availability_flag() {
        let unavailable = InventoryItem::from_stored(StoredRow {
            identity: 1,
            available_in_market: Some(0),
            ..StoredRow::default()
        });
        assert!(!unavailable.available_in_market);

        let available = InventoryItem::from_stored(StoredRow {
            identity: 2,
            available_in_market: Some(1),
            ..StoredRow::default()
        });
        assert!(available.available_in_market);
    }

    #[test]
    fn from_stored_coerces_bad_dates_to_none() {
        let item = InventoryItem::from_stored(StoredRow {
            identity: 1,
            last_purchase_date: Some("not a date".to_string()),
            expected_delivery_date: Some("2024-03-05".to_string()),
            ..StoredRow::default()
        });
        assert_eq!(item.last_purchase_date, None);
        assert_eq!(
            item.expected_delivery_date,
            chrono::NaiveDate::from_ymd_opt(2024, 3, 5)
        );
    }

    #[test]
    fn unknown_status_token_falls_back_to_not_requested() {
        assert_eq!(
            ReplenishmentStatus::parse_or_default(Some("bogus")),
            ReplenishmentStatus::NotRequested
        );
        assert_eq!(
            ReplenishmentStatus::parse_or_default(Some("in_transit")),
            ReplenishmentStatus::InTransit
        );
        assert_eq!(
            ReplenishmentStatus::parse_or_default(None),
            ReplenishmentStatus::NotRequested
        );
    }

    #[test]
    fn starter_items_carry_no_identity() {
        for item in InventoryItem::starter_items() {
            assert_eq!(item.identity, None);
        }
    }
}
