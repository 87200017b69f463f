//! Derived-state engine.
//!
//! Pure, deterministic augmentation of an item snapshot: urgency
//! classification, priority ranking, consumption-rate estimation and
//! stockout-date projection, followed by a snapshot-wide stable sort that
//! surfaces the worst cases first. Nothing here touches storage; derived
//! values are recomputed on every load and never written back.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::item::InventoryItem;

/// The reorder point is assumed to be sized for this many days of coverage.
/// Consumption estimates are a proxy derived from it, not a measured rate.
pub const COVERAGE_DAYS: f64 = 35.0;

/// Categorical urgency of an item, worst first.
///
/// Classification rules are evaluated in declaration order; market
/// unavailability escalates severity even when quantity alone would only
/// warrant `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Situation {
    NoStockNoMarket,
    CriticalPoorMarket,
    NoStock,
    Low,
    Ok,
}

impl Situation {
    /// First matching rule wins, in strict order.
    pub fn classify(quantity_on_hand: i64, reorder_point: i64, available_in_market: bool) -> Self {
        if quantity_on_hand <= 0 && !available_in_market {
            return Situation::NoStockNoMarket;
        }
        if quantity_on_hand <= reorder_point && !available_in_market {
            return Situation::CriticalPoorMarket;
        }
        if quantity_on_hand <= 0 {
            return Situation::NoStock;
        }
        if quantity_on_hand <= reorder_point {
            return Situation::Low;
        }
        Situation::Ok
    }

    /// Urgency rank used for sorting. Mapped directly from the variant, never
    /// recovered from a rendered label.
    pub fn priority(self) -> u8 {
        match self {
            Situation::NoStockNoMarket => 4,
            Situation::CriticalPoorMarket => 3,
            Situation::NoStock => 2,
            Situation::Low => 1,
            Situation::Ok => 0,
        }
    }

    /// Human-readable label for the edit surface.
    pub fn label(self) -> &'static str {
        match self {
            Situation::NoStockNoMarket => "no stock, no market",
            Situation::CriticalPoorMarket => "critical, poor market",
            Situation::NoStock => "no stock",
            Situation::Low => "low",
            Situation::Ok => "ok",
        }
    }
}

impl core::fmt::Display for Situation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// An item augmented with its derived fields, ready for display and
/// decision-making. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedItem {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub situation: Situation,
    pub priority: u8,
    pub estimated_daily_consumption: Option<f64>,
    pub estimated_days_of_stock: Option<f64>,
    pub projected_stockout_date: Option<NaiveDate>,
}

impl DerivedItem {
    fn compute(item: InventoryItem, today: NaiveDate) -> Self {
        let situation = Situation::classify(
            item.quantity_on_hand,
            item.reorder_point,
            item.available_in_market,
        );

        let estimated_daily_consumption = if item.reorder_point > 0 {
            Some(item.reorder_point as f64 / COVERAGE_DAYS)
        } else {
            None
        };

        let estimated_days_of_stock = estimated_daily_consumption
            .filter(|c| *c > 0.0)
            .map(|c| item.quantity_on_hand as f64 / c);

        let projected_stockout_date = estimated_days_of_stock
            .filter(|d| *d > 0.0)
            .and_then(|d| Duration::try_days(d.floor() as i64))
            .and_then(|offset| today.checked_add_signed(offset));

        Self {
            priority: situation.priority(),
            situation,
            estimated_daily_consumption,
            estimated_days_of_stock,
            projected_stockout_date,
            item,
        }
    }
}

/// Augment a full item snapshot and order it worst-first.
///
/// `today` is an explicit input so the stockout projection stays
/// deterministic under test. The sort is stable: items of equal priority
/// keep their relative input order.
pub fn derive_states(items: Vec<InventoryItem>, today: NaiveDate) -> Vec<DerivedItem> {
    let mut derived: Vec<DerivedItem> = items
        .into_iter()
        .map(|item| DerivedItem::compute(item, today))
        .collect();
    derived.sort_by_key(|d| core::cmp::Reverse(d.priority));
    derived
}

/// Headline counts for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StockSummary {
    pub total_items: usize,
    pub at_or_below_reorder: usize,
    pub out_of_stock: usize,
}

impl StockSummary {
    pub fn of(items: &[InventoryItem]) -> Self {
        Self {
            total_items: items.len(),
            at_or_below_reorder: items
                .iter()
                .filter(|i| i.quantity_on_hand <= i.reorder_point)
                .count(),
            out_of_stock: items.iter().filter(|i| i.quantity_on_hand <= 0).count(),
        }
    }
}

/// Items needing attention (anything ranked above `Ok`).
pub fn urgent(derived: &[DerivedItem]) -> Vec<&DerivedItem> {
    derived.iter().filter(|d| d.priority > 0).collect()
}

/// Distinct, sorted, non-empty supplier names, for the filter dropdown.
pub fn supplier_options(items: &[InventoryItem]) -> Vec<String> {
    distinct_options(items.iter().map(|i| i.supplier.as_deref()))
}

/// Distinct, sorted, non-empty category names, for the filter dropdown.
pub fn category_options(items: &[InventoryItem]) -> Vec<String> {
    distinct_options(items.iter().map(|i| i.category.as_deref()))
}

fn distinct_options<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    let mut options: Vec<String> = values
        .flatten()
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
        .collect();
    options.sort();
    options.dedup();
    options
}
