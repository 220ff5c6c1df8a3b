//! Table-level views over derived rows: KPI counts, risk rankings, the
//! days-of-cover grid and the impact estimate.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::metrics::DerivedRow;
use crate::row::StockStatus;

/// Global filter bar: empty selections mean "everything".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowFilter {
    #[serde(default)]
    pub locations: BTreeSet<String>,
    #[serde(default)]
    pub items: BTreeSet<String>,
}

impl RowFilter {
    pub fn matches(&self, location: &str, item: &str) -> bool {
        (self.locations.is_empty() || self.locations.contains(location))
            && (self.items.is_empty() || self.items.contains(item))
    }

    pub fn apply(&self, rows: &[DerivedRow]) -> Vec<DerivedRow> {
        rows.iter()
            .filter(|d| self.matches(&d.row.location, &d.row.item))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockHealthSummary {
    pub critical: usize,
    pub warning: usize,
    pub healthy: usize,
    pub overstock: usize,
}

impl StockHealthSummary {
    pub fn from_rows(rows: &[DerivedRow]) -> Self {
        rows.iter().fold(Self::default(), |mut acc, d| {
            match d.row.stock_status {
                StockStatus::Critical => acc.critical += 1,
                StockStatus::Warning => acc.warning += 1,
                StockStatus::Healthy => acc.healthy += 1,
            }
            if d.overstock_risk {
                acc.overstock += 1;
            }
            acc
        })
    }

    pub fn at_risk(&self) -> usize {
        self.critical + self.warning
    }
}

/// Rows needing attention (Critical or Warning), in table order.
pub fn at_risk(rows: &[DerivedRow]) -> Vec<&DerivedRow> {
    rows.iter().filter(|d| d.row.stock_status.is_at_risk()).collect()
}

pub fn life_saving_at_risk(rows: &[DerivedRow]) -> Vec<&DerivedRow> {
    rows.iter()
        .filter(|d| d.row.stock_status.is_at_risk() && d.is_life_saving())
        .collect()
}

/// Count per status; every status is present, zero counts included.
pub fn status_distribution(rows: &[DerivedRow]) -> BTreeMap<StockStatus, usize> {
    let mut counts: BTreeMap<StockStatus, usize> =
        StockStatus::ALL.iter().map(|s| (*s, 0)).collect();
    for d in rows {
        *counts.entry(d.row.stock_status).or_default() += 1;
    }
    counts
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRisk {
    pub location: String,
    pub at_risk_items: usize,
}

/// Locations with at least one at-risk row, most at-risk first (ties by name).
pub fn location_risk_ranking(rows: &[DerivedRow]) -> Vec<LocationRisk> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for d in at_risk(rows) {
        *counts.entry(d.row.location.as_str()).or_default() += 1;
    }

    let mut ranking: Vec<LocationRisk> = counts
        .into_iter()
        .map(|(location, at_risk_items)| LocationRisk {
            location: location.to_string(),
            at_risk_items,
        })
        .collect();
    ranking.sort_by(|a, b| {
        b.at_risk_items
            .cmp(&a.at_risk_items)
            .then_with(|| a.location.cmp(&b.location))
    });
    ranking
}

/// Location × item matrix of days of cover; absent pairs are 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverGrid {
    pub locations: Vec<String>,
    pub items: Vec<String>,
    /// `values[i][j]` is the cover of `items[j]` at `locations[i]`.
    pub values: Vec<Vec<f64>>,
}

pub fn days_of_cover_grid(rows: &[DerivedRow]) -> CoverGrid {
    let locations: Vec<String> = rows
        .iter()
        .map(|d| d.row.location.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let items: Vec<String> = rows
        .iter()
        .map(|d| d.row.item.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut values = vec![vec![0.0; items.len()]; locations.len()];
    for d in rows {
        // Both lookups hit: the axes were built from these rows.
        if let (Ok(i), Ok(j)) = (
            locations.binary_search(&d.row.location),
            items.binary_search(&d.row.item),
        ) {
            values[i][j] = d.days_of_cover;
        }
    }

    CoverGrid {
        locations,
        items,
        values,
    }
}

/// Conservative assumptions behind the impact estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactAssumptions {
    pub patients_per_item_per_day: u64,
    pub cost_per_stockout: u64,
    pub stockout_days_prevented: u64,
    pub waste_reduction_rate: f64,
}

impl Default for ImpactAssumptions {
    fn default() -> Self {
        Self {
            patients_per_item_per_day: 3,
            cost_per_stockout: 2_500,
            stockout_days_prevented: 5,
            waste_reduction_rate: 0.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactEstimate {
    pub patients_protected: u64,
    pub emergency_cost_avoided: u64,
    pub waste_reduction_pct: u32,
    pub locations_covered: usize,
    pub items_monitored: usize,
    pub life_saving_items_monitored: usize,
    pub at_risk_identified: usize,
    pub overstock_flagged: usize,
}

impl ImpactEstimate {
    pub fn compute(rows: &[DerivedRow], assumptions: &ImpactAssumptions) -> Self {
        let summary = StockHealthSummary::from_rows(rows);
        let distinct = |f: fn(&DerivedRow) -> Option<&str>| {
            rows.iter().filter_map(f).collect::<BTreeSet<_>>().len()
        };

        Self {
            patients_protected: summary.at_risk() as u64
                * assumptions.patients_per_item_per_day
                * assumptions.stockout_days_prevented,
            emergency_cost_avoided: summary.critical as u64 * assumptions.cost_per_stockout,
            waste_reduction_pct: (assumptions.waste_reduction_rate * 100.0).round() as u32,
            locations_covered: distinct(|d| Some(d.row.location.as_str())),
            items_monitored: distinct(|d| Some(d.row.item.as_str())),
            life_saving_items_monitored: distinct(|d| {
                d.is_life_saving().then_some(d.row.item.as_str())
            }),
            at_risk_identified: summary.at_risk(),
            overstock_flagged: summary.overstock,
        }
    }
}
