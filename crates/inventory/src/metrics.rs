//! Per-row derivation: everything the dashboard shows next to a stock row.
//!
//! Stateless. Every call re-derives from the input row, so deriving an
//! unchanged table twice yields identical output.

use serde::Serialize;

use carestock_core::DomainResult;

use crate::forecast::{BandedForecaster, DemandForecaster, ForecastOutcome, forecast_or_fallback};
use crate::numeric::lead_time_divisor;
use crate::optimization::{OptimizationParams, ReorderPlan};
use crate::row::{InventoryRow, ItemPriority};

/// Days of cover above which a row is flagged as overstocked.
pub const OVERSTOCK_COVER_DAYS: f64 = 90.0;

/// Closing stock over lead time (zero lead time counts as one day).
pub fn days_of_cover(closing_stock: f64, lead_time_days: u32) -> f64 {
    closing_stock / lead_time_divisor(lead_time_days)
}

/// An input row plus all derived fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedRow {
    #[serde(flatten)]
    pub row: InventoryRow,
    pub status_badge: &'static str,
    pub item_priority: ItemPriority,
    pub days_of_cover: f64,
    pub overstock_risk: bool,
    pub forecast: ForecastOutcome,
    #[serde(flatten)]
    pub plan: ReorderPlan,
}

impl DerivedRow {
    pub fn is_life_saving(&self) -> bool {
        self.item_priority == ItemPriority::LifeSaving
    }
}

/// The metrics engine: a forecaster plus optimization constants.
#[derive(Debug, Clone)]
pub struct MetricsEngine<F = BandedForecaster> {
    forecaster: F,
    optimization: OptimizationParams,
}

impl Default for MetricsEngine<BandedForecaster> {
    fn default() -> Self {
        Self {
            forecaster: BandedForecaster::default(),
            optimization: OptimizationParams::default(),
        }
    }
}

impl<F: DemandForecaster> MetricsEngine<F> {
    pub fn new(forecaster: F, optimization: OptimizationParams) -> DomainResult<Self> {
        optimization.validate()?;
        Ok(Self {
            forecaster,
            optimization,
        })
    }

    pub fn derive(&self, row: &InventoryRow) -> DerivedRow {
        let days_of_cover = days_of_cover(row.closing_stock, row.lead_time_days);

        DerivedRow {
            status_badge: row.stock_status.badge(),
            item_priority: row.priority(),
            days_of_cover,
            overstock_risk: days_of_cover > OVERSTOCK_COVER_DAYS,
            forecast: forecast_or_fallback(
                &self.forecaster,
                row.avg_daily_demand,
                row.lead_time_days,
            ),
            plan: ReorderPlan::compute(
                row.closing_stock,
                row.avg_daily_demand,
                row.lead_time_days,
                &self.optimization,
            ),
            row: row.clone(),
        }
    }

    pub fn derive_all(&self, rows: &[InventoryRow]) -> Vec<DerivedRow> {
        let derived: Vec<DerivedRow> = rows.iter().map(|r| self.derive(r)).collect();
        let fallbacks = derived.iter().filter(|d| d.forecast.is_fallback()).count();
        tracing::debug!(rows = derived.len(), fallbacks, "derived inventory metrics");
        derived
    }
}
