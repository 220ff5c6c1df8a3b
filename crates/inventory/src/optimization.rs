//! Reorder economics: economic order quantity, safety stock, reorder point.
//!
//! All three are pure, evaluated per row, and rounded half-up to one decimal
//! so the reorder recommendation is stable under recomputation.

use serde::{Deserialize, Serialize};

use carestock_core::{DomainError, DomainResult, ValueObject};

use crate::numeric::round1;

pub const DEFAULT_ORDERING_COST: f64 = 500.0;
pub const DEFAULT_HOLDING_COST: f64 = 50.0;
/// z ≈ 1.65: one-sided ~95% service level under normal demand.
pub const DEFAULT_SERVICE_LEVEL: f64 = 1.65;
/// Demand standard deviation assumed as a fraction of mean demand.
pub const DEFAULT_DEMAND_VARIABILITY: f64 = 0.3;

const DAYS_PER_YEAR: f64 = 365.0;

/// Cost and service constants (global, not per item).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizationParams {
    /// Cost per order placed.
    pub ordering_cost: f64,
    /// Annual holding cost per unit.
    pub holding_cost: f64,
    pub service_level: f64,
    pub demand_variability: f64,
}

impl Default for OptimizationParams {
    fn default() -> Self {
        Self {
            ordering_cost: DEFAULT_ORDERING_COST,
            holding_cost: DEFAULT_HOLDING_COST,
            service_level: DEFAULT_SERVICE_LEVEL,
            demand_variability: DEFAULT_DEMAND_VARIABILITY,
        }
    }
}

impl OptimizationParams {
    pub fn validate(&self) -> DomainResult<()> {
        let fields = [
            ("ordering_cost", self.ordering_cost),
            ("holding_cost", self.holding_cost),
            ("service_level", self.service_level),
            ("demand_variability", self.demand_variability),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(DomainError::validation(format!(
                    "{name} must be a finite non-negative number (got {value})"
                )));
            }
        }
        if self.holding_cost == 0.0 {
            return Err(DomainError::validation("holding_cost must be greater than zero"));
        }
        Ok(())
    }
}

/// `sqrt(2 · D · S / H)` with `D = daily demand × 365`; zero when there is no demand.
pub fn economic_order_quantity(
    avg_daily_demand: f64,
    ordering_cost: f64,
    holding_cost: f64,
) -> f64 {
    let annual_demand = avg_daily_demand * DAYS_PER_YEAR;
    if annual_demand <= 0.0 {
        return 0.0;
    }
    round1((2.0 * annual_demand * ordering_cost / holding_cost).sqrt())
}

/// `z · σ · sqrt(L)` with `σ = demand × variability`.
pub fn safety_stock(
    avg_daily_demand: f64,
    lead_time_days: u32,
    service_level: f64,
    demand_variability: f64,
) -> f64 {
    let demand_std = avg_daily_demand * demand_variability;
    round1(service_level * demand_std * f64::from(lead_time_days).sqrt())
}

/// Demand over the lead time plus the safety buffer.
pub fn reorder_point(avg_daily_demand: f64, lead_time_days: u32, safety_stock: f64) -> f64 {
    round1(avg_daily_demand * f64::from(lead_time_days) + safety_stock)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReorderRecommendation {
    #[serde(rename = "Order now")]
    OrderNow,
    #[serde(rename = "Stock sufficient")]
    StockSufficient,
}

impl ReorderRecommendation {
    pub fn evaluate(closing_stock: f64, reorder_point: f64) -> Self {
        if closing_stock <= reorder_point {
            ReorderRecommendation::OrderNow
        } else {
            ReorderRecommendation::StockSufficient
        }
    }

    pub fn badge(&self) -> &'static str {
        match self {
            ReorderRecommendation::OrderNow => "🔴 Order now",
            ReorderRecommendation::StockSufficient => "🟢 Stock sufficient",
        }
    }
}

/// EOQ, safety stock and reorder point for one row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReorderPlan {
    pub eoq: f64,
    pub safety_stock: f64,
    pub reorder_point: f64,
    pub recommendation: ReorderRecommendation,
}

impl ValueObject for ReorderPlan {}

impl ReorderPlan {
    pub fn compute(
        closing_stock: f64,
        avg_daily_demand: f64,
        lead_time_days: u32,
        params: &OptimizationParams,
    ) -> Self {
        let eoq =
            economic_order_quantity(avg_daily_demand, params.ordering_cost, params.holding_cost);
        let safety_stock = safety_stock(
            avg_daily_demand,
            lead_time_days,
            params.service_level,
            params.demand_variability,
        );
        let reorder_point = reorder_point(avg_daily_demand, lead_time_days, safety_stock);

        Self {
            eoq,
            safety_stock,
            reorder_point,
            recommendation: ReorderRecommendation::evaluate(closing_stock, reorder_point),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reference_scenario_with_default_constants() {
        let plan = ReorderPlan::compute(30.0, 5.0, 7, &OptimizationParams::default());
        assert_eq!(plan.eoq, 191.0);
        assert_eq!(plan.safety_stock, 6.5);
        assert_eq!(plan.reorder_point, 41.5);
        assert_eq!(plan.recommendation, ReorderRecommendation::OrderNow);
    }

    #[test]
    fn eoq_is_zero_without_demand() {
        assert_eq!(economic_order_quantity(0.0, 500.0, 50.0), 0.0);
    }

    #[test]
    fn recommendation_threshold_is_inclusive() {
        assert_eq!(ReorderRecommendation::evaluate(41.5, 41.5), ReorderRecommendation::OrderNow);
        assert_eq!(
            ReorderRecommendation::evaluate(41.6, 41.5),
            ReorderRecommendation::StockSufficient
        );
    }

    #[test]
    fn zero_lead_time_needs_no_safety_stock() {
        assert_eq!(safety_stock(10.0, 0, 1.65, 0.3), 0.0);
        assert_eq!(reorder_point(10.0, 0, 0.0), 0.0);
    }

    #[test]
    fn params_reject_zero_holding_cost() {
        let params = OptimizationParams {
            holding_cost: 0.0,
            ..OptimizationParams::default()
        };
        assert!(matches!(params.validate(), Err(DomainError::Validation(_))));
        assert!(OptimizationParams::default().validate().is_ok());
    }

    #[test]
    fn params_reject_non_finite_values() {
        let params = OptimizationParams {
            service_level: f64::INFINITY,
            ..OptimizationParams::default()
        };
        assert!(params.validate().is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: EOQ never decreases as demand grows.
        #[test]
        fn eoq_is_monotone_in_demand(a in 0.0f64..5_000.0, b in 0.0f64..5_000.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let eoq_lo = economic_order_quantity(lo, 500.0, 50.0);
            let eoq_hi = economic_order_quantity(hi, 500.0, 50.0);
            prop_assert!(eoq_lo <= eoq_hi);
        }

        /// Property: reorder point is lead-time demand plus safety stock (post-rounding).
        #[test]
        fn reorder_point_is_lead_time_demand_plus_safety_stock(
            demand in 0.0f64..1_000.0,
            lead in 0u32..120,
        ) {
            let plan = ReorderPlan::compute(0.0, demand, lead, &OptimizationParams::default());
            let expected = round1(demand * f64::from(lead) + plan.safety_stock);
            prop_assert_eq!(plan.reorder_point, expected);
        }

        /// Property: recomputing the same plan gives the same plan.
        #[test]
        fn plan_is_idempotent(
            stock in 0.0f64..10_000.0,
            demand in 0.0f64..1_000.0,
            lead in 0u32..120,
        ) {
            let params = OptimizationParams::default();
            prop_assert_eq!(
                ReorderPlan::compute(stock, demand, lead, &params),
                ReorderPlan::compute(stock, demand, lead, &params)
            );
        }
    }
}
