//! Short-horizon demand forecast with a fixed-width confidence band.
//!
//! Model:
//! - Point forecast = average daily demand × horizon.
//! - Band = point × (`low_factor`, `high_factor`), ±20% by default.
//!
//! The band is a heuristic, not a statistical interval; the factors are
//! configurable constants rather than derived values.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use carestock_core::{DomainError, DomainResult, ValueObject};

use crate::numeric::round1;

/// Day multipliers (low, point, high) used when the forecaster fails.
pub const FALLBACK_DAY_MULTIPLIERS: (f64, f64, f64) = (5.0, 7.0, 9.0);

pub const FALLBACK_EXPLANATION: &str = "Fallback estimate based on historical demand";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastParams {
    pub horizon_days: u32,
    pub low_factor: f64,
    pub high_factor: f64,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            horizon_days: 7,
            low_factor: 0.8,
            high_factor: 1.2,
        }
    }
}

impl ForecastParams {
    pub fn with_horizon(mut self, horizon_days: u32) -> Self {
        self.horizon_days = horizon_days;
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.horizon_days == 0 {
            return Err(DomainError::validation("forecast horizon must be at least 1 day"));
        }
        if !(self.low_factor.is_finite() && self.high_factor.is_finite()) {
            return Err(DomainError::validation("forecast band factors must be finite"));
        }
        if !(0.0..=1.0).contains(&self.low_factor) || self.high_factor < 1.0 {
            return Err(DomainError::validation(format!(
                "forecast band must satisfy 0 <= low <= 1 <= high (low={}, high={})",
                self.low_factor, self.high_factor
            )));
        }
        Ok(())
    }
}

/// A forecast record: point estimate, band and a human-readable explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandForecast {
    pub forecast_units: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub explanation: String,
}

impl ValueObject for DemandForecast {}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    #[error("{field} is not a finite number ({value})")]
    NonFiniteInput { field: &'static str, value: f64 },

    #[error("forecast model failed: {0}")]
    Model(String),
}

/// Seam for demand forecasting models.
///
/// Implementations must be pure: same inputs, same forecast.
pub trait DemandForecaster {
    fn forecast(
        &self,
        avg_daily_demand: f64,
        lead_time_days: u32,
    ) -> Result<DemandForecast, ForecastError>;
}

/// Default forecaster: average demand projected over the horizon with a
/// fixed multiplicative band.
#[derive(Debug, Clone, Copy, Default)]
pub struct BandedForecaster {
    params: ForecastParams,
}

impl BandedForecaster {
    pub fn new(params: ForecastParams) -> DomainResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }
}

impl DemandForecaster for BandedForecaster {
    fn forecast(
        &self,
        avg_daily_demand: f64,
        lead_time_days: u32,
    ) -> Result<DemandForecast, ForecastError> {
        if !avg_daily_demand.is_finite() {
            return Err(ForecastError::NonFiniteInput {
                field: "avg_daily_demand",
                value: avg_daily_demand,
            });
        }

        let horizon = self.params.horizon_days;
        let units = avg_daily_demand * f64::from(horizon);

        Ok(DemandForecast {
            forecast_units: round1(units),
            lower_bound: round1(units * self.params.low_factor),
            upper_bound: round1(units * self.params.high_factor),
            explanation: format!(
                "Forecast uses recent average demand ({avg_daily_demand:.1}/day) \
                 projected over {horizon} days. Lead time considered: \
                 {lead_time_days} days. Confidence band reflects demand variability."
            ),
        })
    }
}

/// Which path produced a forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ForecastOutcome {
    Model { forecast: DemandForecast },
    Fallback { forecast: DemandForecast, reason: String },
}

impl ForecastOutcome {
    pub fn forecast(&self) -> &DemandForecast {
        match self {
            ForecastOutcome::Model { forecast } => forecast,
            ForecastOutcome::Fallback { forecast, .. } => forecast,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ForecastOutcome::Fallback { .. })
    }
}

/// Raw demand × fixed day multipliers. Never blank: a non-finite demand
/// degrades to zero.
pub fn fallback_forecast(avg_daily_demand: f64) -> DemandForecast {
    let demand = if avg_daily_demand.is_finite() { avg_daily_demand } else { 0.0 };
    let (low, point, high) = FALLBACK_DAY_MULTIPLIERS;
    DemandForecast {
        forecast_units: round1(demand * point),
        lower_bound: round1(demand * low),
        upper_bound: round1(demand * high),
        explanation: FALLBACK_EXPLANATION.to_string(),
    }
}

/// Run the forecaster; on failure substitute the fixed-multiplier estimate.
pub fn forecast_or_fallback<F>(
    forecaster: &F,
    avg_daily_demand: f64,
    lead_time_days: u32,
) -> ForecastOutcome
where
    F: DemandForecaster + ?Sized,
{
    match forecaster.forecast(avg_daily_demand, lead_time_days) {
        Ok(forecast) => ForecastOutcome::Model { forecast },
        Err(e) => {
            tracing::warn!(error = %e, "demand forecast failed; using fallback estimate");
            ForecastOutcome::Fallback {
                forecast: fallback_forecast(avg_daily_demand),
                reason: e.to_string(),
            }
        }
    }
}
