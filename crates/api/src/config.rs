//! Environment-driven configuration.
//!
//! Every setting has a default; unset variables fall back to it. A variable
//! that is set but unusable is an error naming that variable.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use carestock_core::DomainResult;
use carestock_inventory::{AlertRule, ForecastParams, OptimizationParams};

pub const BIND_ENV: &str = "CARESTOCK_BIND";
pub const DATA_PATH_ENV: &str = "CARESTOCK_DATA_PATH";
pub const ACTION_LOG_PATH_ENV: &str = "CARESTOCK_ACTION_LOG_PATH";
pub const FORECAST_HORIZON_ENV: &str = "CARESTOCK_FORECAST_HORIZON";
pub const ORDERING_COST_ENV: &str = "CARESTOCK_ORDERING_COST";
pub const HOLDING_COST_ENV: &str = "CARESTOCK_HOLDING_COST";
pub const SERVICE_LEVEL_ENV: &str = "CARESTOCK_SERVICE_LEVEL";
pub const LOW_STOCK_PCT_ENV: &str = "CARESTOCK_LOW_STOCK_PCT";
pub const OVERSTOCK_PCT_ENV: &str = "CARESTOCK_OVERSTOCK_PCT";
pub const PERISHABLE_DAYS_ENV: &str = "CARESTOCK_PERISHABLE_DAYS";

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var}={value:?} could not be parsed: {reason}")]
    Unparseable {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{var} is out of range: {reason}")]
    Rejected { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind: String,
    /// CSV stock-health table; demo data is served when absent.
    pub data_path: Option<PathBuf>,
    /// JSON-lines file mirroring the action log; in-memory when absent.
    pub action_log_path: Option<PathBuf>,
    pub forecast: ForecastParams,
    pub optimization: OptimizationParams,
    pub alert_rule: AlertRule,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            data_path: None,
            action_log_path: None,
            forecast: ForecastParams::default(),
            optimization: OptimizationParams::default(),
            alert_rule: AlertRule::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the process environment in production).
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let bind = get(BIND_ENV).unwrap_or(defaults.bind);
        let data_path = get(DATA_PATH_ENV).map(PathBuf::from);
        let action_log_path = get(ACTION_LOG_PATH_ENV).map(PathBuf::from);

        let horizon = parse_or(
            get(FORECAST_HORIZON_ENV),
            FORECAST_HORIZON_ENV,
            defaults.forecast.horizon_days,
        )?;
        let forecast = defaults.forecast.with_horizon(horizon);
        check(FORECAST_HORIZON_ENV, forecast.validate())?;

        let base = defaults.optimization;
        let ordering_cost =
            parse_or(get(ORDERING_COST_ENV), ORDERING_COST_ENV, base.ordering_cost)?;
        let holding_cost = parse_or(get(HOLDING_COST_ENV), HOLDING_COST_ENV, base.holding_cost)?;
        let service_level =
            parse_or(get(SERVICE_LEVEL_ENV), SERVICE_LEVEL_ENV, base.service_level)?;
        // Check each override on its own so the error names the right variable.
        check(ORDERING_COST_ENV, OptimizationParams { ordering_cost, ..base }.validate())?;
        check(HOLDING_COST_ENV, OptimizationParams { holding_cost, ..base }.validate())?;
        check(SERVICE_LEVEL_ENV, OptimizationParams { service_level, ..base }.validate())?;
        let optimization = OptimizationParams {
            ordering_cost,
            holding_cost,
            service_level,
            ..base
        };

        let base = defaults.alert_rule;
        let low_pct = parse_or(get(LOW_STOCK_PCT_ENV), LOW_STOCK_PCT_ENV, base.low_pct)?;
        let over_pct = parse_or(get(OVERSTOCK_PCT_ENV), OVERSTOCK_PCT_ENV, base.over_pct)?;
        let perishable_days =
            parse_or(get(PERISHABLE_DAYS_ENV), PERISHABLE_DAYS_ENV, base.perishable_days)?;
        check(LOW_STOCK_PCT_ENV, AlertRule { low_pct, ..base }.validate())?;
        check(OVERSTOCK_PCT_ENV, AlertRule { over_pct, ..base }.validate())?;
        check(PERISHABLE_DAYS_ENV, AlertRule { perishable_days, ..base }.validate())?;
        let alert_rule = AlertRule {
            low_pct,
            over_pct,
            perishable_days,
        };

        Ok(Self {
            bind,
            data_path,
            action_log_path,
            forecast,
            optimization,
            alert_rule,
        })
    }
}

fn check(var: &'static str, result: DomainResult<()>) -> Result<(), ConfigError> {
    result.map_err(|e| ConfigError::Rejected {
        var,
        reason: e.to_string(),
    })
}

fn parse_or<T>(raw: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Unparseable {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}
