use crate::numeric::round1;
use crate::row::StockStatus;

/// More than this many days of stock left is Healthy.
pub const HEALTHY_ABOVE_DAYS: f64 = 15.0;
/// More than this (and at most [`HEALTHY_ABOVE_DAYS`]) is Warning; anything else is Critical.
pub const WARNING_ABOVE_DAYS: f64 = 5.0;

/// Days until stock runs out at the average rate; demand is floored at one
/// unit/day so slow movers do not divide by ~0.
pub fn days_to_stockout(closing_stock: f64, avg_daily_demand: f64) -> f64 {
    round1(closing_stock / avg_daily_demand.max(1.0))
}

pub fn classify_days_to_stockout(days: f64) -> StockStatus {
    if days > HEALTHY_ABOVE_DAYS {
        StockStatus::Healthy
    } else if days > WARNING_ABOVE_DAYS {
        StockStatus::Warning
    } else {
        StockStatus::Critical
    }
}
