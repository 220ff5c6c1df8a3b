//! Inventory metrics engine.
//!
//! Pure, deterministic business logic over stock rows (no IO, no HTTP, no
//! storage): forecasts, reorder economics, status classification, alerts and
//! the per-session state the dashboard mutates.

pub mod action_log;
pub mod alerts;
pub mod dashboard;
pub mod forecast;
pub mod metrics;
pub mod numeric;
pub mod optimization;
pub mod row;
pub mod session;
pub mod status;
pub mod stock;

pub use action_log::{ActionLog, ActionLogEntry};
pub use alerts::{
    Alert, AlertFilter, AlertKind, AlertRule, AlertRuleSet, AlertSeverity, AlertSubject,
    AlertSummary, ItemRule, evaluate_alerts,
};
pub use dashboard::{
    CoverGrid, ImpactAssumptions, ImpactEstimate, LocationRisk, RowFilter, StockHealthSummary,
    at_risk, days_of_cover_grid, life_saving_at_risk, location_risk_ranking, status_distribution,
};
pub use forecast::{
    BandedForecaster, DemandForecast, DemandForecaster, ForecastError, ForecastOutcome,
    ForecastParams, fallback_forecast, forecast_or_fallback,
};
pub use metrics::{DerivedRow, MetricsEngine, OVERSTOCK_COVER_DAYS, days_of_cover};
pub use optimization::{
    OptimizationParams, ReorderPlan, ReorderRecommendation, economic_order_quantity,
    reorder_point, safety_stock,
};
pub use row::{InventoryRow, ItemPriority, LIFE_SAVING_ITEMS, RowKey, StockStatus};
pub use session::{
    ActionReceipt, AlertLevel, LocationNames, NotificationSettings, RecipientGroup,
    RecordActionRequest, SessionState,
};
pub use status::{classify_days_to_stockout, days_to_stockout};
pub use stock::{
    ActionType, ApplyStockAction, StockActionApplied, StockCommand, StockEvent, StockPosition,
};
