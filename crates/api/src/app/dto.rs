use std::collections::{BTreeMap, BTreeSet};

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use carestock_inventory::{
    Alert, AlertFilter, AlertKind, AlertRule, AlertSeverity, AlertSummary, CoverGrid, DerivedRow,
    ImpactAssumptions, ImpactEstimate, ItemRule, LocationNames, LocationRisk, RowFilter,
    StockHealthSummary, StockStatus,
};

use crate::app::errors;
use crate::app::services::DataOrigin;

pub const DEFAULT_ACTIONS_LIMIT: usize = 20;

// -------------------------
// Query strings
// -------------------------

/// `?locations=A,B&items=Insulin` (comma-separated; absent means all).
#[derive(Debug, Default, Deserialize)]
pub struct RowFilterQuery {
    pub locations: Option<String>,
    pub items: Option<String>,
}

impl RowFilterQuery {
    pub fn to_filter(&self) -> RowFilter {
        RowFilter {
            locations: split_list(self.locations.as_deref()),
            items: split_list(self.items.as_deref()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ActionsQuery {
    pub limit: Option<usize>,
}

/// `?severity=critical,warning&kind=expiry`
#[derive(Debug, Default, Deserialize)]
pub struct AlertsQuery {
    pub severity: Option<String>,
    pub kind: Option<String>,
}

impl AlertsQuery {
    pub fn to_filter(&self) -> Result<AlertFilter, axum::response::Response> {
        let severities = split_list(self.severity.as_deref())
            .iter()
            .map(|s| parse_alert_severity(s))
            .collect::<Result<BTreeSet<_>, _>>()?;
        let kinds = split_list(self.kind.as_deref())
            .iter()
            .map(|s| parse_alert_kind(s))
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(AlertFilter { severities, kinds })
    }
}

fn split_list(raw: Option<&str>) -> BTreeSet<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

pub fn parse_alert_severity(s: &str) -> Result<AlertSeverity, axum::response::Response> {
    match s.to_lowercase().as_str() {
        "critical" => Ok(AlertSeverity::Critical),
        "warning" => Ok(AlertSeverity::Warning),
        "info" => Ok(AlertSeverity::Info),
        _ => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_severity",
            "severity must be one of: critical, warning, info",
        )),
    }
}

pub fn parse_alert_kind(s: &str) -> Result<AlertKind, axum::response::Response> {
    match s.to_lowercase().replace([' ', '-'], "_").as_str() {
        "low_stock" => Ok(AlertKind::LowStock),
        "overstock" => Ok(AlertKind::Overstock),
        "expiry" => Ok(AlertKind::Expiry),
        _ => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_alert_kind",
            "kind must be one of: low_stock, overstock, expiry",
        )),
    }
}

// -------------------------
// Request DTOs
// -------------------------

/// Both parts are optional; whatever is present is applied together or not at all.
#[derive(Debug, Deserialize)]
pub struct UpdateAlertRulesRequest {
    pub default_rule: Option<AlertRule>,
    pub overrides: Option<Vec<ItemRule>>,
}

#[derive(Debug, Deserialize)]
pub struct RenameLocationRequest {
    pub display_name: String,
}

// -------------------------
// Response DTOs
// -------------------------

/// A derived row plus the location's display name and the on-screen badges.
#[derive(Debug, Serialize)]
pub struct RowView {
    #[serde(flatten)]
    pub derived: DerivedRow,
    pub location_name: String,
    pub priority_badge: &'static str,
    pub reorder_badge: &'static str,
}

impl RowView {
    pub fn new(derived: DerivedRow, names: &LocationNames) -> Self {
        let location_name = names.display_name(&derived.row.location).to_string();
        Self {
            priority_badge: derived.item_priority.badge(),
            reorder_badge: derived.plan.recommendation.badge(),
            location_name,
            derived,
        }
    }
}

pub fn row_views<'a>(
    rows: impl IntoIterator<Item = &'a DerivedRow>,
    names: &LocationNames,
) -> Vec<RowView> {
    rows.into_iter().map(|d| RowView::new(d.clone(), names)).collect()
}

#[derive(Debug, Serialize)]
pub struct RowsResponse {
    pub data: DataOrigin,
    pub rows: Vec<RowView>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub data: DataOrigin,
    pub health: StockHealthSummary,
    pub at_risk: Vec<RowView>,
    pub life_saving_at_risk: Vec<RowView>,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub status_distribution: BTreeMap<StockStatus, usize>,
    pub location_risk: Vec<LocationRisk>,
    pub days_of_cover: CoverGrid,
    pub impact: ImpactEstimate,
    pub assumptions: ImpactAssumptions,
}

#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub summary: AlertSummary,
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Serialize)]
pub struct AlertRulesResponse {
    pub default_rule: AlertRule,
    pub overrides: Vec<ItemRule>,
}
