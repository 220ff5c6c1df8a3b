//! Smart alerts: low stock, overstock and expiry, driven by per-item rules.
//!
//! Each evaluation is an independent pass; nothing is remembered between
//! passes, so the same input produces the same alerts again.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use carestock_core::{DomainError, DomainResult, ValueObject};

use crate::metrics::DerivedRow;

/// Thresholds applied to one item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    /// Alert when stock is at or below this percentage of the reorder point.
    pub low_pct: f64,
    /// Alert when stock exceeds max stock by more than this percentage.
    pub over_pct: f64,
    /// Alert when expiry is this many days away or fewer.
    pub perishable_days: i64,
}

impl ValueObject for AlertRule {}

impl Default for AlertRule {
    fn default() -> Self {
        Self {
            low_pct: 20.0,
            over_pct: 50.0,
            perishable_days: 30,
        }
    }
}

impl AlertRule {
    pub fn validate(&self) -> DomainResult<()> {
        if !self.low_pct.is_finite() || !(0.0..=100.0).contains(&self.low_pct) {
            return Err(DomainError::validation(format!(
                "low stock threshold must be between 0 and 100 percent (got {})",
                self.low_pct
            )));
        }
        if !self.over_pct.is_finite() || self.over_pct < 0.0 {
            return Err(DomainError::validation(format!(
                "overstock threshold must be a non-negative percentage (got {})",
                self.over_pct
            )));
        }
        if self.perishable_days < 0 {
            return Err(DomainError::validation(format!(
                "perishable days cannot be negative (got {})",
                self.perishable_days
            )));
        }
        Ok(())
    }
}

/// One row of the editable per-item rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRule {
    pub item: String,
    #[serde(flatten)]
    pub rule: AlertRule,
}

/// Per-item overrides with an explicit default for everything else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertRuleSet {
    default_rule: AlertRule,
    overrides: BTreeMap<String, AlertRule>,
}

impl AlertRuleSet {
    pub fn new(default_rule: AlertRule) -> DomainResult<Self> {
        default_rule.validate()?;
        Ok(Self {
            default_rule,
            overrides: BTreeMap::new(),
        })
    }

    pub fn default_rule(&self) -> &AlertRule {
        &self.default_rule
    }

    pub fn rule_for(&self, item: &str) -> &AlertRule {
        self.overrides.get(item).unwrap_or(&self.default_rule)
    }

    pub fn overrides(&self) -> Vec<ItemRule> {
        self.overrides
            .iter()
            .map(|(item, rule)| ItemRule {
                item: item.clone(),
                rule: *rule,
            })
            .collect()
    }

    /// Replace the default rule. On error the current rule is kept.
    pub fn set_default(&mut self, rule: AlertRule) -> DomainResult<()> {
        rule.validate()?;
        self.default_rule = rule;
        Ok(())
    }

    /// Replace the whole override table. All rows are checked first; on any
    /// error the current table is kept unchanged.
    pub fn replace_overrides(&mut self, table: Vec<ItemRule>) -> DomainResult<()> {
        let mut next = BTreeMap::new();
        for ItemRule { item, rule } in table {
            let item = item.trim().to_string();
            if item.is_empty() {
                return Err(reject("rule row has an empty item name"));
            }
            if let Err(e) = rule.validate() {
                return Err(reject(format!("rule for {item}: {e}")));
            }
            if next.insert(item.clone(), rule).is_some() {
                return Err(reject(format!("duplicate rule for item {item}")));
            }
        }
        self.overrides = next;
        tracing::info!(overrides = self.overrides.len(), "alert rules updated");
        Ok(())
    }
}

fn reject(msg: impl Into<String>) -> DomainError {
    let err = DomainError::validation(msg);
    tracing::warn!(error = %err, "rejected alert rule table; keeping previous rules");
    err
}

/// Input for alert evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSubject {
    pub item: String,
    pub current_stock: f64,
    pub reorder_point: f64,
    pub max_stock: Option<f64>,
    pub expiry_date: Option<NaiveDate>,
}

impl AlertSubject {
    /// Live rows carry no max stock or expiry; only the low-stock rule applies.
    pub fn from_derived(row: &DerivedRow) -> Self {
        Self {
            item: row.row.item.clone(),
            current_stock: row.row.closing_stock,
            reorder_point: row.plan.reorder_point,
            max_stock: None,
            expiry_date: None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertKind {
    #[serde(rename = "Low stock")]
    LowStock,
    Overstock,
    Expiry,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub item: String,
    pub kind: AlertKind,
    pub message: String,
    pub severity: AlertSeverity,
    pub created_at: DateTime<Utc>,
}

/// Evaluate every subject against its rule.
pub fn evaluate_alerts(
    subjects: &[AlertSubject],
    rules: &AlertRuleSet,
    today: NaiveDate,
    created_at: DateTime<Utc>,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for subject in subjects {
        let rule = rules.rule_for(&subject.item);
        let mut push = |kind, message, severity| {
            alerts.push(Alert {
                item: subject.item.clone(),
                kind,
                message,
                severity,
                created_at,
            })
        };

        if subject.reorder_point > 0.0 {
            let pct_of_reorder = subject.current_stock * 100.0 / subject.reorder_point;
            if pct_of_reorder <= rule.low_pct {
                let severity = if pct_of_reorder <= rule.low_pct / 2.0 {
                    AlertSeverity::Critical
                } else {
                    AlertSeverity::Warning
                };
                push(
                    AlertKind::LowStock,
                    format!("{} at {pct_of_reorder:.1}% of reorder level", subject.item),
                    severity,
                );
            }
        }

        if let Some(max_stock) = subject.max_stock.filter(|m| m.is_finite() && *m > 0.0) {
            if subject.current_stock > max_stock * (1.0 + rule.over_pct / 100.0) {
                push(
                    AlertKind::Overstock,
                    format!("{} exceeds max by {}%", subject.item, rule.over_pct),
                    AlertSeverity::Info,
                );
            }
        }

        if let Some(expiry) = subject.expiry_date {
            let days_left = (expiry - today).num_days();
            if days_left <= rule.perishable_days {
                let severity = if days_left > 0 {
                    AlertSeverity::Warning
                } else {
                    AlertSeverity::Critical
                };
                push(
                    AlertKind::Expiry,
                    format!("{} expires in {days_left} days", subject.item),
                    severity,
                );
            }
        }
    }

    alerts
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSummary {
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
}

impl AlertSummary {
    pub fn from_alerts(alerts: &[Alert]) -> Self {
        alerts.iter().fold(Self::default(), |mut acc, a| {
            match a.severity {
                AlertSeverity::Critical => acc.critical += 1,
                AlertSeverity::Warning => acc.warning += 1,
                AlertSeverity::Info => acc.info += 1,
            }
            acc
        })
    }
}

/// Severity / type filter. An empty set means "no filter" for that dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertFilter {
    #[serde(default)]
    pub severities: BTreeSet<AlertSeverity>,
    #[serde(default)]
    pub kinds: BTreeSet<AlertKind>,
}

impl AlertFilter {
    pub fn matches(&self, alert: &Alert) -> bool {
        (self.severities.is_empty() || self.severities.contains(&alert.severity))
            && (self.kinds.is_empty() || self.kinds.contains(&alert.kind))
    }

    /// Matching alerts, newest first (stable for equal timestamps).
    pub fn apply(&self, alerts: &[Alert]) -> Vec<Alert> {
        let mut out: Vec<Alert> = alerts.iter().filter(|a| self.matches(a)).cloned().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }
}
