use serde::{Deserialize, Serialize};

use carestock_core::{DomainError, DomainResult};

/// Items that are always prioritized in triage views.
pub const LIFE_SAVING_ITEMS: [&str; 4] = ["Insulin", "Oxygen", "Blood", "Ventilator"];

/// Stock health classification.
///
/// Supplied by the upstream source; recomputed locally only by the stock
/// action workflow.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StockStatus {
    Critical,
    Warning,
    Healthy,
}

impl StockStatus {
    pub const ALL: [StockStatus; 3] =
        [StockStatus::Critical, StockStatus::Warning, StockStatus::Healthy];

    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Critical => "Critical",
            StockStatus::Warning => "Warning",
            StockStatus::Healthy => "Healthy",
        }
    }

    /// Display badge. Always derived from the status, never stored on its own.
    pub fn badge(&self) -> &'static str {
        match self {
            StockStatus::Critical => "🔴 Critical",
            StockStatus::Warning => "🟡 Warning",
            StockStatus::Healthy => "🟢 Healthy",
        }
    }

    /// Critical or Warning.
    pub fn is_at_risk(&self) -> bool {
        matches!(self, StockStatus::Critical | StockStatus::Warning)
    }
}

impl core::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for StockStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Ok(StockStatus::Critical),
            "warning" => Ok(StockStatus::Warning),
            "healthy" => Ok(StockStatus::Healthy),
            other => Err(DomainError::validation(format!(
                "unknown stock status '{other}' (expected Critical, Warning or Healthy)"
            ))),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemPriority {
    #[serde(rename = "Life-saving")]
    LifeSaving,
    Essential,
}

impl ItemPriority {
    pub fn for_item(item: &str) -> Self {
        if LIFE_SAVING_ITEMS.contains(&item) {
            ItemPriority::LifeSaving
        } else {
            ItemPriority::Essential
        }
    }

    pub fn badge(&self) -> &'static str {
        match self {
            ItemPriority::LifeSaving => "🔴 Life-saving",
            ItemPriority::Essential => "🟢 Essential",
        }
    }
}

/// Identity of a row within one table snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowKey {
    pub location: String,
    pub item: String,
}

impl RowKey {
    pub fn new(location: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            item: item.into(),
        }
    }
}

impl core::fmt::Display for RowKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} → {}", self.location, self.item)
    }
}

/// One (location, item) stock observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub location: String,
    pub item: String,
    pub closing_stock: f64,
    pub avg_daily_demand: f64,
    pub lead_time_days: u32,
    pub days_to_stockout: f64,
    pub stock_status: StockStatus,
}

impl InventoryRow {
    pub fn key(&self) -> RowKey {
        RowKey::new(self.location.clone(), self.item.clone())
    }

    pub fn priority(&self) -> ItemPriority {
        ItemPriority::for_item(&self.item)
    }

    /// Check identifiers and the non-negativity constraints rows must satisfy
    /// before they enter a snapshot.
    pub fn validate(&self) -> DomainResult<()> {
        if self.location.trim().is_empty() {
            return Err(DomainError::validation("location cannot be empty"));
        }
        if self.item.trim().is_empty() {
            return Err(DomainError::validation("item cannot be empty"));
        }
        for (field, value) in [
            ("closing_stock", self.closing_stock),
            ("avg_daily_demand", self.avg_daily_demand),
            ("days_to_stockout", self.days_to_stockout),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DomainError::validation(format!(
                    "{field} must be a finite non-negative number for {} (got {value})",
                    self.key()
                )));
            }
        }
        Ok(())
    }
}
