//! Explicit per-session state.
//!
//! Everything a dashboard session can change lives here, with one mutation
//! entry point per field. Initial values are those of [`SessionState::default`].

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use carestock_core::{ActionId, Aggregate, DomainError, DomainResult};

use crate::action_log::{ActionLog, ActionLogEntry};
use crate::row::{InventoryRow, RowKey};
use crate::stock::{ActionType, ApplyStockAction, StockCommand, StockEvent, StockPosition};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertLevel {
    Critical,
    Warning,
    Overstock,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecipientGroup {
    #[serde(rename = "Hospital procurement team")]
    ProcurementTeam,
    #[serde(rename = "Warehouse manager")]
    WarehouseManager,
    #[serde(rename = "District health office")]
    DistrictHealthOffice,
    #[serde(rename = "NGO / partner organization")]
    PartnerOrganization,
}

/// Notification channel and routing preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub email_alert: bool,
    pub email: String,
    pub sms_alert: bool,
    pub phone: String,
    pub alert_levels: BTreeSet<AlertLevel>,
    pub recipients: BTreeSet<RecipientGroup>,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_alert: false,
            email: String::new(),
            sms_alert: false,
            phone: String::new(),
            alert_levels: [AlertLevel::Critical, AlertLevel::Warning].into_iter().collect(),
            recipients: [RecipientGroup::ProcurementTeam].into_iter().collect(),
        }
    }
}

impl NotificationSettings {
    pub fn validate(&self) -> DomainResult<()> {
        if self.email_alert && !self.email.trim().contains('@') {
            return Err(DomainError::validation(
                "email alerts are enabled but no valid email address is set",
            ));
        }
        if self.sms_alert && self.phone.trim().is_empty() {
            return Err(DomainError::validation(
                "SMS alerts are enabled but no mobile number is set",
            ));
        }
        Ok(())
    }
}

/// Display names for location codes; unmapped codes display as themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationNames(BTreeMap<String, String>);

impl LocationNames {
    pub fn display_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.0.get(code).map(String::as_str).unwrap_or(code)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A user-entered action against one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordActionRequest {
    pub location: String,
    pub item: String,
    pub action_type: ActionType,
    #[serde(default)]
    pub quantity_delta: f64,
    #[serde(default)]
    pub notes: String,
    pub actor: String,
}

/// Result of an applied action: the log entry and the updated row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionReceipt {
    pub entry: ActionLogEntry,
    pub row: InventoryRow,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    notifications: NotificationSettings,
    location_names: LocationNames,
    action_log: ActionLog,
    rows: Vec<InventoryRow>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<InventoryRow>) -> DomainResult<Self> {
        let mut session = Self::new();
        session.replace_rows(rows)?;
        Ok(session)
    }

    pub fn notifications(&self) -> &NotificationSettings {
        &self.notifications
    }

    pub fn location_names(&self) -> &LocationNames {
        &self.location_names
    }

    pub fn action_log(&self) -> &ActionLog {
        &self.action_log
    }

    pub fn rows(&self) -> &[InventoryRow] {
        &self.rows
    }

    /// On error the previous settings are kept.
    pub fn update_notifications(&mut self, settings: NotificationSettings) -> DomainResult<()> {
        settings.validate()?;
        self.notifications = settings;
        tracing::info!("notification preferences updated");
        Ok(())
    }

    pub fn rename_location(&mut self, code: &str, display_name: &str) -> DomainResult<()> {
        let (code, display_name) = (code.trim(), display_name.trim());
        if code.is_empty() || display_name.is_empty() {
            return Err(DomainError::validation(
                "location code and display name cannot be empty",
            ));
        }
        self.location_names.0.insert(code.to_string(), display_name.to_string());
        Ok(())
    }

    /// Install a new working snapshot. Rows are validated and must be unique
    /// per (location, item); on error the current snapshot is kept.
    pub fn replace_rows(&mut self, rows: Vec<InventoryRow>) -> DomainResult<()> {
        let mut seen = HashSet::with_capacity(rows.len());
        for row in &rows {
            row.validate()?;
            if !seen.insert(row.key()) {
                return Err(DomainError::conflict(format!("duplicate row for {}", row.key())));
            }
        }
        self.rows = rows;
        Ok(())
    }

    /// Apply an action to one row and log it.
    ///
    /// The row's stock, days-to-stockout and status change together, and
    /// exactly one log entry is appended. A rejected action changes nothing.
    pub fn record_action(
        &mut self,
        request: RecordActionRequest,
        now: DateTime<Utc>,
    ) -> DomainResult<ActionReceipt> {
        let key = RowKey::new(request.location, request.item);
        let index = self
            .rows
            .iter()
            .position(|r| r.location == key.location && r.item == key.item)
            .ok_or_else(|| DomainError::not_found(format!("no row for {key}")))?;

        let mut position = StockPosition::from_row(&self.rows[index]);
        let events = position.handle(&StockCommand::ApplyAction(ApplyStockAction {
            key,
            action_type: request.action_type,
            quantity_delta: request.quantity_delta,
            notes: request.notes,
            actor: request.actor,
            occurred_at: now,
        }))?;

        let mut last_entry = None;
        for event in &events {
            position.apply(event);
            let StockEvent::ActionApplied(applied) = event;
            let entry = ActionLogEntry::from_event(ActionId::new(), applied);
            self.action_log.append(entry.clone());
            last_entry = Some(entry);
        }

        let row = &mut self.rows[index];
        position.write_to(row);

        let entry = last_entry.ok_or_else(|| DomainError::invariant("action produced no events"))?;
        tracing::info!(
            location = %entry.location,
            item = %entry.item,
            action = %entry.action_type,
            status = %row.stock_status,
            "stock action recorded"
        );

        Ok(ActionReceipt {
            entry,
            row: row.clone(),
        })
    }
}
