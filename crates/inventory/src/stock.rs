use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use carestock_core::{Aggregate, AggregateRoot, DomainError, Event};

use crate::row::{InventoryRow, RowKey, StockStatus};
use crate::status::{classify_days_to_stockout, days_to_stockout};

/// What was done about an at-risk row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    #[serde(rename = "Purchase order raised")]
    PurchaseOrderRaised,
    #[serde(rename = "Transferred from another location")]
    TransferredFromAnotherLocation,
    #[serde(rename = "Delivered to location")]
    DeliveredToLocation,
    #[serde(rename = "NGO / partner support requested")]
    PartnerSupportRequested,
    Other,
}

impl ActionType {
    pub const ALL: [ActionType; 5] = [
        ActionType::PurchaseOrderRaised,
        ActionType::TransferredFromAnotherLocation,
        ActionType::DeliveredToLocation,
        ActionType::PartnerSupportRequested,
        ActionType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::PurchaseOrderRaised => "Purchase order raised",
            ActionType::TransferredFromAnotherLocation => "Transferred from another location",
            ActionType::DeliveredToLocation => "Delivered to location",
            ActionType::PartnerSupportRequested => "NGO / partner support requested",
            ActionType::Other => "Other",
        }
    }
}

impl core::fmt::Display for ActionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate root: the stock position of one (location, item) row.
///
/// Closing stock, days-to-stockout and status only change together, through
/// a single applied event.
#[derive(Debug, Clone, PartialEq)]
pub struct StockPosition {
    key: RowKey,
    closing_stock: f64,
    avg_daily_demand: f64,
    days_to_stockout: f64,
    status: StockStatus,
    version: u64,
}

impl StockPosition {
    pub fn from_row(row: &InventoryRow) -> Self {
        Self {
            key: row.key(),
            closing_stock: row.closing_stock,
            avg_daily_demand: row.avg_daily_demand,
            days_to_stockout: row.days_to_stockout,
            status: row.stock_status,
            version: 0,
        }
    }

    pub fn closing_stock(&self) -> f64 {
        self.closing_stock
    }

    pub fn days_to_stockout(&self) -> f64 {
        self.days_to_stockout
    }

    pub fn status(&self) -> StockStatus {
        self.status
    }

    /// Copy the position back onto a row of the snapshot.
    pub fn write_to(&self, row: &mut InventoryRow) {
        row.closing_stock = self.closing_stock;
        row.days_to_stockout = self.days_to_stockout;
        row.stock_status = self.status;
    }
}

impl AggregateRoot for StockPosition {
    type Id = RowKey;

    fn id(&self) -> &Self::Id {
        &self.key
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: ApplyStockAction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyStockAction {
    pub key: RowKey,
    pub action_type: ActionType,
    /// Units added (positive) or removed (negative) by the action.
    pub quantity_delta: f64,
    pub notes: String,
    pub actor: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StockCommand {
    ApplyAction(ApplyStockAction),
}

/// Event: StockActionApplied. Carries the full post-action position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockActionApplied {
    pub key: RowKey,
    pub action_type: ActionType,
    pub quantity_delta: f64,
    pub notes: String,
    pub actor: String,
    pub closing_stock: f64,
    pub days_to_stockout: f64,
    pub stock_status: StockStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StockEvent {
    ActionApplied(StockActionApplied),
}

impl Event for StockEvent {
    fn event_type(&self) -> &'static str {
        match self {
            StockEvent::ActionApplied(_) => "inventory.stock.action_applied",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            StockEvent::ActionApplied(e) => e.occurred_at,
        }
    }
}

impl Aggregate for StockPosition {
    type Command = StockCommand;
    type Event = StockEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            StockEvent::ActionApplied(e) => {
                self.closing_stock = e.closing_stock;
                self.days_to_stockout = e.days_to_stockout;
                self.status = e.stock_status;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            StockCommand::ApplyAction(cmd) => self.handle_apply(cmd),
        }
    }
}

impl StockPosition {
    fn handle_apply(&self, cmd: &ApplyStockAction) -> Result<Vec<StockEvent>, DomainError> {
        if cmd.key != self.key {
            return Err(DomainError::invariant("row key mismatch"));
        }

        let actor = cmd.actor.trim();
        if actor.is_empty() {
            return Err(DomainError::validation(
                "please enter your name or team before saving",
            ));
        }

        if !cmd.quantity_delta.is_finite() {
            return Err(DomainError::validation("quantity delta must be a finite number"));
        }

        let closing_stock = self.closing_stock + cmd.quantity_delta;
        if closing_stock < 0.0 {
            return Err(DomainError::invariant("stock cannot go negative"));
        }

        let days = days_to_stockout(closing_stock, self.avg_daily_demand);

        Ok(vec![StockEvent::ActionApplied(StockActionApplied {
            key: cmd.key.clone(),
            action_type: cmd.action_type,
            quantity_delta: cmd.quantity_delta,
            notes: cmd.notes.trim().to_string(),
            actor: actor.to_string(),
            closing_stock,
            days_to_stockout: days,
            stock_status: classify_days_to_stockout(days),
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oxygen_row() -> InventoryRow {
        InventoryRow {
            location: "ICU".to_string(),
            item: "Oxygen".to_string(),
            closing_stock: 10.0,
            avg_daily_demand: 3.0,
            lead_time_days: 4,
            days_to_stockout: 3.3,
            stock_status: StockStatus::Critical,
        }
    }

    fn command(delta: f64, actor: &str) -> StockCommand {
        StockCommand::ApplyAction(ApplyStockAction {
            key: RowKey::new("ICU", "Oxygen"),
            action_type: ActionType::DeliveredToLocation,
            quantity_delta: delta,
            notes: String::new(),
            actor: actor.to_string(),
            occurred_at: Utc::now(),
        })
    }

    #[test]
    fn delivery_reclassifies_at_the_critical_boundary() {
        let mut position = StockPosition::from_row(&oxygen_row());
        let events = position.handle(&command(5.0, "District Hospital Supply Team")).unwrap();
        assert_eq!(events.len(), 1);
        for e in &events {
            position.apply(e);
        }

        assert_eq!(position.closing_stock(), 15.0);
        assert_eq!(position.days_to_stockout(), 5.0);
        assert_eq!(position.status(), StockStatus::Critical);
        assert_eq!(position.version(), 1);
    }

    #[test]
    fn larger_delivery_moves_to_warning() {
        let mut position = StockPosition::from_row(&oxygen_row());
        let events = position.handle(&command(8.0, "Ward team")).unwrap();
        position.apply(&events[0]);
        assert_eq!(position.days_to_stockout(), 6.0);
        assert_eq!(position.status(), StockStatus::Warning);
    }

    #[test]
    fn blank_actor_is_rejected() {
        let position = StockPosition::from_row(&oxygen_row());
        let err = position.handle(&command(5.0, "   ")).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for blank actor"),
        }
    }

    #[test]
    fn stock_cannot_go_negative() {
        let position = StockPosition::from_row(&oxygen_row());
        let err = position.handle(&command(-11.0, "Pharmacy")).unwrap_err();
        assert_eq!(err, DomainError::invariant("stock cannot go negative"));
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let position = StockPosition::from_row(&oxygen_row());
        let before = position.clone();
        let _ = position.handle(&command(5.0, "Pharmacy")).unwrap();
        assert_eq!(position, before);
    }

    #[test]
    fn write_to_updates_stock_status_and_days_together() {
        let mut row = oxygen_row();
        let mut position = StockPosition::from_row(&row);
        let events = position.handle(&command(50.0, "Pharmacy")).unwrap();
        position.apply(&events[0]);
        position.write_to(&mut row);

        assert_eq!(row.closing_stock, 60.0);
        assert_eq!(row.days_to_stockout, 20.0);
        assert_eq!(row.stock_status, StockStatus::Healthy);
    }

    #[test]
    fn event_type_is_stable() {
        let position = StockPosition::from_row(&oxygen_row());
        let events = position.handle(&command(1.0, "Pharmacy")).unwrap();
        assert_eq!(events[0].event_type(), "inventory.stock.action_applied");
    }
}
