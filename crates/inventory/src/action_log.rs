use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use carestock_core::ActionId;

use crate::stock::{ActionType, StockActionApplied};

/// One recorded action (audit trail entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub id: ActionId,
    pub timestamp: DateTime<Utc>,
    pub location: String,
    pub item: String,
    pub action_type: ActionType,
    pub quantity_delta: f64,
    pub notes: String,
    pub actor: String,
}

impl ActionLogEntry {
    pub fn from_event(id: ActionId, event: &StockActionApplied) -> Self {
        Self {
            id,
            timestamp: event.occurred_at,
            location: event.key.location.clone(),
            item: event.key.item.clone(),
            action_type: event.action_type,
            quantity_delta: event.quantity_delta,
            notes: event.notes.clone(),
            actor: event.actor.clone(),
        }
    }
}

/// In-session action log.
///
/// Append-only: there is no API to edit or remove an entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionLog {
    entries: Vec<ActionLogEntry>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: ActionLogEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[ActionLogEntry] {
        &self.entries
    }

    /// Up to `limit` entries, most recent first.
    pub fn recent(&self, limit: usize) -> Vec<ActionLogEntry> {
        self.entries.iter().rev().take(limit).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(actor: &str) -> ActionLogEntry {
        ActionLogEntry {
            id: ActionId::new(),
            timestamp: Utc::now(),
            location: "Ward B".to_string(),
            item: "Saline".to_string(),
            action_type: ActionType::PurchaseOrderRaised,
            quantity_delta: 0.0,
            notes: String::new(),
            actor: actor.to_string(),
        }
    }

    #[test]
    fn recent_is_most_recent_first() {
        let mut log = ActionLog::new();
        log.append(entry("first"));
        log.append(entry("second"));
        log.append(entry("third"));

        let recent: Vec<String> = log.recent(2).into_iter().map(|e| e.actor).collect();
        assert_eq!(recent, vec!["third", "second"]);
        assert_eq!(log.entries()[0].actor, "first");
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn recent_with_large_limit_returns_everything() {
        let mut log = ActionLog::new();
        log.append(entry("only"));
        assert_eq!(log.recent(20).len(), 1);
        assert!(ActionLog::new().recent(5).is_empty());
    }
}
