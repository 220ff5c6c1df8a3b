//! Action log sinks.
//!
//! The session keeps its own log; a sink is where recorded actions are
//! mirrored so they outlive the process (or, in tests, can be inspected).

pub mod json_lines;

use std::sync::{Arc, RwLock};

use thiserror::Error;

use carestock_inventory::ActionLogEntry;

pub use json_lines::JsonLinesActionSink;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("action log IO failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("action log entry could not be encoded: {0}")]
    Json(#[from] serde_json::Error),

    #[error("action log lock poisoned")]
    Poisoned,
}

/// Append-only store of recorded actions.
pub trait ActionSink: Send + Sync {
    fn append(&self, entry: &ActionLogEntry) -> Result<(), SinkError>;

    /// Up to `limit` entries, most recent first.
    fn recent(&self, limit: usize) -> Result<Vec<ActionLogEntry>, SinkError>;
}

impl<S> ActionSink for Arc<S>
where
    S: ActionSink + ?Sized,
{
    fn append(&self, entry: &ActionLogEntry) -> Result<(), SinkError> {
        (**self).append(entry)
    }

    fn recent(&self, limit: usize) -> Result<Vec<ActionLogEntry>, SinkError> {
        (**self).recent(limit)
    }
}

/// In-memory sink for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryActionSink {
    entries: RwLock<Vec<ActionLogEntry>>,
}

impl InMemoryActionSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ActionSink for InMemoryActionSink {
    fn append(&self, entry: &ActionLogEntry) -> Result<(), SinkError> {
        let mut entries = self.entries.write().map_err(|_| SinkError::Poisoned)?;
        entries.push(entry.clone());
        Ok(())
    }

    fn recent(&self, limit: usize) -> Result<Vec<ActionLogEntry>, SinkError> {
        let entries = self.entries.read().map_err(|_| SinkError::Poisoned)?;
        Ok(entries.iter().rev().take(limit).cloned().collect())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::entry;
    use super::*;

    #[test]
    fn in_memory_sink_returns_most_recent_first() {
        let sink = InMemoryActionSink::new();
        assert!(sink.is_empty());

        sink.append(&entry("a", 1.0)).unwrap();
        sink.append(&entry("b", 2.0)).unwrap();
        sink.append(&entry("c", 3.0)).unwrap();

        let actors: Vec<String> = sink.recent(2).unwrap().into_iter().map(|e| e.actor).collect();
        assert_eq!(actors, vec!["c", "b"]);
        assert_eq!(sink.len(), 3);
    }

    #[test]
    fn shared_sink_sees_the_same_entries() {
        let sink = Arc::new(InMemoryActionSink::new());
        let handle: Arc<dyn ActionSink> = sink.clone();
        handle.append(&entry("shared", 0.0)).unwrap();
        assert_eq!(sink.recent(10).unwrap().len(), 1);
    }
}
