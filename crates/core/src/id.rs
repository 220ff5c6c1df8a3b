//! Strongly-typed identifiers used across the domain.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of one action-log entry.
///
/// UUIDv7 keeps identifiers time-ordered, so sorting by id matches insertion
/// order within a session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(Uuid);

impl ActionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ActionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_v7_and_distinct() {
        let first = ActionId::new();
        let second = ActionId::new();
        assert_eq!(first.0.get_version_num(), 7);
        assert_ne!(first, second);
    }

    #[test]
    fn displays_as_hyphenated_uuid() {
        let id = ActionId::new();
        assert_eq!(id.to_string(), id.0.hyphenated().to_string());
    }
}
