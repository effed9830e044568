// MIT License - Copyright (c) 2026 Peter Wright
// Restore-on-start records

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::constants::STATE_ON;
use crate::devices::zone::ZoneAttributes;

/// Last displayed state of a zone from a previous run.
///
/// Attribute keys missing from the stored record deserialize as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoredState {
    /// `"on"` or `"off"`
    pub state: String,
    #[serde(default)]
    pub attributes: ZoneAttributes,
}

impl RestoredState {
    pub fn new(state: impl Into<String>, attributes: ZoneAttributes) -> Self {
        Self {
            state: state.into(),
            attributes,
        }
    }

    pub fn is_on(&self) -> bool {
        self.state == STATE_ON
    }
}

/// Supplies the last displayed state of a zone entity, keyed by entity id.
pub trait RestoreStore: Send + Sync {
    fn last_state(&self, entity_id: &str) -> Option<RestoredState>;
}

/// Restore store kept in memory for the life of the process.
///
/// Zones save their state here on every publish, so reloading an entry
/// within one process restores what was last shown.
#[derive(Debug, Default)]
pub struct MemoryRestoreStore {
    states: RwLock<HashMap<String, RestoredState>>,
}

impl MemoryRestoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&self, entity_id: impl Into<String>, state: RestoredState) {
        let mut states = match self.states.write() {
            Ok(states) => states,
            Err(poisoned) => poisoned.into_inner(),
        };
        states.insert(entity_id.into(), state);
    }
}

impl RestoreStore for MemoryRestoreStore {
    fn last_state(&self, entity_id: &str) -> Option<RestoredState> {
        let states = match self.states.read() {
            Ok(states) => states,
            Err(poisoned) => poisoned.into_inner(),
        };
        states.get(entity_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restored_state_partial_attributes() {
        let restored: RestoredState = serde_json::from_str(
            r#"{"state": "on", "attributes": {"last_open": "2024-01-01T01:00:00+00:00"}}"#,
        )
        .unwrap();
        assert!(restored.is_on());
        assert_eq!(
            restored.attributes.last_open.map(|t| t.to_rfc3339()),
            Some("2024-01-01T01:00:00+00:00".to_string())
        );
        assert_eq!(restored.attributes.last_close, None);
        assert_eq!(restored.attributes.last_toggle, None);
    }

    #[test]
    fn test_restored_state_without_attributes() {
        let restored: RestoredState = serde_json::from_str(r#"{"state": "off"}"#).unwrap();
        assert!(!restored.is_on());
        assert_eq!(restored.attributes, ZoneAttributes::default());
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryRestoreStore::new();
        assert_eq!(store.last_state("binary_sensor.pima_force_10001_zone1"), None);
        store.save(
            "binary_sensor.pima_force_10001_zone1",
            RestoredState::new("on", ZoneAttributes::default()),
        );
        assert!(store.last_state("binary_sensor.pima_force_10001_zone1").unwrap().is_on());
    }
}
