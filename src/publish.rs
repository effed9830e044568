// MIT License - Copyright (c) 2026 Peter Wright
// Zone state publishing

use std::io::Write;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::devices::zone::ZoneAttributes;
use crate::restore::{MemoryRestoreStore, RestoredState};

/// Rendered state of one zone, as handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneState {
    pub entity_id: String,
    pub unique_id: String,
    pub name: String,
    pub device_class: String,
    /// `"on"` (open) or `"off"` (closed)
    pub state: String,
    pub attributes: ZoneStateAttributes,
}

/// Attributes published with every zone state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneStateAttributes {
    pub last_open: Option<DateTime<FixedOffset>>,
    pub last_close: Option<DateTime<FixedOffset>>,
    pub last_toggle: Option<DateTime<FixedOffset>>,
    pub zone: u32,
}

impl ZoneStateAttributes {
    pub fn new(zone: u32, timestamps: &ZoneAttributes) -> Self {
        Self {
            last_open: timestamps.last_open,
            last_close: timestamps.last_close,
            last_toggle: timestamps.last_toggle,
            zone,
        }
    }

    pub fn timestamps(&self) -> ZoneAttributes {
        ZoneAttributes {
            last_open: self.last_open,
            last_close: self.last_close,
            last_toggle: self.last_toggle,
        }
    }
}

/// Receives every rendered zone state.
pub trait StatePublisher: Send + Sync {
    fn publish(&self, state: &ZoneState);
}

/// Logs each rendered state.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPublisher;

impl StatePublisher for LogPublisher {
    fn publish(&self, state: &ZoneState) {
        info!(
            "Zone {} ({}) is {}",
            state.attributes.zone, state.name, state.state
        );
    }
}

/// Writes each rendered state as one JSON line.
pub struct JsonLinesPublisher<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesPublisher<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> StatePublisher for JsonLinesPublisher<W> {
    fn publish(&self, state: &ZoneState) {
        let json = match serde_json::to_string(state) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize zone state for {}: {e}", state.entity_id);
                return;
            }
        };
        let mut writer = match self.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(writer, "{json}").and_then(|()| writer.flush()) {
            error!("Failed to write zone state for {}: {e}", state.entity_id);
        }
    }
}

/// Remembers each rendered state so a reload restores it.
impl StatePublisher for MemoryRestoreStore {
    fn publish(&self, state: &ZoneState) {
        self.save(
            state.entity_id.clone(),
            RestoredState::new(state.state.clone(), state.attributes.timestamps()),
        );
    }
}

/// Forwards each state to several publishers in order.
#[derive(Default)]
pub struct FanoutPublisher {
    publishers: Vec<Arc<dyn StatePublisher>>,
}

impl FanoutPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, publisher: Arc<dyn StatePublisher>) -> Self {
        self.publishers.push(publisher);
        self
    }
}

impl StatePublisher for FanoutPublisher {
    fn publish(&self, state: &ZoneState) {
        for publisher in &self.publishers {
            publisher.publish(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restore::RestoreStore;

    fn sample_state() -> ZoneState {
        let opened = DateTime::parse_from_rfc3339("2024-01-01T00:00:00-05:00").unwrap();
        ZoneState {
            entity_id: "binary_sensor.pima_force_10001_zone6".to_string(),
            unique_id: "entry_6".to_string(),
            name: "Basement".to_string(),
            device_class: "door".to_string(),
            state: "on".to_string(),
            attributes: ZoneStateAttributes {
                last_open: Some(opened),
                last_close: None,
                last_toggle: Some(opened),
                zone: 6,
            },
        }
    }

    #[test]
    fn test_json_lines_output() {
        let publisher = JsonLinesPublisher::new(Vec::new());
        publisher.publish(&sample_state());
        publisher.publish(&sample_state());

        let output = String::from_utf8(publisher.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["state"], "on");
        assert_eq!(value["attributes"]["zone"], 6);
        assert!(value["attributes"]["last_close"].is_null());
        let parsed: ZoneState = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed, sample_state());
    }

    #[test]
    fn test_restore_store_remembers_published_state() {
        let store = Arc::new(MemoryRestoreStore::new());
        let fanout = FanoutPublisher::new().with(Arc::new(LogPublisher)).with(store.clone());
        fanout.publish(&sample_state());

        let restored = store.last_state("binary_sensor.pima_force_10001_zone6").unwrap();
        assert!(restored.is_on());
        assert_eq!(restored.attributes, sample_state().attributes.timestamps());
    }
}
