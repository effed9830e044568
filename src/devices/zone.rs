// MIT License - Copyright (c) 2026 Peter Wright
// Zone presentation

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{DEVICE_CLASS_DOOR, DOMAIN, STATE_OFF, STATE_ON};
use crate::devices::DeviceInfo;
use crate::publish::{StatePublisher, ZoneState, ZoneStateAttributes};
use crate::restore::RestoreStore;
use crate::time::Clock;
use crate::tracker::{ZoneObserver, ZoneTracker};

/// Transition timestamps of a zone. Each is absent until first recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneAttributes {
    #[serde(default)]
    pub last_open: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub last_close: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub last_toggle: Option<DateTime<FixedOffset>>,
}

/// What a zone currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneDisplay {
    pub is_open: bool,
    pub attributes: ZoneAttributes,
}

impl ZoneDisplay {
    /// Move to `is_open` at `now`. Returns false for a self-transition.
    ///
    /// A transition stamps `last_toggle` and exactly one of `last_open` or
    /// `last_close`; the other keeps its previous value.
    pub fn transition(&mut self, is_open: bool, now: DateTime<FixedOffset>) -> bool {
        if is_open == self.is_open {
            return false;
        }
        self.attributes.last_toggle = Some(now);
        if is_open {
            self.attributes.last_open = Some(now);
        } else {
            self.attributes.last_close = Some(now);
        }
        self.is_open = is_open;
        true
    }
}

/// One named zone presented as a door sensor.
///
/// Keeps its own displayed state, fed by the shared tracker. Redundant
/// updates (tracker value equal to what is shown) are not re-published.
pub struct ZoneSensor {
    zone: u32,
    name: String,
    unique_id: String,
    entity_id: String,
    device: DeviceInfo,
    clock: Arc<dyn Clock>,
    publisher: Arc<dyn StatePublisher>,
    display: Mutex<ZoneDisplay>,
}

/// Entity id of `zone` on the entry listening on `port`.
pub fn zone_entity_id(port: u16, zone: u32) -> String {
    format!("binary_sensor.{DOMAIN}_{port}_zone{zone}")
}

impl ZoneSensor {
    pub fn new(
        entry_id: &str,
        port: u16,
        zone: u32,
        name: impl Into<String>,
        clock: Arc<dyn Clock>,
        publisher: Arc<dyn StatePublisher>,
    ) -> Self {
        Self {
            zone,
            name: name.into(),
            unique_id: format!("{entry_id}_{zone}"),
            entity_id: zone_entity_id(port, zone),
            device: DeviceInfo::for_entry(entry_id),
            clock,
            publisher,
            display: Mutex::new(ZoneDisplay::default()),
        }
    }

    pub fn zone(&self) -> u32 {
        self.zone
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.device
    }

    pub fn is_open(&self) -> bool {
        self.lock_display().is_open
    }

    pub fn attributes(&self) -> ZoneAttributes {
        self.lock_display().attributes.clone()
    }

    /// Current rendered state.
    pub fn state(&self) -> ZoneState {
        let display = self.lock_display();
        self.render(&display)
    }

    /// Restore the last displayed state, then publish the initial state.
    ///
    /// Restored attributes are copied as stored; keys the record lacks stay
    /// absent. Without a record the zone starts closed with no timestamps.
    pub fn attach(&self, restore: &dyn RestoreStore) {
        let state = {
            let mut display = self.lock_display();
            if let Some(last) = restore.last_state(&self.entity_id) {
                debug!("Restoring {} as {}", self.entity_id, last.state);
                display.is_open = last.is_on();
                display.attributes = last.attributes;
            }
            self.render(&display)
        };
        self.publisher.publish(&state);
    }

    /// React to a tracker update. Returns true if a new state was published.
    pub fn handle_update(&self, tracker: &ZoneTracker) -> bool {
        let Some(is_open) = tracker.get(self.zone) else {
            return false;
        };
        let state = {
            let mut display = self.lock_display();
            if !display.transition(is_open, self.clock.now()) {
                return false;
            }
            debug!("Zone {} ({}) -> {}", self.zone, self.name, if is_open { STATE_ON } else { STATE_OFF });
            self.render(&display)
        };
        self.publisher.publish(&state);
        true
    }

    fn render(&self, display: &ZoneDisplay) -> ZoneState {
        ZoneState {
            entity_id: self.entity_id.clone(),
            unique_id: self.unique_id.clone(),
            name: self.name.clone(),
            device_class: DEVICE_CLASS_DOOR.to_string(),
            state: if display.is_open { STATE_ON } else { STATE_OFF }.to_string(),
            attributes: ZoneStateAttributes::new(self.zone, &display.attributes),
        }
    }

    fn lock_display(&self) -> MutexGuard<'_, ZoneDisplay> {
        match self.display.lock() {
            Ok(display) => display,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl ZoneObserver for ZoneSensor {
    fn zones_updated(&self, tracker: &ZoneTracker) {
        self.handle_update(tracker);
    }
}

impl std::fmt::Debug for ZoneSensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoneSensor")
            .field("zone", &self.zone)
            .field("name", &self.name)
            .field("entity_id", &self.entity_id)
            .field("display", &*self.lock_display())
            .finish()
    }
}
