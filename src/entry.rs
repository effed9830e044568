// MIT License - Copyright (c) 2026 Peter Wright
// Config entries and their runtime data

use std::sync::Arc;

use crate::config::{EntryOptions, ListenerSettings, OptionsUpdate, entry_title};
use crate::coordinator::Coordinator;
use crate::devices::zone::ZoneSensor;
use crate::transport::SiaListener;

/// One configured panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub entry_id: String,
    pub title: String,
    pub options: EntryOptions,
}

impl ConfigEntry {
    /// New entry titled after its listening port.
    pub fn new(entry_id: impl Into<String>, options: EntryOptions) -> Self {
        Self {
            entry_id: entry_id.into(),
            title: entry_title(options.port),
            options,
        }
    }

    pub fn listener_settings(&self) -> ListenerSettings {
        ListenerSettings::from_options(&self.options)
    }

    /// Merge an options update. A port change also retitles the entry.
    /// Returns true if anything changed.
    pub fn apply_update(&mut self, update: OptionsUpdate) -> bool {
        let options = self.options.merged(update);
        if options.port != self.options.port {
            self.title = entry_title(options.port);
        }
        let changed = options != self.options;
        self.options = options;
        changed
    }
}

/// Runtime state of a loaded entry.
pub struct LoadedEntry<L: SiaListener> {
    pub coordinator: Coordinator<L>,
    pub sensors: Vec<Arc<ZoneSensor>>,
}

impl<L: SiaListener> LoadedEntry<L> {
    pub fn sensor(&self, entity_id: &str) -> Option<&Arc<ZoneSensor>> {
        self.sensors.iter().find(|sensor| sensor.entity_id() == entity_id)
    }
}
