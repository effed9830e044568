// MIT License - Copyright (c) 2026 Peter Wright
// Config entry registry and operator actions

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{ListenerSettings, OptionsUpdate, ZoneConfig};
use crate::coordinator::Coordinator;
use crate::devices::zone::ZoneSensor;
use crate::entry::{ConfigEntry, LoadedEntry};
use crate::error::{PimaError, Result};
use crate::publish::StatePublisher;
use crate::restore::RestoreStore;
use crate::time::Clock;
use crate::transport::SiaListener;

/// Builds the listener for an entry being set up.
pub type ListenerFactory<L> = Box<dyn Fn(&ListenerSettings) -> L + Send + Sync>;

/// All configured panels, loaded or not.
///
/// Every loaded entry owns its own coordinator and tracker; nothing is
/// shared between entries except the collaborators handed to `new`.
pub struct EntryRegistry<L: SiaListener> {
    entries: BTreeMap<String, ConfigEntry>,
    loaded: HashMap<String, LoadedEntry<L>>,
    listener_factory: ListenerFactory<L>,
    restore: Arc<dyn RestoreStore>,
    publisher: Arc<dyn StatePublisher>,
    clock: Arc<dyn Clock>,
}

impl<L: SiaListener> EntryRegistry<L> {
    pub fn new(
        listener_factory: ListenerFactory<L>,
        restore: Arc<dyn RestoreStore>,
        publisher: Arc<dyn StatePublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            entries: BTreeMap::new(),
            loaded: HashMap::new(),
            listener_factory,
            restore,
            publisher,
            clock,
        }
    }

    /// Register an entry without loading it.
    pub fn add(&mut self, entry: ConfigEntry) -> Result<()> {
        entry.options.validate()?;
        if self.entries.contains_key(&entry.entry_id) {
            return Err(PimaError::DuplicateEntry { entry_id: entry.entry_id });
        }
        self.entries.insert(entry.entry_id.clone(), entry);
        Ok(())
    }

    pub fn entry(&self, entry_id: &str) -> Result<&ConfigEntry> {
        self.entries.get(entry_id).ok_or_else(|| unknown_entry(entry_id))
    }

    pub fn entries(&self) -> impl Iterator<Item = &ConfigEntry> {
        self.entries.values()
    }

    pub fn is_loaded(&self, entry_id: &str) -> bool {
        self.loaded.contains_key(entry_id)
    }

    pub fn coordinator(&self, entry_id: &str) -> Option<&Coordinator<L>> {
        self.loaded.get(entry_id).map(|loaded| &loaded.coordinator)
    }

    /// Zone entities of a loaded entry, in zone order.
    pub fn sensors(&self, entry_id: &str) -> &[Arc<ZoneSensor>] {
        self.loaded
            .get(entry_id)
            .map(|loaded| loaded.sensors.as_slice())
            .unwrap_or_default()
    }

    /// Load an entry: fresh tracker, one entity per named zone, listener started.
    pub async fn setup(&mut self, entry_id: &str) -> Result<()> {
        if self.loaded.contains_key(entry_id) {
            return Err(PimaError::AlreadyLoaded { entry_id: entry_id.to_string() });
        }
        let entry = self.entry(entry_id)?.clone();
        entry.options.validate()?;

        let listener = (self.listener_factory)(&entry.listener_settings());
        let mut coordinator = Coordinator::new(entry.entry_id.clone(), listener);

        let sensors: Vec<Arc<ZoneSensor>> = entry
            .options
            .zone_names()
            .into_iter()
            .map(|(zone, name)| {
                Arc::new(ZoneSensor::new(
                    &entry.entry_id,
                    entry.options.port,
                    zone,
                    name,
                    Arc::clone(&self.clock),
                    Arc::clone(&self.publisher),
                ))
            })
            .collect();
        for sensor in &sensors {
            sensor.attach(self.restore.as_ref());
            coordinator.subscribe(sensor.clone());
        }

        if let Err(e) = coordinator.start().await {
            if let Err(stop_err) = coordinator.stop().await {
                warn!("Failed to release listener for {}: {}", entry.entry_id, stop_err);
            }
            return Err(e);
        }

        info!(
            "Set up {} ({}) with {} zone(s)",
            entry.title,
            entry.entry_id,
            sensors.len()
        );
        self.loaded
            .insert(entry.entry_id.clone(), LoadedEntry { coordinator, sensors });
        Ok(())
    }

    /// Stop an entry's listener and discard its tracker and entities.
    pub async fn unload(&mut self, entry_id: &str) -> Result<()> {
        self.entry(entry_id)?;
        let Some(mut loaded) = self.loaded.remove(entry_id) else {
            return Err(PimaError::NotLoaded { entry_id: entry_id.to_string() });
        };
        loaded.coordinator.stop().await?;
        info!("Unloaded {}", entry_id);
        Ok(())
    }

    /// Unload (if loaded) and forget an entry.
    pub async fn remove(&mut self, entry_id: &str) -> Result<ConfigEntry> {
        if self.is_loaded(entry_id) {
            self.unload(entry_id).await?;
        }
        self.entries.remove(entry_id).ok_or_else(|| unknown_entry(entry_id))
    }

    /// Unload and set up again, picking up changed options.
    pub async fn reload(&mut self, entry_id: &str) -> Result<()> {
        if self.is_loaded(entry_id) {
            self.unload(entry_id).await?;
        }
        self.setup(entry_id).await
    }

    /// Merge new options into an entry; a loaded entry is reloaded.
    pub async fn update_options(&mut self, entry_id: &str, update: OptionsUpdate) -> Result<()> {
        let entry = self
            .entries
            .get_mut(entry_id)
            .ok_or_else(|| unknown_entry(entry_id))?;
        let mut updated = entry.clone();
        updated.apply_update(update);
        updated.options.validate()?;
        *entry = updated;

        if self.is_loaded(entry_id) {
            self.reload(entry_id).await?;
        }
        Ok(())
    }

    /// Ordered zone names of an entry, including empty ones.
    pub fn get_zone_names(&self, entry_id: &str) -> Result<Vec<String>> {
        Ok(self.entry(entry_id)?.options.names())
    }

    /// Replace an entry's zone list wholesale.
    pub async fn set_zone_names(&mut self, entry_id: &str, names: Vec<String>) -> Result<()> {
        let zones = names.into_iter().map(ZoneConfig::named).collect();
        self.update_options(
            entry_id,
            OptionsUpdate {
                port: None,
                zones: Some(zones),
            },
        )
        .await
    }

    /// Mark a zone entity open.
    pub fn set_open(&self, entity_id: &str) -> Result<()> {
        self.set_zone(entity_id, true)
    }

    /// Mark a zone entity closed.
    pub fn set_closed(&self, entity_id: &str) -> Result<()> {
        self.set_zone(entity_id, false)
    }

    fn set_zone(&self, entity_id: &str, is_open: bool) -> Result<()> {
        let (loaded, sensor) = self
            .loaded
            .values()
            .find_map(|loaded| loaded.sensor(entity_id).map(|sensor| (loaded, sensor)))
            .ok_or_else(|| PimaError::UnknownEntity {
                entity_id: entity_id.to_string(),
            })?;
        loaded.coordinator.set_zone_state(sensor.zone(), is_open);
        Ok(())
    }

    /// Unload every loaded entry, reporting the first failure.
    pub async fn shutdown(&mut self) -> Result<()> {
        let loaded: Vec<String> = self.loaded.keys().cloned().collect();
        let mut first_error = None;
        for entry_id in loaded {
            if let Err(e) = self.unload(&entry_id).await {
                warn!("Failed to unload {}: {}", entry_id, e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

fn unknown_entry(entry_id: &str) -> PimaError {
    PimaError::UnknownEntry {
        entry_id: entry_id.to_string(),
    }
}
