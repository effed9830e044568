// MIT License - Copyright (c) 2026 Peter Wright
// Config entry options

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_LISTENING_PORT, SIA_PIMA_KEEP_CONNECTED_QUALIFIER, TITLE};
use crate::error::{PimaError, Result};

/// One configured zone slot.
///
/// The slot's position in the zone list decides its zone number. A slot
/// without a name keeps its number but is not presented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ZoneRecord")]
pub struct ZoneConfig {
    pub name: Option<String>,
}

/// Zone slots may be written as a bare string or as a `{ name = ... }` table.
#[derive(Deserialize)]
#[serde(untagged)]
enum ZoneRecord {
    Name(String),
    Table {
        #[serde(default)]
        name: Option<String>,
    },
}

impl From<ZoneRecord> for ZoneConfig {
    fn from(record: ZoneRecord) -> Self {
        match record {
            ZoneRecord::Name(name) => Self { name: Some(name) },
            ZoneRecord::Table { name } => Self { name },
        }
    }
}

impl ZoneConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()) }
    }

    /// The name to present, or `None` when the slot is unnamed.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }
}

/// Map configured zone slots to the zones that get presented.
///
/// Zone numbers are list positions starting at 1. Unnamed slots are skipped
/// but still consume their number, so clearing a name in the middle of the
/// list never renumbers the zones after it.
pub fn zone_names(zones: &[ZoneConfig]) -> BTreeMap<u32, String> {
    zones
        .iter()
        .zip(1u32..)
        .filter_map(|(zone, number)| zone.display_name().map(|name| (number, name.to_string())))
        .collect()
}

/// Title given to a config entry listening on `port`.
pub fn entry_title(port: u16) -> String {
    format!("{TITLE} {port}")
}

/// Options of a single config entry (one panel).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryOptions {
    /// TCP port the SIA listener accepts the panel on (default: 10001)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Ordered zone slots; position + 1 is the zone number
    #[serde(default)]
    pub zones: Vec<ZoneConfig>,
}

fn default_port() -> u16 {
    DEFAULT_LISTENING_PORT
}

impl Default for EntryOptions {
    fn default() -> Self {
        Self {
            port: DEFAULT_LISTENING_PORT,
            zones: Vec::new(),
        }
    }
}

impl EntryOptions {
    /// Create a new options builder starting from defaults.
    pub fn builder() -> EntryOptionsBuilder {
        EntryOptionsBuilder::default()
    }

    /// Reject options the listener cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(PimaError::InvalidPort { port: self.port });
        }
        Ok(())
    }

    /// Zone names in slot order, including empty ones.
    pub fn names(&self) -> Vec<String> {
        self.zones
            .iter()
            .map(|zone| zone.name.clone().unwrap_or_default())
            .collect()
    }

    /// Replace the zone list wholesale from an ordered list of names.
    pub fn set_names<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.zones = names.into_iter().map(ZoneConfig::named).collect();
    }

    /// Presented zones keyed by zone number.
    pub fn zone_names(&self) -> BTreeMap<u32, String> {
        zone_names(&self.zones)
    }

    /// Apply an options update: fields present in `update` replace the current ones.
    pub fn merged(&self, update: OptionsUpdate) -> Self {
        Self {
            port: update.port.unwrap_or(self.port),
            zones: update.zones.unwrap_or_else(|| self.zones.clone()),
        }
    }
}

/// Partial options submitted by an operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OptionsUpdate {
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub zones: Option<Vec<ZoneConfig>>,
}

/// Builder for EntryOptions.
#[derive(Debug, Clone, Default)]
pub struct EntryOptionsBuilder {
    options: EntryOptions,
}

impl EntryOptionsBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.options.port = port;
        self
    }

    /// Append a named zone slot.
    pub fn zone(mut self, name: impl Into<String>) -> Self {
        self.options.zones.push(ZoneConfig::named(name));
        self
    }

    pub fn zones<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.set_names(names);
        self
    }

    pub fn build(self) -> EntryOptions {
        self.options
    }
}

/// Settings handed to the SIA listener of one config entry.
///
/// Pima panels report under a single account, so one catch-all account with
/// an empty id and no timeband check is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerSettings {
    pub port: u16,
    pub account_id: String,
    pub allowed_timeband: Option<(u32, u32)>,
    pub response_qualifier: String,
}

impl ListenerSettings {
    pub fn from_options(options: &EntryOptions) -> Self {
        Self {
            port: options.port,
            account_id: String::new(),
            allowed_timeband: None,
            response_qualifier: SIA_PIMA_KEEP_CONNECTED_QUALIFIER.to_string(),
        }
    }
}

impl Default for ListenerSettings {
    fn default() -> Self {
        Self::from_options(&EntryOptions::default())
    }
}
