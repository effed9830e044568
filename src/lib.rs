// MIT License - Copyright (c) 2026 Peter Wright
//
//! # pima-force-bridge
//!
//! Zone state tracking for Pima Force alarm panels that report over
//! SIA ADM-CID.
//!
//! A SIA listener decodes panel messages and hands them to a per-panel
//! [`Coordinator`]. Zone open/close reports (event code `760`, qualifiers
//! `1`/`3`) update the coordinator's zone tracker, and every named zone is
//! presented as a door sensor that records when it last opened, closed and
//! toggled.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::{Arc, Mutex};
//!
//! use pima_force_bridge::{
//!     ChannelListener, ConfigEntry, EntryOptions, EntryRegistry, ListenerSettings,
//!     LogPublisher, MemoryRestoreStore, SiaEvent, SystemClock,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let sender = Arc::new(Mutex::new(None));
//!     let slot = Arc::clone(&sender);
//!     let mut registry = EntryRegistry::<ChannelListener>::new(
//!         Box::new(move |settings: &ListenerSettings| {
//!             let (listener, events) = ChannelListener::new(settings.clone());
//!             *slot.lock().unwrap() = Some(events);
//!             listener
//!         }),
//!         Arc::new(MemoryRestoreStore::new()),
//!         Arc::new(LogPublisher),
//!         Arc::new(SystemClock),
//!     );
//!
//!     let options = EntryOptions::builder().zones(["", "Front Door", "Back Door"]).build();
//!     registry.add(ConfigEntry::new("panel", options))?;
//!     registry.setup("panel").await?;
//!
//!     let events = sender.lock().unwrap().clone().expect("listener created");
//!     events.send(SiaEvent::zone_open(2)).await?;
//!
//!     registry.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod constants;
pub mod coordinator;
pub mod devices;
pub mod entry;
pub mod error;
pub mod event;
pub mod publish;
pub mod registry;
pub mod restore;
pub mod time;
pub mod tracker;
pub mod transport;

// Re-exports for convenience
pub use config::{EntryOptions, EntryOptionsBuilder, ListenerSettings, OptionsUpdate, ZoneConfig, zone_names};
pub use coordinator::Coordinator;
pub use devices::{DeviceInfo, ZoneAttributes, ZoneSensor};
pub use entry::ConfigEntry;
pub use error::{PimaError, Result};
pub use event::{EventCallback, SiaEvent, ZoneReport};
pub use publish::{FanoutPublisher, JsonLinesPublisher, LogPublisher, StatePublisher, ZoneState};
pub use registry::{EntryRegistry, ListenerFactory};
pub use restore::{MemoryRestoreStore, RestoreStore, RestoredState};
pub use time::{Clock, FixedClock, SystemClock};
pub use tracker::{ZoneObserver, ZoneTracker};
pub use transport::{ChannelListener, EventSender, SiaListener};
