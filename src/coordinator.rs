// MIT License - Copyright (c) 2026 Peter Wright
// Event dispatch and listener lifecycle for one config entry

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, trace};

use crate::error::Result;
use crate::event::{EventCallback, SiaEvent};
use crate::tracker::{ZoneObserver, ZoneSubject};
use crate::transport::SiaListener;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Idle,
    Starting,
    Running,
    Stopped,
}

/// Owns the zone tracker of one config entry and the listener feeding it.
///
/// Accepted zone-status events update the tracker and notify every observer
/// once, synchronously. The tracker update and fan-out run under one lock per
/// coordinator, so a tracker is never touched by two events at once and
/// events are applied in delivery order.
pub struct Coordinator<L: SiaListener> {
    entry_id: String,
    subject: Arc<Mutex<ZoneSubject>>,
    listener: L,
    lifecycle: Lifecycle,
}

fn lock_subject(subject: &Mutex<ZoneSubject>) -> MutexGuard<'_, ZoneSubject> {
    match subject.lock() {
        Ok(subject) => subject,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Apply one decoded event. Events that are not zone open/close reports are
/// dropped without side effects.
fn dispatch(subject: &Mutex<ZoneSubject>, event: &SiaEvent) {
    let Some(report) = event.zone_report() else {
        trace!(
            "Ignoring SIA event type={} qualifier={} ri={:?}",
            event.event_type, event.event_qualifier, event.zone_reference
        );
        return;
    };
    debug!(
        "Zone {} reported {}",
        report.zone,
        if report.is_open { "open" } else { "closed" }
    );
    lock_subject(subject).update(report.zone, report.is_open);
}

impl<L: SiaListener> Coordinator<L> {
    pub fn new(entry_id: impl Into<String>, listener: L) -> Self {
        Self {
            entry_id: entry_id.into(),
            subject: Arc::new(Mutex::new(ZoneSubject::new())),
            listener,
            lifecycle: Lifecycle::Idle,
        }
    }

    pub fn entry_id(&self) -> &str {
        &self.entry_id
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// Register an observer for tracker updates.
    pub fn subscribe(&self, observer: Arc<dyn ZoneObserver>) {
        lock_subject(&self.subject).subscribe(observer);
    }

    /// Handle one decoded event. Never fails.
    pub fn handle(&self, event: &SiaEvent) {
        dispatch(&self.subject, event);
    }

    /// Set a zone's tracked state directly, notifying observers as an
    /// accepted event would.
    pub fn set_zone_state(&self, zone: u32, is_open: bool) {
        debug!("Zone {} set {} by operator", zone, if is_open { "open" } else { "closed" });
        lock_subject(&self.subject).update(zone, is_open);
    }

    /// Tracked state of `zone`, `None` if never reported.
    pub fn zone_state(&self, zone: u32) -> Option<bool> {
        lock_subject(&self.subject).tracker().get(zone)
    }

    /// Snapshot of every tracked zone.
    pub fn zones(&self) -> HashMap<u32, bool> {
        lock_subject(&self.subject).tracker().snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    /// Bind the listener to this coordinator's dispatcher and start it.
    ///
    /// Listener failures are returned as-is; nothing is retried.
    pub async fn start(&mut self) -> Result<()> {
        if self.lifecycle == Lifecycle::Running {
            debug!("Coordinator for {} already running", self.entry_id);
            return Ok(());
        }

        let subject = Arc::clone(&self.subject);
        let callback: EventCallback = Arc::new(move |event: SiaEvent| dispatch(&subject, &event));
        self.listener.bind(callback);

        self.lifecycle = Lifecycle::Starting;
        info!(
            "Starting SIA listener for {} on port {}",
            self.entry_id,
            self.listener.port()
        );
        self.listener.start().await?;
        self.lifecycle = Lifecycle::Running;
        Ok(())
    }

    /// Stop the listener. Safe to call at any time: when no start was ever
    /// attempted, or the listener was already stopped, this does nothing.
    pub async fn stop(&mut self) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Idle | Lifecycle::Stopped => {
                debug!("Coordinator for {} has nothing to stop", self.entry_id);
                Ok(())
            }
            Lifecycle::Starting | Lifecycle::Running => {
                info!(
                    "Stopping SIA listener for {} on port {}",
                    self.entry_id,
                    self.listener.port()
                );
                self.lifecycle = Lifecycle::Stopped;
                self.listener.stop().await
            }
        }
    }
}
