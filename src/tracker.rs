// MIT License - Copyright (c) 2026 Peter Wright
// Zone state tracker and observer fan-out

use std::collections::HashMap;
use std::sync::Arc;

/// Last reported open/closed state per zone number.
///
/// A zone has no entry until the panel first reports it (or it is set by an
/// operator action).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneTracker {
    zones: HashMap<u32, bool>,
}

impl ZoneTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracked state of `zone`, `None` if never reported.
    pub fn get(&self, zone: u32) -> Option<bool> {
        self.zones.get(&zone).copied()
    }

    /// Record the state of `zone`, returning the previous value.
    pub fn set(&mut self, zone: u32, is_open: bool) -> Option<bool> {
        self.zones.insert(zone, is_open)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Snapshot of all tracked zones.
    pub fn snapshot(&self) -> HashMap<u32, bool> {
        self.zones.clone()
    }
}

/// Notified after every tracker update. Observers re-read the tracker
/// themselves; the notification carries no payload.
pub trait ZoneObserver: Send + Sync {
    fn zones_updated(&self, tracker: &ZoneTracker);
}

/// Tracker plus its registered observers.
#[derive(Default)]
pub struct ZoneSubject {
    tracker: ZoneTracker,
    observers: Vec<Arc<dyn ZoneObserver>>,
}

impl ZoneSubject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracker(&self) -> &ZoneTracker {
        &self.tracker
    }

    pub fn subscribe(&mut self, observer: Arc<dyn ZoneObserver>) {
        self.observers.push(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Update one zone and notify every observer once, in subscription order.
    pub fn update(&mut self, zone: u32, is_open: bool) {
        self.tracker.set(zone, is_open);
        self.notify_all();
    }

    pub fn notify_all(&self) {
        for observer in &self.observers {
            observer.zones_updated(&self.tracker);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<HashMap<u32, bool>>>,
    }

    impl ZoneObserver for Recorder {
        fn zones_updated(&self, tracker: &ZoneTracker) {
            self.seen.lock().unwrap().push(tracker.snapshot());
        }
    }

    #[test]
    fn test_tracker_set_get() {
        let mut tracker = ZoneTracker::new();
        assert!(tracker.is_empty());
        assert_eq!(tracker.get(2), None);
        assert_eq!(tracker.set(2, true), None);
        assert_eq!(tracker.set(2, false), Some(true));
        assert_eq!(tracker.get(2), Some(false));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_update_notifies_every_time() {
        let recorder = Arc::new(Recorder::default());
        let mut subject = ZoneSubject::new();
        subject.subscribe(recorder.clone());

        subject.update(2, true);
        subject.update(2, true);
        subject.update(3, false);

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], HashMap::from([(2, true)]));
        assert_eq!(seen[2], HashMap::from([(2, true), (3, false)]));
    }

    #[test]
    fn test_notify_without_observers() {
        let mut subject = ZoneSubject::new();
        subject.update(1, true);
        assert_eq!(subject.observer_count(), 0);
        assert_eq!(subject.tracker().get(1), Some(true));
    }
}
