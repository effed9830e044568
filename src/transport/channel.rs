// MIT License - Copyright (c) 2026 Peter Wright
// In-process SIA listener fed through a channel

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ListenerSettings;
use crate::constants::EVENT_CHANNEL_CAPACITY;
use crate::error::{PimaError, Result};
use crate::event::{EventCallback, SiaEvent};
use crate::transport::SiaListener;

/// Sending half handed to whatever produces decoded events.
pub type EventSender = mpsc::Sender<SiaEvent>;

/// Listener that receives already-decoded events over an mpsc channel.
///
/// Used to replay captured events and to drive the bridge in tests. A pump
/// task delivers events to the bound callback one at a time; stopping it
/// drains whatever is already queued before the task exits. The channel can
/// only be started once.
pub struct ChannelListener {
    settings: ListenerSettings,
    event_rx: Option<mpsc::Receiver<SiaEvent>>,
    callback: Option<EventCallback>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    pump_handle: Option<JoinHandle<()>>,
}

impl ChannelListener {
    pub fn new(settings: ListenerSettings) -> (Self, EventSender) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let listener = Self {
            settings,
            event_rx: Some(event_rx),
            callback: None,
            shutdown_tx: None,
            pump_handle: None,
        };
        (listener, event_tx)
    }

    pub fn settings(&self) -> &ListenerSettings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        self.pump_handle.is_some()
    }

    fn startup_error(&self, reason: &str) -> PimaError {
        PimaError::Startup {
            port: self.settings.port,
            reason: reason.to_string(),
        }
    }
}

async fn pump_events(
    mut event_rx: mpsc::Receiver<SiaEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
    callback: EventCallback,
) {
    loop {
        tokio::select! {
            biased;
            event = event_rx.recv() => match event {
                Some(event) => callback(event),
                None => {
                    debug!("Event channel closed by all senders");
                    return;
                }
            },
            _ = &mut shutdown_rx => break,
        }
    }

    event_rx.close();
    while let Some(event) = event_rx.recv().await {
        callback(event);
    }
    debug!("Event pump drained");
}

impl SiaListener for ChannelListener {
    fn port(&self) -> u16 {
        self.settings.port
    }

    fn bind(&mut self, callback: EventCallback) {
        self.callback = Some(callback);
    }

    async fn start(&mut self) -> Result<()> {
        if self.pump_handle.is_some() {
            return Err(self.startup_error("listener already running"));
        }
        let Some(callback) = self.callback.clone() else {
            return Err(self.startup_error("no event callback bound"));
        };
        let Some(event_rx) = self.event_rx.take() else {
            return Err(self.startup_error("event channel already consumed"));
        };

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        self.shutdown_tx = Some(shutdown_tx);
        self.pump_handle = Some(tokio::spawn(pump_events(event_rx, shutdown_rx, callback)));

        info!(
            "SIA listener on port {} accepting events (account '{}', response qualifier {})",
            self.settings.port, self.settings.account_id, self.settings.response_qualifier
        );
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        let Some(handle) = self.pump_handle.take() else {
            debug!("SIA listener on port {} not running", self.settings.port);
            return Ok(());
        };
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            // The pump may already have exited if every sender was dropped
            let _ = shutdown_tx.send(());
        }

        match handle.await {
            Ok(()) => {
                info!("SIA listener on port {} stopped", self.settings.port);
                Ok(())
            }
            Err(e) => {
                warn!("SIA listener task on port {} failed: {}", self.settings.port, e);
                Err(PimaError::Shutdown {
                    port: self.settings.port,
                    reason: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EntryOptions;
    use std::sync::{Arc, Mutex};

    fn listener() -> (ChannelListener, EventSender) {
        ChannelListener::new(ListenerSettings::from_options(&EntryOptions::default()))
    }

    fn recording_callback() -> (EventCallback, Arc<Mutex<Vec<SiaEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback: EventCallback = Arc::new(move |event| sink.lock().unwrap().push(event));
        (callback, seen)
    }

    #[tokio::test]
    async fn test_start_requires_callback() {
        let (mut listener, _tx) = listener();
        let err = listener.start().await.unwrap_err();
        assert!(matches!(err, PimaError::Startup { port: 10001, .. }));
        assert!(!listener.is_running());
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let (mut listener, _tx) = listener();
        let (callback, _seen) = recording_callback();
        listener.bind(callback);
        listener.start().await.unwrap();
        assert!(matches!(listener.start().await, Err(PimaError::Startup { .. })));
        listener.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_restart_after_stop_fails() {
        let (mut listener, _tx) = listener();
        let (callback, _seen) = recording_callback();
        listener.bind(callback);
        listener.start().await.unwrap();
        listener.stop().await.unwrap();
        assert!(matches!(listener.start().await, Err(PimaError::Startup { .. })));
    }

    #[tokio::test]
    async fn test_stop_without_start() {
        let (mut listener, _tx) = listener();
        listener.stop().await.unwrap();
        listener.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_delivers_queued_events_in_order() {
        let (mut listener, tx) = listener();
        let (callback, seen) = recording_callback();
        listener.bind(callback);
        listener.start().await.unwrap();

        tx.send(SiaEvent::zone_open(1)).await.unwrap();
        tx.send(SiaEvent::zone_close(1)).await.unwrap();
        tx.send(SiaEvent::zone_open(2)).await.unwrap();
        listener.stop().await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![SiaEvent::zone_open(1), SiaEvent::zone_close(1), SiaEvent::zone_open(2)]
        );
    }

    #[tokio::test]
    async fn test_stop_after_senders_dropped() {
        let (mut listener, tx) = listener();
        let (callback, seen) = recording_callback();
        listener.bind(callback);
        listener.start().await.unwrap();

        tx.send(SiaEvent::zone_open(3)).await.unwrap();
        drop(tx);
        listener.stop().await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![SiaEvent::zone_open(3)]);
    }
}
