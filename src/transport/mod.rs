// MIT License - Copyright (c) 2026 Peter Wright
// SIA listener abstraction

pub mod channel;

use crate::error::Result;
use crate::event::EventCallback;

pub use channel::{ChannelListener, EventSender};

/// A service that accepts panel connections and decodes SIA messages.
///
/// Framing, CRC checks and account handling all live behind this trait; the
/// bridge only sees decoded events through the bound callback. Events must
/// be delivered one at a time and in the order they were received.
#[allow(async_fn_in_trait)]
pub trait SiaListener: Send {
    /// Port the listener accepts connections on.
    fn port(&self) -> u16;

    /// Set the callback invoked once per decoded event. Must be called
    /// before `start`.
    fn bind(&mut self, callback: EventCallback);

    /// Resolve once the listener is accepting connections.
    async fn start(&mut self) -> Result<()>;

    /// Resolve once the listener has released its port and tasks.
    async fn stop(&mut self) -> Result<()>;
}
