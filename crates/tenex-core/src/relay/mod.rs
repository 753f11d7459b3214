//! Relay access: the fetch/publish seams and their implementations

mod filter;
mod memory;
mod message;
mod pool;

use std::time::Duration;

use serde::Serialize;

use crate::error::Result;
use crate::event::Event;

pub use filter::Filter;
pub use memory::MemoryRelay;
pub use message::{ClientMessage, RelayMessage};
pub use pool::RelayPool;

/// Something events can be fetched from.
pub trait EventSource {
    /// Stored events matching `filter`, de-duplicated by id in first-seen order.
    fn fetch_events(&self, filter: &Filter) -> Result<Vec<Event>>;

    /// Block until an event matching `filter` arrives or `timeout` elapses.
    fn wait_for_event(&self, filter: &Filter, timeout: Duration) -> Result<Option<Event>>;
}

/// Something events can be published to.
pub trait EventPublisher {
    fn publish(&self, event: &Event) -> Result<PublishReport>;
}

/// Per-relay outcome of a publish
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub event_id: String,
    /// Relays that acknowledged with `OK true`.
    pub accepted: Vec<String>,
    /// Relays that refused or failed, with the reason.
    pub rejected: Vec<(String, String)>,
}
