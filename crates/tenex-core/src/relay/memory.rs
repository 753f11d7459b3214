//! In-memory relay, used to exercise fetch/publish flows without a network

use std::cell::RefCell;
use std::time::Duration;

use super::{EventPublisher, EventSource, Filter, PublishReport};
use crate::error::Result;
use crate::event::Event;

type Responder = Box<dyn Fn(&Event) -> Vec<Event>>;

/// Stores published events and answers filters from them.
#[derive(Default)]
pub struct MemoryRelay {
    events: RefCell<Vec<Event>>,
    responder: Option<Responder>,
}

impl MemoryRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<Event>) -> Self {
        Self {
            events: RefCell::new(events),
            responder: None,
        }
    }

    /// Generate extra events whenever something is published.
    pub fn with_responder(mut self, responder: impl Fn(&Event) -> Vec<Event> + 'static) -> Self {
        self.responder = Some(Box::new(responder));
        self
    }

    pub fn insert(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }

    /// Everything stored so far, in insertion order.
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }
}

impl EventSource for MemoryRelay {
    fn fetch_events(&self, filter: &Filter) -> Result<Vec<Event>> {
        let mut matched: Vec<Event> = self
            .events
            .borrow()
            .iter()
            .filter(|event| filter.matches(event))
            .cloned()
            .collect();
        if let Some(limit) = filter.limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }

    fn wait_for_event(&self, filter: &Filter, _timeout: Duration) -> Result<Option<Event>> {
        Ok(self
            .events
            .borrow()
            .iter()
            .find(|event| filter.matches(event))
            .cloned())
    }
}

impl EventPublisher for MemoryRelay {
    fn publish(&self, event: &Event) -> Result<PublishReport> {
        self.insert(event.clone());
        if let Some(responder) = &self.responder {
            for reply in responder(event) {
                self.insert(reply);
            }
        }
        Ok(PublishReport {
            event_id: event.id.clone(),
            accepted: vec!["memory".to_string()],
            rejected: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{kind, tag, UnsignedEvent};
    use crate::keys::Keys;

    #[test]
    fn test_publish_then_fetch() {
        let relay = MemoryRelay::new();
        let keys = Keys::generate();
        let event = UnsignedEvent::new(kind::TEXT_NOTE, "hi", vec![])
            .sign(&keys)
            .unwrap();
        relay.publish(&event).unwrap();

        let fetched = relay.fetch_events(&Filter::new().kind(kind::TEXT_NOTE)).unwrap();
        assert_eq!(fetched, vec![event]);
        assert!(relay
            .fetch_events(&Filter::new().kind(kind::SNIPPET))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_responder_replies_are_visible() {
        let keys = Keys::generate();
        let replier = keys.clone();
        let relay = MemoryRelay::new().with_responder(move |event| {
            vec![UnsignedEvent::new(kind::TEXT_NOTE, "ack", vec![tag("e", event.id.clone())])
                .sign(&replier)
                .unwrap()]
        });
        let note = UnsignedEvent::new(kind::TEXT_NOTE, "ping", vec![])
            .sign(&keys)
            .unwrap();
        relay.publish(&note).unwrap();

        let reply = relay
            .wait_for_event(&Filter::new().tag('e', vec![note.id.clone()]), Duration::ZERO)
            .unwrap()
            .unwrap();
        assert_eq!(reply.content, "ack");
    }
}
