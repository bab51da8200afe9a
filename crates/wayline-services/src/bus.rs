//! In-process event bus with typed topics.
//!
//! Every payload type is bound to one [`Topic`]. Handlers run on the
//! publishing thread, so each publisher is its own delivery context and
//! nothing is ordered across topics.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use wayline_core::{
    ConnectionSessionEvent, ConnectionStatisticsEvent, InvoicePaidEvent, NodeEvent,
    ServiceSessionEvent, Topic,
};

/// A payload that can travel on the bus.
pub trait Event: Send + Sync + 'static {
    const TOPIC: Topic;
}

impl Event for ServiceSessionEvent {
    const TOPIC: Topic = Topic::ServiceSession;
}

impl Event for ConnectionSessionEvent {
    const TOPIC: Topic = Topic::ConnectionSession;
}

impl Event for ConnectionStatisticsEvent {
    const TOPIC: Topic = Topic::ConnectionStatistics;
}

impl Event for InvoicePaidEvent {
    const TOPIC: Topic = Topic::InvoicePaid;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BusError {
    #[error("event bus is closed, cannot subscribe to {0}")]
    Closed(&'static str),
}

pub trait Subscriber {
    /// Register `handler` for every future event of type `E`.
    fn subscribe<E, F>(&self, handler: F) -> Result<(), BusError>
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static;
}

pub trait Publisher {
    /// Deliver `event` to all handlers of its topic.
    fn publish<E: Event>(&self, event: E);
}

type ErasedHandler = Arc<dyn Fn(&dyn Any) + Send + Sync>;

#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Arc<DashMap<Topic, Vec<ErasedHandler>>>,
    closed: Arc<AtomicBool>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop accepting subscriptions and drop all handlers. Later publishes
    /// are discarded.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.handlers.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of handlers registered on a topic.
    pub fn handler_count(&self, topic: Topic) -> usize {
        self.handlers.get(&topic).map(|h| h.len()).unwrap_or(0)
    }
}

impl Subscriber for EventBus {
    fn subscribe<E, F>(&self, handler: F) -> Result<(), BusError>
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        if self.is_closed() {
            return Err(BusError::Closed(E::TOPIC.name()));
        }
        let erased: ErasedHandler = Arc::new(move |event: &dyn Any| {
            if let Some(event) = event.downcast_ref::<E>() {
                handler(event);
            }
        });
        self.handlers.entry(E::TOPIC).or_default().push(erased);
        tracing::debug!(topic = E::TOPIC.name(), "handler subscribed");
        Ok(())
    }
}

impl Publisher for EventBus {
    fn publish<E: Event>(&self, event: E) {
        if self.is_closed() {
            tracing::debug!(topic = E::TOPIC.name(), "bus closed, event dropped");
            return;
        }
        // Snapshot so handlers may touch the bus without holding the shard lock.
        let handlers = match self.handlers.get(&E::TOPIC) {
            Some(h) => h.clone(),
            None => return,
        };
        for handler in handlers {
            handler(&event);
        }
    }
}

/// Route a tagged event to its typed topic.
pub fn publish_node_event<P: Publisher + ?Sized>(bus: &P, event: NodeEvent) {
    match event {
        NodeEvent::ServiceSession(e) => bus.publish(e),
        NodeEvent::ConnectionSession(e) => bus.publish(e),
        NodeEvent::ConnectionStatistics(e) => bus.publish(e),
        NodeEvent::InvoicePaid(e) => bus.publish(e),
    }
}
