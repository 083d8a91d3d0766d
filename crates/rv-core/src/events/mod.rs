//! Injected publish/subscribe channel for table state changes
//!
//! The bus has an explicit lifecycle: events published before `start()` or
//! after `stop()` are dropped. Handlers run with the registry unlocked, so
//! a handler may publish or subscribe itself.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::{Mutex, ReentrantMutex};
use tracing::debug;

use crate::sort::SortDirection;

/// A registered handler. The reentrant lock serializes delivery across
/// threads; the `RefCell` detects a handler re-entering itself.
type SharedHandler = Arc<ReentrantMutex<RefCell<Box<dyn EventHandler>>>>;

/// Table event bus
pub struct EventBus {
    handlers: Arc<Mutex<AHashMap<TypeId, Vec<SharedHandler>>>>,
    running: AtomicBool,
}

/// Event trait that all events must implement
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
}

/// Handler trait for event handlers
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

/// Sort state changed
#[derive(Debug, Clone, PartialEq)]
pub struct SortChanged {
    pub key: Option<String>,
    pub direction: SortDirection,
}

/// Selection membership changed
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionChanged {
    pub selected_count: usize,
}

/// The host replaced the dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetReplaced {
    pub total_count: usize,
}

macro_rules! impl_event {
    ($($t:ty),*) => {
        $(
            impl Event for $t {
                fn as_any(&self) -> &dyn Any {
                    self
                }
            }
        )*
    }
}

impl_event!(SortChanged, SelectionChanged, DatasetReplaced);

/// Any table event, for callers that queue events before publishing
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    SortChanged(SortChanged),
    SelectionChanged(SelectionChanged),
    DatasetReplaced(DatasetReplaced),
}

impl TableEvent {
    /// Publish the wrapped event on `bus`
    pub fn publish_on(self, bus: &EventBus) -> bool {
        match self {
            TableEvent::SortChanged(event) => bus.publish(event),
            TableEvent::SelectionChanged(event) => bus.publish(event),
            TableEvent::DatasetReplaced(event) => bus.publish(event),
        }
    }
}

impl EventBus {
    /// Create a stopped event bus
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(AHashMap::new())),
            running: AtomicBool::new(false),
        }
    }

    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
        debug!("Event bus started");
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        debug!("Event bus stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Subscribe to events of a specific type
    pub fn subscribe<E: Event>(&self, handler: Box<dyn EventHandler>) {
        let type_id = TypeId::of::<E>();
        let mut handlers = self.handlers.lock();
        handlers
            .entry(type_id)
            .or_insert_with(Vec::new)
            .push(Arc::new(ReentrantMutex::new(RefCell::new(handler))));
    }

    /// Subscribe a closure that receives the concrete event type
    pub fn subscribe_fn<E, F>(&self, mut f: F)
    where
        E: Event,
        F: FnMut(&E) + Send + Sync + 'static,
    {
        self.subscribe::<E>(handler_from_fn(move |event: &dyn Event| {
            if let Some(event) = event.as_any().downcast_ref::<E>() {
                f(event);
            }
        }));
    }

    /// Publish an event. Returns false if the bus is stopped.
    ///
    /// A handler that re-publishes an event it is subscribed to does not
    /// receive it again while still handling the first one.
    pub fn publish<E: Event>(&self, event: E) -> bool {
        if !self.is_running() {
            return false;
        }

        let type_id = TypeId::of::<E>();
        let snapshot: Vec<SharedHandler> = self
            .handlers
            .lock()
            .get(&type_id)
            .cloned()
            .unwrap_or_default();

        for handler in &snapshot {
            let guard = handler.lock();
            match guard.try_borrow_mut() {
                Ok(mut handler) => handler.handle(&event),
                Err(_) => debug!("Skipping re-entrant delivery to a busy handler"),
            };
        }
        true
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper struct for creating event handlers from closures
pub struct ClosureEventHandler<F> {
    handler: F,
}

impl<F> EventHandler for ClosureEventHandler<F>
where
    F: FnMut(&dyn Event) + Send + Sync,
{
    fn handle(&mut self, event: &dyn Event) {
        (self.handler)(event);
    }
}

/// Create an event handler from a closure
pub fn handler_from_fn<F>(f: F) -> Box<dyn EventHandler>
where
    F: FnMut(&dyn Event) + Send + Sync + 'static,
{
    Box::new(ClosureEventHandler { handler: f })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_typed_subscriber() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        bus.subscribe_fn(move |event: &SelectionChanged| sink.lock().push(event.selected_count));

        bus.start();
        assert!(bus.publish(SelectionChanged { selected_count: 4 }));
        assert!(bus.publish(DatasetReplaced { total_count: 10 }));

        assert_eq!(*seen.lock(), vec![4]);
    }

    #[test]
    fn test_stopped_bus_drops_events() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(0));
        let sink = seen.clone();
        bus.subscribe_fn(move |_: &DatasetReplaced| *sink.lock() += 1);

        assert!(!bus.publish(DatasetReplaced { total_count: 1 }));
        bus.start();
        bus.publish(DatasetReplaced { total_count: 1 });
        bus.stop();
        bus.publish(DatasetReplaced { total_count: 1 });

        assert!(!bus.is_running());
        assert_eq!(*seen.lock(), 1);
    }

    #[test]
    fn test_handler_can_publish_and_subscribe() {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        bus.subscribe_fn(move |e: &DatasetReplaced| sink.lock().push(format!("rows {}", e.total_count)));

        let inner = bus.clone();
        let sink = seen.clone();
        bus.subscribe_fn(move |e: &SelectionChanged| {
            sink.lock().push(format!("selection {}", e.selected_count));
            inner.publish(DatasetReplaced { total_count: e.selected_count * 10 });
            inner.subscribe_fn(|_: &SortChanged| {});
        });
        bus.start();

        assert!(bus.publish(SelectionChanged { selected_count: 2 }));
        assert_eq!(*seen.lock(), vec!["selection 2".to_string(), "rows 20".to_string()]);
    }

    #[test]
    fn test_handler_republishing_own_event_runs_once() {
        let bus = Arc::new(EventBus::new());
        let calls = Arc::new(Mutex::new(0));

        let inner = bus.clone();
        let counter = calls.clone();
        bus.subscribe_fn(move |e: &SelectionChanged| {
            *counter.lock() += 1;
            inner.publish(e.clone());
        });
        bus.start();

        bus.publish(SelectionChanged { selected_count: 1 });
        assert_eq!(*calls.lock(), 1);
    }
}
