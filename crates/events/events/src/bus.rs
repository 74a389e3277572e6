//! Event bus for pub/sub communication.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::error::{EventError, EventResult};
use crate::event::Event;
use crate::handler::{BoxedHandler, EventHandler, HandlerResult};

/// The event bus for publishing and subscribing to events.
pub struct EventBus {
    /// Subscribers mapped by event type pattern.
    subscribers: RwLock<HashMap<String, Vec<Arc<BoxedHandler>>>>,
    /// Wildcard subscribers (receive all events).
    wildcard_subscribers: RwLock<Vec<Arc<BoxedHandler>>>,
    /// Recently published events, oldest first.
    history: RwLock<VecDeque<Event>>,
    /// Maximum history size.
    max_history: usize,
}

impl EventBus {
    /// Creates a new event bus.
    pub fn new() -> Self {
        Self::with_history_size(1000)
    }

    /// Creates an event bus with custom history size.
    pub fn with_history_size(max_history: usize) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            wildcard_subscribers: RwLock::new(Vec::new()),
            history: RwLock::new(VecDeque::new()),
            max_history,
        }
    }

    /// Subscribes to a specific event type or pattern.
    ///
    /// Patterns support:
    /// - Exact match: "code.accepted"
    /// - Namespace wildcard: "channel.*"
    /// - All events: "*"
    pub async fn on(&self, pattern: &str, handler: impl EventHandler + 'static) {
        if pattern == "*" {
            let mut subs = self.wildcard_subscribers.write().await;
            subs.push(Arc::new(Box::new(handler)));
        } else {
            let mut subs = self.subscribers.write().await;
            subs.entry(pattern.to_string())
                .or_default()
                .push(Arc::new(Box::new(handler)));
        }
    }

    /// Subscribes to all events.
    pub async fn on_all(&self, handler: impl EventHandler + 'static) {
        self.on("*", handler).await;
    }

    /// Emits an event and waits for all handlers to complete.
    pub async fn emit_sync(&self, event: Event) -> Vec<HandlerResult> {
        self.store_in_history(event.clone()).await;

        let handlers = self.collect_handlers(&event).await;
        let mut results = Vec::with_capacity(handlers.len());

        for handler in handlers {
            let start = Instant::now();
            let result = handler.handle(&event).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            results.push(match result {
                Ok(()) => HandlerResult::success(handler.id(), duration_ms),
                Err(e) => {
                    tracing::error!("Event handler '{}' error: {}", handler.id(), e);
                    HandlerResult::failure(handler.id(), e.to_string(), duration_ms)
                }
            });
        }

        results
    }

    /// Emits an event and returns an error if any handler fails.
    pub async fn emit_checked(&self, event: Event) -> EventResult<()> {
        let results = self.emit_sync(event).await;

        match results.into_iter().find(|r| !r.success) {
            Some(failed) => Err(EventError::HandlerFailed(
                failed.error.unwrap_or_else(|| "Unknown error".to_string()),
            )),
            None => Ok(()),
        }
    }

    /// Gets recent events from history, newest first.
    pub async fn recent_events(&self, count: usize) -> Vec<Event> {
        let history = self.history.read().await;
        history.iter().rev().take(count).cloned().collect()
    }

    /// Gets all events in history, oldest first.
    pub async fn history(&self) -> Vec<Event> {
        let history = self.history.read().await;
        history.iter().cloned().collect()
    }

    /// Gets events matching a pattern from history, oldest first.
    pub async fn events_of_type(&self, pattern: &str) -> Vec<Event> {
        let history = self.history.read().await;
        history
            .iter()
            .filter(|e| e.event_type.matches(pattern))
            .cloned()
            .collect()
    }

    /// Counts events matching a pattern in history.
    pub async fn count_of_type(&self, pattern: &str) -> usize {
        let history = self.history.read().await;
        history.iter().filter(|e| e.event_type.matches(pattern)).count()
    }

    /// Gets the number of subscribers for a pattern.
    pub async fn subscriber_count(&self, pattern: &str) -> usize {
        if pattern == "*" {
            let subs = self.wildcard_subscribers.read().await;
            subs.len()
        } else {
            let subs = self.subscribers.read().await;
            subs.get(pattern).map(|v| v.len()).unwrap_or(0)
        }
    }

    async fn store_in_history(&self, event: Event) {
        if self.max_history == 0 {
            return;
        }
        let mut history = self.history.write().await;
        if history.len() == self.max_history {
            history.pop_front();
        }
        history.push_back(event);
    }

    async fn collect_handlers(&self, event: &Event) -> Vec<Arc<BoxedHandler>> {
        let mut handlers = Vec::new();

        let subs = self.subscribers.read().await;
        for (pattern, pattern_handlers) in subs.iter() {
            if event.event_type.matches(pattern) {
                handlers.extend(pattern_handlers.iter().cloned());
            }
        }

        let wildcards = self.wildcard_subscribers.read().await;
        handlers.extend(wildcards.iter().cloned());

        handlers
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
