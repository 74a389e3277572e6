//! Event handler trait and types.

use async_trait::async_trait;

use crate::error::EventError;
use crate::event::Event;

/// Result of handling an event.
#[derive(Debug, Clone)]
pub struct HandlerResult {
    /// Handler identifier.
    pub handler_id: String,
    /// Whether the handler succeeded.
    pub success: bool,
    /// Error message if failed.
    pub error: Option<String>,
    /// Duration in milliseconds.
    pub duration_ms: u64,
}

impl HandlerResult {
    /// Creates a successful result.
    pub fn success(handler_id: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            handler_id: handler_id.into(),
            success: true,
            error: None,
            duration_ms,
        }
    }

    /// Creates a failed result.
    pub fn failure(handler_id: impl Into<String>, error: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            handler_id: handler_id.into(),
            success: false,
            error: Some(error.into()),
            duration_ms,
        }
    }
}

/// Trait for event handlers.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Returns a unique identifier for this handler.
    fn id(&self) -> &str {
        "anonymous"
    }

    /// Handles an event.
    async fn handle(&self, event: &Event) -> Result<(), EventError>;
}

/// A boxed event handler.
pub type BoxedHandler = Box<dyn EventHandler>;

/// Handler wrapping a synchronous closure.
pub struct FnHandler<F>
where
    F: Fn(&Event) -> Result<(), EventError> + Send + Sync,
{
    id: String,
    handler: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&Event) -> Result<(), EventError> + Send + Sync,
{
    /// Creates a new function handler.
    pub fn new(id: impl Into<String>, handler: F) -> Self {
        Self {
            id: id.into(),
            handler,
        }
    }
}

#[async_trait]
impl<F> EventHandler for FnHandler<F>
where
    F: Fn(&Event) -> Result<(), EventError> + Send + Sync,
{
    fn id(&self) -> &str {
        &self.id
    }

    async fn handle(&self, event: &Event) -> Result<(), EventError> {
        (self.handler)(event)
    }
}

/// Handler that forwards every event to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingHandler;

#[async_trait]
impl EventHandler for TracingHandler {
    fn id(&self) -> &str {
        "tracing"
    }

    async fn handle(&self, event: &Event) -> Result<(), EventError> {
        tracing::debug!(
            event_type = %event.event_type,
            source = %event.source,
            payload = %event.payload,
            "autofill event"
        );
        Ok(())
    }
}
