//! Event types and structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An event published by the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier for this event instance.
    pub id: String,
    /// The event type (namespace + name).
    pub event_type: EventType,
    /// The event payload.
    pub payload: Value,
    /// Component that published the event.
    pub source: String,
    /// Timestamp when the event was created.
    pub timestamp: DateTime<Utc>,
    /// Identifier shared by all events of one page lifetime.
    pub correlation_id: Option<String>,
}

impl Event {
    /// Creates a new event with the given type and payload.
    pub fn new(event_type: EventType, payload: impl Serialize) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_type,
            payload: serde_json::to_value(payload).unwrap_or(Value::Null),
            source: String::new(),
            timestamp: Utc::now(),
            correlation_id: None,
        }
    }

    /// Creates a new event from a type string (e.g., "code.accepted").
    pub fn simple(event_type: impl Into<String>, payload: impl Serialize) -> Self {
        Self::new(EventType::from_string(event_type), payload)
    }

    /// Sets the correlation ID.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Sets the source.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Returns the type string (e.g., "code.accepted").
    pub fn type_string(&self) -> String {
        self.event_type.to_string()
    }

    /// Reads a string field from the payload.
    pub fn payload_str(&self, field: &str) -> Option<&str> {
        self.payload.get(field).and_then(Value::as_str)
    }
}

/// Event type identifier with namespace and name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EventType {
    /// Namespace (e.g., "candidate", "channel", "form").
    pub namespace: String,
    /// Event name (e.g., "accepted", "failed").
    pub name: String,
}

impl EventType {
    /// Creates a new event type.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Parses an event type from a string like "channel.failed".
    pub fn from_string(s: impl Into<String>) -> Self {
        let s = s.into();
        match s.split_once('.') {
            Some((namespace, name)) => Self::new(namespace, name),
            None => Self::new("unknown", s),
        }
    }

    /// Checks if this event type matches a pattern.
    ///
    /// Patterns are an exact type, a namespace wildcard ("channel.*") or "*".
    pub fn matches(&self, pattern: &str) -> bool {
        if pattern == "*" {
            return true;
        }

        if let Some(namespace) = pattern.strip_suffix(".*") {
            return self.namespace == namespace;
        }

        self.to_string() == pattern
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

/// Builder for events sharing a source and correlation ID.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    source: String,
    correlation_id: Option<String>,
}

impl EventBuilder {
    /// Creates a new event builder with a source.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            correlation_id: None,
        }
    }

    /// Sets the correlation ID for all events.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Builds an event with the configured source.
    pub fn build(&self, event_type: impl Into<String>, payload: impl Serialize) -> Event {
        let mut event = Event::simple(event_type, payload).with_source(&self.source);

        if let Some(ref correlation_id) = self.correlation_id {
            event = event.with_correlation_id(correlation_id);
        }

        event
    }
}
