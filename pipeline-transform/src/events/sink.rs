//! Event sink trait and implementations.

use async_trait::async_trait;
use tracing::{debug, info, trace, warn, Level};

/// Trait for event sinks that can receive events.
///
/// `inspect` stages emit one event per item flowing past them. The event
/// data is a JSON object holding the stage labels and the item's `Debug`
/// rendering.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Emits an event asynchronously.
    ///
    /// # Arguments
    ///
    /// * `event_type` - The type of event (e.g., "pipeline.inspect")
    /// * `data` - Optional event data
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>);

    /// Emits an event without suspending.
    ///
    /// This method should never fail. Errors are logged but suppressed.
    fn try_emit(&self, event_type: &str, data: Option<serde_json::Value>);
}

/// A no-op event sink that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event_type: &str, _data: Option<serde_json::Value>) {}

    fn try_emit(&self, _event_type: &str, _data: Option<serde_json::Value>) {}
}

/// An event sink that logs events using the tracing framework.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    /// The log level to use.
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self::info()
    }
}

impl LoggingEventSink {
    /// Creates a new logging event sink with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging sink.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    /// Creates an info-level logging sink.
    #[must_use]
    pub fn info() -> Self {
        Self::new(Level::INFO)
    }

    /// Returns the configured level.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    fn log_event(&self, event_type: &str, data: Option<&serde_json::Value>) {
        let labels = data.and_then(|d| d.get("labels"));
        let item = data.and_then(|d| d.get("item"));

        match self.level {
            Level::TRACE => trace!(event_type = %event_type, labels = ?labels, item = ?item, "Event: {}", event_type),
            Level::DEBUG => debug!(event_type = %event_type, labels = ?labels, item = ?item, "Event: {}", event_type),
            Level::WARN | Level::ERROR => {
                warn!(event_type = %event_type, labels = ?labels, item = ?item, "Event: {}", event_type);
            }
            _ => info!(event_type = %event_type, labels = ?labels, item = ?item, "Event: {}", event_type),
        }
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.log_event(event_type, data.as_ref());
    }

    fn try_emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.log_event(event_type, data.as_ref());
    }
}

/// A collecting event sink for testing purposes.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: parking_lot::RwLock<Vec<(String, Option<serde_json::Value>)>>,
}

impl CollectingEventSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<(String, Option<serde_json::Value>)> {
        self.events.read().clone()
    }

    /// Returns the inspect records as `(first label, item)` pairs.
    ///
    /// Handy for asserting the order in which items passed each probe.
    #[must_use]
    pub fn inspected(&self) -> Vec<(String, String)> {
        self.events
            .read()
            .iter()
            .filter_map(|(_, data)| {
                let data = data.as_ref()?;
                let label = data
                    .get("labels")?
                    .get(0)
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let item = data.get("item")?.as_str()?.to_string();
                Some((label, item))
            })
            .collect()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears all collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Returns events matching a type prefix.
    #[must_use]
    pub fn events_of_type(&self, type_prefix: &str) -> Vec<(String, Option<serde_json::Value>)> {
        self.events
            .read()
            .iter()
            .filter(|(t, _)| t.starts_with(type_prefix))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.events.write().push((event_type.to_string(), data));
    }

    fn try_emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.events.write().push((event_type.to_string(), data));
    }
}
