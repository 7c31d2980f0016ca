use chrono::{DateTime, Utc};

/// A domain-agnostic event.
///
/// Events are immutable facts ("order 5 was paid"), versioned for schema
/// evolution, and only ever emitted for changes that were accepted.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "order.paid").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
