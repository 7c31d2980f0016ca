//! Operation pipeline shared by every engine operation.
//!
//! ```text
//! (actor, request)
//!   ↓
//! 1. Load current state from the store
//!   ↓
//! 2. Authorize + handle the command (pure, produces events)
//!   ↓
//! 3. Save with an optimistic version check
//!   ↓
//! 4. Publish the committed events (failures are logged, never returned)
//! ```

use serde::Serialize;
use serde_json::Value as JsonValue;

use yad_core::{Aggregate, CourierId, DomainError, OrderId};
use yad_events::{Event, EventBus, EventEnvelope};
use yad_infra::Store;
use yad_orders::Order;
use yad_parties::Courier;

use crate::config::EngineConfig;
use crate::error::{ServiceError, ServiceResult};

pub(crate) const ORDER_AGGREGATE: &str = "order";
pub(crate) const COURIER_AGGREGATE: &str = "courier";

/// The order lifecycle engine.
///
/// Stateless between calls: all state lives in the store `S`; committed
/// lifecycle events go out on the bus `B`. Share it across threads behind an
/// `Arc`.
#[derive(Debug)]
pub struct Engine<S, B> {
    store: S,
    bus: B,
    config: EngineConfig,
}

impl<S, B> Engine<S, B> {
    pub fn new(store: S, bus: B, config: EngineConfig) -> Self {
        Self { store, bus, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// Run a command against a copy of `aggregate`, returning the evolved copy and
/// the events that produced it. `aggregate` itself is left untouched.
pub(crate) fn execute<A>(aggregate: &A, command: A::Command) -> ServiceResult<(A, Vec<A::Event>)>
where
    A: Aggregate<Error = DomainError> + Clone,
{
    let events = aggregate.handle(&command)?;
    let mut next = aggregate.clone();
    for event in &events {
        next.apply(event);
    }
    Ok((next, events))
}

impl<S, B> Engine<S, B>
where
    S: Store,
    B: EventBus<EventEnvelope<JsonValue>>,
{
    /// Publish events committed on top of `base_version`.
    ///
    /// Event `i` carries sequence number `base_version + i + 1`, i.e. the
    /// aggregate version right after it was applied.
    pub(crate) fn publish<E>(
        &self,
        aggregate_type: &str,
        aggregate_id: i64,
        base_version: u64,
        events: &[E],
    ) where
        E: Event + Serialize,
    {
        for (sequence_number, event) in (base_version + 1..).zip(events) {
            let envelope =
                match EventEnvelope::from_typed(aggregate_type, aggregate_id, sequence_number, event) {
                    Ok(envelope) => envelope,
                    Err(err) => {
                        tracing::warn!(
                            aggregate_type,
                            aggregate_id,
                            event_type = event.event_type(),
                            "failed to build event envelope: {err}"
                        );
                        continue;
                    }
                };

            if let Err(err) = self.bus.publish(envelope) {
                tracing::warn!(
                    aggregate_type,
                    aggregate_id,
                    event_type = event.event_type(),
                    "event publication failed: {err:?}"
                );
            }
        }
    }

    pub(crate) fn require_order(&self, order_id: OrderId) -> ServiceResult<Order> {
        self.store
            .load_order(order_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("order {order_id}")))
    }

    pub(crate) fn require_courier(&self, courier_id: CourierId) -> ServiceResult<Courier> {
        self.store
            .load_courier(courier_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("courier {courier_id}")))
    }
}
