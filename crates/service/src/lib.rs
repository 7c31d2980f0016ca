//! `yad-service`: the order lifecycle engine.
//!
//! Every operation takes the already-authenticated [`Actor`](yad_auth::Actor),
//! runs the authorization guard and the relevant state machine, persists through
//! the store, and only then publishes lifecycle events.

pub mod accounts;
pub mod config;
pub mod couriers;
pub mod engine;
pub mod error;
pub mod items;
pub mod orders;

pub use config::{ConfigError, EngineConfig};
pub use engine::Engine;
pub use error::{ServiceError, ServiceResult};

use std::sync::Arc;

use serde_json::Value as JsonValue;

use yad_events::{EventEnvelope, InMemoryEventBus};
use yad_infra::InMemoryStore;

/// Event bus type used by single-process deployments and tests.
pub type InMemoryBus = Arc<InMemoryEventBus<EventEnvelope<JsonValue>>>;

/// An engine over the in-memory store and bus, honouring the configured
/// repository timeout.
pub fn in_memory_engine(config: EngineConfig) -> Engine<InMemoryStore, InMemoryBus> {
    let store = InMemoryStore::with_timeout(config.repository_timeout);
    Engine::new(store, Arc::new(InMemoryEventBus::new()), config)
}
