//! Order repository boundary.
//!
//! The engine only sees the traits in [`r#trait`]; [`InMemoryStore`] is the
//! implementation used by tests, the demo binary and single-process deployments.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryStore;
pub use r#trait::{
    CourierStore, DirectoryStore, OrderItemStore, OrderStore, RepositoryError, Store,
};
