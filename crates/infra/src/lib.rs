//! Infrastructure layer: the order repository collaborator.
//!
//! Store traits plus an in-memory implementation with optimistic versions,
//! bounded lock acquisition and a derived order total.

pub mod repository;


pub use repository::{
    CourierStore, DirectoryStore, InMemoryStore, OrderItemStore, OrderStore, RepositoryError,
    Store,
};
