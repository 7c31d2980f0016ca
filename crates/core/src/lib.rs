//! `yad-core`: domain foundation building blocks for the delivery marketplace.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod geo;
pub mod id;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use geo::Location;
pub use id::{AdminId, CourierId, MenuItemId, OrderId, OrderItemId, RestaurantId, UserId};
pub use value_object::ValueObject;
