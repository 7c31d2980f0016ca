//! Marketplace parties: couriers (with their availability state machine),
//! restaurants and their menus, and end users.
//!
//! Deterministic domain logic only (no IO, no storage).

pub mod courier;
pub mod restaurant;
pub mod user;

pub use courier::{
    Courier, CourierChanges, CourierCommand, CourierContact, CourierEvent, CourierProfileUpdated,
    CourierRegistered, CourierReleased, CourierReserved, CourierStatusChanged, RegisterCourier,
    ReleaseCourier, ReserveCourier, UpdateCourier, WorkingStatus,
};
pub use restaurant::{MenuItem, NewMenuItem, NewRestaurant, Restaurant, RestaurantStatus};
pub use user::{NewUser, User};
