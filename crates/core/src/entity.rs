//! Entities: records that keep a serial id across changes (users, restaurants,
//! menu items, order items). Orders and couriers are aggregates instead.

pub trait Entity {
    /// One of the serial id newtypes from [`crate::id`].
    type Id: Copy + Ord + core::fmt::Display + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
