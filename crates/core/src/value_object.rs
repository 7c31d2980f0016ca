//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity and are compared by their attribute values
/// (a [`Location`](crate::Location) is the same place whichever courier or
/// user it is attached to). They are immutable: to "change" one, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
