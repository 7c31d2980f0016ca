//! Order lifecycle domain module.
//!
//! Status state machine, per-transition actor requirements, and the line-item
//! ledger rules, implemented as deterministic domain logic (no IO, no storage).

pub mod item;
pub mod order;
pub mod status;

pub use item::{ItemCount, MAX_ITEM_COUNT, MIN_ITEM_COUNT, NewOrderItem, OrderItem};
pub use order::{
    AdvanceStatus, DeleteOrder, Order, OrderCommand, OrderDeleted, OrderEvent, OrderPaid,
    OrderPlaced, OrderStatusAdvanced, PlaceOrder,
};
pub use status::OrderStatus;
