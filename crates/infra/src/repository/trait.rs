use thiserror::Error;

use yad_core::{
    CourierId, ExpectedVersion, Location, MenuItemId, OrderId, OrderItemId, RestaurantId, UserId,
};
use yad_orders::{ItemCount, NewOrderItem, Order, OrderItem, OrderStatus};
use yad_parties::{Courier, MenuItem, NewMenuItem, NewRestaurant, NewUser, Restaurant, User};

/// Repository operation error.
///
/// Infrastructure failures (storage, concurrency, lock acquisition) as opposed to
/// domain errors (validation, authorization, lifecycle rules).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Optimistic concurrency check failed: somebody else wrote first.
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    /// A write referenced a record that does not exist.
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("duplicate record: {0}")]
    Duplicate(String),

    /// A derived amount (such as an order total) does not fit its column.
    #[error("amount out of range: {0}")]
    Overflow(String),

    /// The store could not be acquired within the caller-supplied timeout.
    #[error("repository call timed out after {0} ms")]
    Timeout(u64),

    #[error("repository lock poisoned")]
    Poisoned,
}

/// Orders, persisted as current state with a version for optimistic writes.
///
/// `total_price` is owned by the store: it is derived from the order's items on
/// every item mutation, and `save_order` never overwrites it.
pub trait OrderStore: Send + Sync {
    /// Allocate the id of a new order.
    fn next_order_id(&self) -> Result<OrderId, RepositoryError>;

    fn load_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Insert or replace an order if the stored version matches `expected`
    /// (an absent order is at version 0).
    fn save_order(&self, order: &Order, expected: ExpectedVersion) -> Result<(), RepositoryError>;

    /// Remove an order and all of its items.
    fn remove_order(&self, id: OrderId, expected: ExpectedVersion) -> Result<(), RepositoryError>;

    fn list_user_orders(
        &self,
        user_id: UserId,
        active_only: bool,
    ) -> Result<Vec<Order>, RepositoryError>;

    fn list_restaurant_orders(
        &self,
        restaurant_id: RestaurantId,
        status: OrderStatus,
    ) -> Result<Vec<Order>, RepositoryError>;

    /// The active order (Paid..=EnRoute) assigned to `courier_id`, if any.
    fn active_courier_order(&self, courier_id: CourierId) -> Result<Option<Order>, RepositoryError>;
}

/// Line items. Every mutation recomputes the parent order's total price.
pub trait OrderItemStore: Send + Sync {
    /// Fails with `NotFound` if the order is gone.
    fn insert_item(&self, item: NewOrderItem) -> Result<OrderItem, RepositoryError>;

    fn load_item(&self, id: OrderItemId) -> Result<Option<OrderItem>, RepositoryError>;

    fn list_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError>;

    fn update_item_count(
        &self,
        id: OrderItemId,
        count: ItemCount,
    ) -> Result<OrderItem, RepositoryError>;

    fn remove_item(&self, id: OrderItemId) -> Result<(), RepositoryError>;
}

/// Couriers and the nearest-courier query used for assignment.
pub trait CourierStore: Send + Sync {
    fn next_courier_id(&self) -> Result<CourierId, RepositoryError>;

    fn load_courier(&self, id: CourierId) -> Result<Option<Courier>, RepositoryError>;

    fn save_courier(
        &self,
        courier: &Courier,
        expected: ExpectedVersion,
    ) -> Result<(), RepositoryError>;

    /// Point-in-time snapshot of the waiting courier closest to `origin`
    /// (ties broken by lowest id). Reserving it is the caller's optimistic write.
    fn nearest_waiting_courier(&self, origin: Location) -> Result<Option<Courier>, RepositoryError>;
}

/// Plain catalog data: users, restaurants and their menus.
pub trait DirectoryStore: Send + Sync {
    fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError>;

    fn load_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    fn insert_restaurant(&self, restaurant: NewRestaurant) -> Result<Restaurant, RepositoryError>;

    fn load_restaurant(&self, id: RestaurantId) -> Result<Option<Restaurant>, RepositoryError>;

    /// Replace an existing restaurant record.
    fn save_restaurant(&self, restaurant: &Restaurant) -> Result<(), RepositoryError>;

    /// Fails with `NotFound` if the restaurant does not exist.
    fn insert_menu_item(&self, item: NewMenuItem) -> Result<MenuItem, RepositoryError>;

    fn load_menu_item(&self, id: MenuItemId) -> Result<Option<MenuItem>, RepositoryError>;
}

/// Everything the engine needs from persistence.
pub trait Store: OrderStore + OrderItemStore + CourierStore + DirectoryStore {}

impl<S> Store for S where S: OrderStore + OrderItemStore + CourierStore + DirectoryStore {}
