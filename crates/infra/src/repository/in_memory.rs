use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError, TryLockResult};
use std::thread;
use std::time::{Duration, Instant};

use yad_core::{
    AggregateRoot, CourierId, Entity, ExpectedVersion, Location, MenuItemId, OrderId, OrderItemId,
    RestaurantId, UserId,
};
use yad_orders::{ItemCount, NewOrderItem, Order, OrderItem, OrderStatus};
use yad_parties::{Courier, MenuItem, NewMenuItem, NewRestaurant, NewUser, Restaurant, User};

use super::r#trait::{CourierStore, DirectoryStore, OrderItemStore, OrderStore, RepositoryError};

/// Serial id counters, one per table.
#[derive(Debug, Default)]
struct Sequences {
    order: i64,
    item: i64,
    courier: i64,
    user: i64,
    restaurant: i64,
    menu_item: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Store a freshly numbered record under its own id and hand back a copy.
fn index<E: Entity + Clone>(table: &mut BTreeMap<E::Id, E>, record: E) -> E {
    table.insert(*record.id(), record.clone());
    record
}

#[derive(Debug, Default)]
struct State {
    seq: Sequences,
    orders: BTreeMap<OrderId, Order>,
    items: BTreeMap<OrderItemId, OrderItem>,
    couriers: BTreeMap<CourierId, Courier>,
    users: BTreeMap<UserId, User>,
    restaurants: BTreeMap<RestaurantId, Restaurant>,
    menu: BTreeMap<MenuItemId, MenuItem>,
}

impl State {
    fn items_of(&self, order_id: OrderId) -> impl Iterator<Item = &OrderItem> + '_ {
        self.items.values().filter(move |item| item.order_id == order_id)
    }

    /// Σ count × menu price over `items`, or `Overflow` when it does not fit a `u64`.
    ///
    /// Callers total the prospective item set before touching any table.
    fn checked_total<'a>(
        &self,
        order_id: OrderId,
        items: impl IntoIterator<Item = &'a OrderItem>,
    ) -> Result<u64, RepositoryError> {
        items.into_iter().try_fold(0u64, |total, item| {
            let price = self.menu.get(&item.menu_item_id).map_or(0, |m| m.price);
            price
                .checked_mul(u64::from(item.count.get()))
                .and_then(|line| total.checked_add(line))
                .ok_or_else(|| RepositoryError::Overflow(format!("total price of order {order_id}")))
        })
    }

    fn record_total(&mut self, order_id: OrderId, total: u64) {
        if let Some(order) = self.orders.get_mut(&order_id) {
            order.record_total_price(total);
        }
    }
}

/// In-memory repository.
///
/// One lock guards all tables, so every call is a single atomic step. Lock
/// acquisition gives up after `timeout` instead of blocking indefinitely.
#[derive(Debug)]
pub struct InMemoryStore {
    state: RwLock<State>,
    timeout: Duration,
}

impl InMemoryStore {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);
    /// Bounds of the sleep between attempts on a contended lock.
    const MIN_BACKOFF: Duration = Duration::from_micros(50);
    const MAX_BACKOFF: Duration = Duration::from_millis(1);

    pub fn new() -> Self {
        Self::with_timeout(Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            state: RwLock::new(State::default()),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn acquire<G>(&self, try_lock: impl Fn() -> TryLockResult<G>) -> Result<G, RepositoryError> {
        let deadline = Instant::now() + self.timeout;
        let mut backoff = Self::MIN_BACKOFF;
        loop {
            match try_lock() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::Poisoned(_)) => return Err(RepositoryError::Poisoned),
                Err(TryLockError::WouldBlock) => {
                    let now = Instant::now();
                    if now >= deadline {
                        let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                        tracing::warn!(timeout_ms, "repository lock timed out");
                        return Err(RepositoryError::Timeout(timeout_ms));
                    }
                    thread::sleep(backoff.min(deadline - now));
                    backoff = (backoff * 2).min(Self::MAX_BACKOFF);
                }
            }
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, RepositoryError> {
        self.acquire(|| self.state.try_read())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, RepositoryError> {
        self.acquire(|| self.state.try_write())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn check_version(
    what: impl core::fmt::Display,
    expected: ExpectedVersion,
    current: u64,
) -> Result<(), RepositoryError> {
    if expected.matches(current) {
        Ok(())
    } else {
        Err(RepositoryError::Concurrency(format!(
            "{what}: expected {expected:?}, found {current}"
        )))
    }
}

impl OrderStore for InMemoryStore {
    fn next_order_id(&self) -> Result<OrderId, RepositoryError> {
        let mut state = self.write()?;
        Ok(OrderId::new(next(&mut state.seq.order)))
    }

    fn load_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.read()?.orders.get(&id).cloned())
    }

    fn save_order(&self, order: &Order, expected: ExpectedVersion) -> Result<(), RepositoryError> {
        let mut state = self.write()?;
        let id = order.id_typed();
        let (current, total) = state
            .orders
            .get(&id)
            .map_or((0, 0), |o| (o.version(), o.total_price()));
        check_version(format_args!("order {id}"), expected, current)?;

        let mut order = order.clone();
        order.record_total_price(total);
        state.orders.insert(id, order);
        Ok(())
    }

    fn remove_order(&self, id: OrderId, expected: ExpectedVersion) -> Result<(), RepositoryError> {
        let mut state = self.write()?;
        let current = state
            .orders
            .get(&id)
            .map(|o| o.version())
            .ok_or_else(|| RepositoryError::NotFound(format!("order {id}")))?;
        check_version(format_args!("order {id}"), expected, current)?;

        state.orders.remove(&id);
        state.items.retain(|_, item| item.order_id != id);
        Ok(())
    }

    fn list_user_orders(
        &self,
        user_id: UserId,
        active_only: bool,
    ) -> Result<Vec<Order>, RepositoryError> {
        let state = self.read()?;
        Ok(state
            .orders
            .values()
            .filter(|o| o.user_id() == user_id && (!active_only || o.is_active()))
            .cloned()
            .collect())
    }

    fn list_restaurant_orders(
        &self,
        restaurant_id: RestaurantId,
        status: OrderStatus,
    ) -> Result<Vec<Order>, RepositoryError> {
        let state = self.read()?;
        Ok(state
            .orders
            .values()
            .filter(|o| o.restaurant_id() == restaurant_id && o.status() == status)
            .cloned()
            .collect())
    }

    fn active_courier_order(&self, courier_id: CourierId) -> Result<Option<Order>, RepositoryError> {
        let state = self.read()?;
        Ok(state
            .orders
            .values()
            .find(|o| o.holds_courier(courier_id))
            .cloned())
    }
}

impl OrderItemStore for InMemoryStore {
    fn insert_item(&self, item: NewOrderItem) -> Result<OrderItem, RepositoryError> {
        let mut state = self.write()?;
        if !state.orders.contains_key(&item.order_id) {
            return Err(RepositoryError::NotFound(format!("order {}", item.order_id)));
        }

        let order_id = item.order_id;
        let item = OrderItem::from_new(OrderItemId::new(state.seq.item + 1), item);
        let total = state.checked_total(order_id, state.items_of(order_id).chain([&item]))?;

        next(&mut state.seq.item);
        let item = index(&mut state.items, item);
        state.record_total(order_id, total);
        Ok(item)
    }

    fn load_item(&self, id: OrderItemId) -> Result<Option<OrderItem>, RepositoryError> {
        Ok(self.read()?.items.get(&id).cloned())
    }

    fn list_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let state = self.read()?;
        Ok(state
            .items
            .values()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect())
    }

    fn update_item_count(
        &self,
        id: OrderItemId,
        count: ItemCount,
    ) -> Result<OrderItem, RepositoryError> {
        let mut state = self.write()?;
        let mut updated = state
            .items
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("order item {id}")))?;
        updated.count = count;
        let order_id = updated.order_id;
        let others = state.items_of(order_id).filter(|item| item.id != id);
        let total = state.checked_total(order_id, others.chain([&updated]))?;

        state.items.insert(id, updated.clone());
        state.record_total(order_id, total);
        Ok(updated)
    }

    fn remove_item(&self, id: OrderItemId) -> Result<(), RepositoryError> {
        let mut state = self.write()?;
        let order_id = state
            .items
            .get(&id)
            .map(|item| item.order_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("order item {id}")))?;
        let remaining = state.items_of(order_id).filter(|item| item.id != id);
        let total = state.checked_total(order_id, remaining)?;

        state.items.remove(&id);
        state.record_total(order_id, total);
        Ok(())
    }
}

impl CourierStore for InMemoryStore {
    fn next_courier_id(&self) -> Result<CourierId, RepositoryError> {
        let mut state = self.write()?;
        Ok(CourierId::new(next(&mut state.seq.courier)))
    }

    fn load_courier(&self, id: CourierId) -> Result<Option<Courier>, RepositoryError> {
        Ok(self.read()?.couriers.get(&id).cloned())
    }

    fn save_courier(
        &self,
        courier: &Courier,
        expected: ExpectedVersion,
    ) -> Result<(), RepositoryError> {
        let mut state = self.write()?;
        let id = courier.id_typed();
        let current = state.couriers.get(&id).map_or(0, |c| c.version());
        check_version(format_args!("courier {id}"), expected, current)?;

        state.couriers.insert(id, courier.clone());
        Ok(())
    }

    fn nearest_waiting_courier(&self, origin: Location) -> Result<Option<Courier>, RepositoryError> {
        let state = self.read()?;
        Ok(state
            .couriers
            .values()
            .filter(|c| c.is_waiting())
            .min_by(|a, b| {
                origin
                    .distance_km(&a.location())
                    .total_cmp(&origin.distance_km(&b.location()))
            })
            .cloned())
    }
}

impl DirectoryStore for InMemoryStore {
    fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut state = self.write()?;
        if state.users.values().any(|u| u.phone == user.phone) {
            return Err(RepositoryError::Duplicate(format!("user with phone {}", user.phone)));
        }
        let id = UserId::new(next(&mut state.seq.user));
        Ok(index(&mut state.users, User::from_new(id, user)))
    }

    fn load_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    fn insert_restaurant(&self, restaurant: NewRestaurant) -> Result<Restaurant, RepositoryError> {
        let mut state = self.write()?;
        let id = RestaurantId::new(next(&mut state.seq.restaurant));
        Ok(index(&mut state.restaurants, Restaurant::from_new(id, restaurant)))
    }

    fn load_restaurant(&self, id: RestaurantId) -> Result<Option<Restaurant>, RepositoryError> {
        Ok(self.read()?.restaurants.get(&id).cloned())
    }

    fn save_restaurant(&self, restaurant: &Restaurant) -> Result<(), RepositoryError> {
        let mut state = self.write()?;
        let slot = state
            .restaurants
            .get_mut(&restaurant.id)
            .ok_or_else(|| RepositoryError::NotFound(format!("restaurant {}", restaurant.id)))?;
        *slot = restaurant.clone();
        Ok(())
    }

    fn insert_menu_item(&self, item: NewMenuItem) -> Result<MenuItem, RepositoryError> {
        let mut state = self.write()?;
        if !state.restaurants.contains_key(&item.restaurant_id) {
            return Err(RepositoryError::NotFound(format!(
                "restaurant {}",
                item.restaurant_id
            )));
        }
        let id = MenuItemId::new(next(&mut state.seq.menu_item));
        Ok(index(
            &mut state.menu,
            MenuItem {
                id,
                restaurant_id: item.restaurant_id,
                title: item.title,
                price: item.price,
            },
        ))
    }

    fn load_menu_item(&self, id: MenuItemId) -> Result<Option<MenuItem>, RepositoryError> {
        Ok(self.read()?.menu.get(&id).cloned())
    }
}
