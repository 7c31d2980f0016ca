//! Order operations: create, advance (with courier assignment on payment),
//! delete, and the role-scoped reads.

use chrono::Utc;
use serde_json::Value as JsonValue;

use yad_auth::{Actor, Role, authorize_self};
use yad_core::{AggregateRoot, CourierId, ExpectedVersion, OrderId, RestaurantId, UserId};
use yad_events::{EventBus, EventEnvelope};
use yad_infra::{RepositoryError, Store};
use yad_orders::{AdvanceStatus, DeleteOrder, Order, OrderCommand, OrderStatus, PlaceOrder};
use yad_parties::{Courier, CourierCommand, ReleaseCourier, ReserveCourier};

use crate::engine::{COURIER_AGGREGATE, Engine, ORDER_AGGREGATE, execute};
use crate::error::{ServiceError, ServiceResult};

impl<S, B> Engine<S, B>
where
    S: Store,
    B: EventBus<EventEnvelope<JsonValue>>,
{
    /// Place a new order (status `Created`) with a working restaurant.
    pub fn create_order(
        &self,
        actor: &Actor,
        restaurant_id: RestaurantId,
        delivery_price: u64,
    ) -> ServiceResult<Order> {
        let Some(user_id) = actor.as_user() else {
            tracing::warn!(%actor, "only users may place orders");
            return Err(ServiceError::Forbidden(format!("{actor} may not place orders")));
        };

        let restaurant = self
            .store()
            .load_restaurant(restaurant_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("restaurant {restaurant_id}")))?;
        restaurant.ensure_accepting_orders()?;

        let order_id = self.store().next_order_id()?;
        let (order, events) = execute(
            &Order::empty(order_id),
            OrderCommand::PlaceOrder(PlaceOrder {
                order_id,
                user_id,
                restaurant_id,
                delivery_price,
                occurred_at: Utc::now(),
            }),
        )?;
        self.store().save_order(&order, ExpectedVersion::Exact(0))?;
        self.publish(ORDER_AGGREGATE, order_id.get(), 0, &events);

        tracing::info!(%order_id, %user_id, %restaurant_id, "order placed");
        Ok(order)
    }

    /// Move an order exactly one status forward.
    ///
    /// The payment step also reserves the nearest waiting courier; if no
    /// courier can be reserved, the order stays `Created`. Delivery hands the
    /// courier back to `Waiting`.
    pub fn advance_order_status(
        &self,
        actor: &Actor,
        order_id: OrderId,
        target: OrderStatus,
    ) -> ServiceResult<Order> {
        let order = self.require_order(order_id)?;
        if let Err(err) = order.check_transition(actor, target) {
            tracing::warn!(%order_id, %actor, from = %order.status(), to = %target, "transition rejected: {err}");
            return Err(err.into());
        }

        if target == OrderStatus::Paid {
            return self.pay_order(actor, order);
        }

        let (next, events) = execute(
            &order,
            OrderCommand::AdvanceStatus(AdvanceStatus {
                order_id,
                actor: *actor,
                target,
                assigned_courier: None,
                occurred_at: Utc::now(),
            }),
        )?;
        self.store()
            .save_order(&next, ExpectedVersion::Exact(order.version()))?;
        self.publish(ORDER_AGGREGATE, order_id.get(), order.version(), &events);

        tracing::info!(%order_id, %actor, from = %order.status(), to = %target, "order status advanced");

        if target == OrderStatus::Delivered {
            if let Some(courier_id) = next.courier_id() {
                self.release_courier(courier_id, order_id);
            }
        }
        Ok(next)
    }

    /// `Created → Paid`: select-and-reserve a courier, then save the order.
    ///
    /// The reservation is an optimistic write on the courier; losing it to a
    /// concurrent payment retries with the next nearest courier, up to the
    /// configured number of attempts. If the order save fails the reservation
    /// is released again.
    fn pay_order(&self, actor: &Actor, order: Order) -> ServiceResult<Order> {
        let order_id = order.id_typed();
        let user = self
            .store()
            .load_user(order.user_id())?
            .ok_or_else(|| ServiceError::NotFound(format!("user {}", order.user_id())))?;

        let attempts = self.config().assignment_attempts;
        for attempt in 1..=attempts {
            let Some(candidate) = self.store().nearest_waiting_courier(user.address)? else {
                tracing::warn!(%order_id, "no courier is waiting; payment rejected");
                return Err(ServiceError::Unavailable(format!(
                    "no courier is available for order {order_id}"
                )));
            };
            let courier_id = candidate.id_typed();
            let now = Utc::now();

            let (reserved, courier_events) = execute(
                &candidate,
                CourierCommand::ReserveCourier(ReserveCourier {
                    courier_id,
                    order_id,
                    occurred_at: now,
                }),
            )?;
            match self
                .store()
                .save_courier(&reserved, ExpectedVersion::Exact(candidate.version()))
            {
                Ok(()) => {}
                Err(RepositoryError::Concurrency(_)) => {
                    tracing::debug!(%order_id, %courier_id, attempt, "courier reservation lost, retrying");
                    continue;
                }
                Err(err) => return Err(err.into()),
            }

            let paid = execute(
                &order,
                OrderCommand::AdvanceStatus(AdvanceStatus {
                    order_id,
                    actor: *actor,
                    target: OrderStatus::Paid,
                    assigned_courier: Some(courier_id),
                    occurred_at: now,
                }),
            )
            .and_then(|(next, events)| {
                self.store()
                    .save_order(&next, ExpectedVersion::Exact(order.version()))?;
                Ok((next, events))
            });

            return match paid {
                Ok((next, events)) => {
                    self.publish(COURIER_AGGREGATE, courier_id.get(), candidate.version(), &courier_events);
                    self.publish(ORDER_AGGREGATE, order_id.get(), order.version(), &events);
                    tracing::info!(%order_id, %courier_id, "order paid and courier assigned");
                    Ok(next)
                }
                Err(err) => {
                    tracing::warn!(%order_id, %courier_id, "payment failed after reservation: {err}");
                    self.release_courier(courier_id, order_id);
                    Err(err)
                }
            };
        }

        tracing::warn!(%order_id, attempts, "courier assignment search exhausted");
        Err(ServiceError::Conflict(format!(
            "assignment search exhausted after {attempts} attempts for order {order_id}"
        )))
    }

    /// Return a courier to `Waiting` after its order was delivered or its
    /// reservation could not be committed. Failures are logged, not returned:
    /// the order change they follow is already saved or already failed.
    fn release_courier(&self, courier_id: CourierId, order_id: OrderId) {
        let released = self.require_courier(courier_id).and_then(|courier: Courier| {
            let (next, events) = execute(
                &courier,
                CourierCommand::ReleaseCourier(ReleaseCourier {
                    courier_id,
                    order_id,
                    occurred_at: Utc::now(),
                }),
            )?;
            self.store()
                .save_courier(&next, ExpectedVersion::Exact(courier.version()))?;
            Ok((courier.version(), events))
        });

        match released {
            Ok((base_version, events)) => {
                self.publish(COURIER_AGGREGATE, courier_id.get(), base_version, &events);
                tracing::info!(%courier_id, %order_id, "courier reservation released");
            }
            Err(err) => {
                tracing::error!(%courier_id, %order_id, "failed to release courier reservation: {err}");
            }
        }
    }

    /// Delete an order. Only the owning user, and only while `Created`.
    pub fn delete_order(&self, actor: &Actor, order_id: OrderId) -> ServiceResult<()> {
        let order = self.require_order(order_id)?;
        let (_, events) = execute(
            &order,
            OrderCommand::DeleteOrder(DeleteOrder {
                order_id,
                actor: *actor,
                occurred_at: Utc::now(),
            }),
        )
        .inspect_err(|err| tracing::warn!(%order_id, %actor, "delete rejected: {err}"))?;

        self.store()
            .remove_order(order_id, ExpectedVersion::Exact(order.version()))?;
        self.publish(ORDER_AGGREGATE, order_id.get(), order.version(), &events);

        tracing::info!(%order_id, "order deleted");
        Ok(())
    }

    /// Read an order as any of its parties.
    pub fn get_order(&self, actor: &Actor, order_id: OrderId) -> ServiceResult<Order> {
        let order = self.require_order(order_id)?;
        order.authorize_read(actor)?;
        tracing::debug!(%order_id, %actor, "order read");
        Ok(order)
    }

    pub fn list_user_orders(
        &self,
        actor: &Actor,
        user_id: UserId,
        active_only: bool,
    ) -> ServiceResult<Vec<Order>> {
        authorize_self(actor, Role::User, user_id.get())?;
        let orders = self.store().list_user_orders(user_id, active_only)?;
        tracing::debug!(%user_id, active_only, count = orders.len(), "user orders listed");
        Ok(orders)
    }

    /// Orders of the restaurant that are paid and waiting to be prepared.
    pub fn list_active_restaurant_orders(
        &self,
        actor: &Actor,
        restaurant_id: RestaurantId,
    ) -> ServiceResult<Vec<Order>> {
        authorize_self(actor, Role::Restaurant, restaurant_id.get())?;
        let orders = self
            .store()
            .list_restaurant_orders(restaurant_id, OrderStatus::Paid)?;
        tracing::debug!(%restaurant_id, count = orders.len(), "restaurant orders listed");
        Ok(orders)
    }

    pub fn get_active_courier_order(
        &self,
        actor: &Actor,
        courier_id: CourierId,
    ) -> ServiceResult<Order> {
        authorize_self(actor, Role::Courier, courier_id.get())?;
        self.store()
            .active_courier_order(courier_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("courier {courier_id} has no active order")))
    }
}
