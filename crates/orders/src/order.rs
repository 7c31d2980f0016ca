use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use yad_auth::{Actor, OrderParties, Role, authorize_order_access, authorize_order_owner};
use yad_core::{
    Aggregate, AggregateRoot, CourierId, DomainError, DomainResult, OrderId, RestaurantId, UserId,
};
use yad_events::Event;

use crate::status::OrderStatus;

/// Aggregate root: Order.
///
/// Invariants:
/// - `status` only moves forward, exactly one step per accepted change.
/// - `courier_id` is unset while `status == Created` and set from `Paid` on.
/// - `paid_at` is stamped by the `Created → Paid` transition.
/// - `total_price` is derived by the repository from the line items; this type
///   only carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    restaurant_id: RestaurantId,
    courier_id: Option<CourierId>,
    delivery_price: u64,
    total_price: u64,
    status: OrderStatus,
    paid_at: Option<DateTime<Utc>>,
    version: u64,
    #[serde(skip)]
    created: bool,
    #[serde(skip)]
    deleted: bool,
}

impl Order {
    /// Create an empty, not-yet-placed order for the given (repository-allocated) id.
    pub fn empty(id: OrderId) -> Self {
        Self {
            id,
            user_id: UserId::new(0),
            restaurant_id: RestaurantId::new(0),
            courier_id: None,
            delivery_price: 0,
            total_price: 0,
            status: OrderStatus::Created,
            paid_at: None,
            version: 0,
            created: false,
            deleted: false,
        }
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn restaurant_id(&self) -> RestaurantId {
        self.restaurant_id
    }

    pub fn courier_id(&self) -> Option<CourierId> {
        self.courier_id
    }

    pub fn delivery_price(&self) -> u64 {
        self.delivery_price
    }

    pub fn total_price(&self) -> u64 {
        self.total_price
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn paid_at(&self) -> Option<DateTime<Utc>> {
        self.paid_at
    }

    pub fn is_placed(&self) -> bool {
        self.created && !self.deleted
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Whether this order is active and assigned to `courier_id`.
    pub fn holds_courier(&self, courier_id: CourierId) -> bool {
        self.is_active() && self.courier_id == Some(courier_id)
    }

    pub fn parties(&self) -> OrderParties {
        OrderParties {
            user_id: self.user_id,
            restaurant_id: self.restaurant_id,
            courier_id: self.courier_id,
        }
    }

    /// Stamp the repository-derived total price.
    ///
    /// Not a state change: it does not bump `version`.
    pub fn record_total_price(&mut self, total_price: u64) {
        self.total_price = total_price;
    }

    /// Reads (order and items) are open to every party the order references.
    pub fn authorize_read(&self, actor: &Actor) -> DomainResult<()> {
        self.ensure_placed()?;
        authorize_order_access(actor, &self.parties())?;
        Ok(())
    }

    /// Line items may only be mutated by the owning user.
    pub fn authorize_item_write(&self, actor: &Actor) -> DomainResult<()> {
        self.ensure_placed()?;
        authorize_order_owner(actor, &self.parties(), Role::User)?;
        Ok(())
    }

    /// Validate a status change without producing events.
    ///
    /// Callers use this before doing expensive or side-effecting work (such as
    /// reserving a courier) so that a doomed request fails first.
    pub fn check_transition(&self, actor: &Actor, target: OrderStatus) -> DomainResult<()> {
        self.ensure_placed()?;
        authorize_order_access(actor, &self.parties())?;

        if target.code() - self.status.code() != 1 {
            return Err(DomainError::invalid_transition(format!(
                "order {} cannot move from {} to {}",
                self.id, self.status, target
            )));
        }

        let Some(role) = target.entitled_role() else {
            return Err(DomainError::validation(format!(
                "{target} is not a reachable order status"
            )));
        };

        authorize_order_owner(actor, &self.parties(), role)
            .map_err(|e| DomainError::invalid_transition(format!("{target}: {e}")))
    }

    fn ensure_placed(&self) -> DomainResult<()> {
        if self.is_placed() {
            Ok(())
        } else {
            Err(DomainError::not_found(format!("order {}", self.id)))
        }
    }

    fn ensure_order_id(&self, order_id: OrderId) -> DomainResult<()> {
        if self.id != order_id {
            return Err(DomainError::invariant("order_id mismatch"));
        }
        Ok(())
    }
}

impl AggregateRoot for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: PlaceOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub restaurant_id: RestaurantId,
    /// Externally priced; the engine does not compute fees.
    pub delivery_price: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AdvanceStatus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceStatus {
    pub order_id: OrderId,
    pub actor: Actor,
    pub target: OrderStatus,
    /// The courier reserved for this order; required for `Paid`, absent otherwise.
    pub assigned_courier: Option<CourierId>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DeleteOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOrder {
    pub order_id: OrderId,
    pub actor: Actor,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderCommand {
    PlaceOrder(PlaceOrder),
    AdvanceStatus(AdvanceStatus),
    DeleteOrder(DeleteOrder),
}

/// Event: OrderPlaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlaced {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub restaurant_id: RestaurantId,
    pub delivery_price: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderPaid (also records the courier assignment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPaid {
    pub order_id: OrderId,
    pub courier_id: CourierId,
    pub paid_at: DateTime<Utc>,
}

/// Event: OrderStatusAdvanced (every step after payment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusAdvanced {
    pub order_id: OrderId,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderDeleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDeleted {
    pub order_id: OrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    OrderPlaced(OrderPlaced),
    OrderPaid(OrderPaid),
    OrderStatusAdvanced(OrderStatusAdvanced),
    OrderDeleted(OrderDeleted),
}

impl Event for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderPlaced(_) => "order.placed",
            OrderEvent::OrderPaid(_) => "order.paid",
            OrderEvent::OrderStatusAdvanced(_) => "order.status_advanced",
            OrderEvent::OrderDeleted(_) => "order.deleted",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::OrderPlaced(e) => e.occurred_at,
            OrderEvent::OrderPaid(e) => e.paid_at,
            OrderEvent::OrderStatusAdvanced(e) => e.occurred_at,
            OrderEvent::OrderDeleted(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Order {
    type Command = OrderCommand;
    type Event = OrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            OrderEvent::OrderPlaced(e) => {
                self.id = e.order_id;
                self.user_id = e.user_id;
                self.restaurant_id = e.restaurant_id;
                self.delivery_price = e.delivery_price;
                self.courier_id = None;
                self.total_price = 0;
                self.status = OrderStatus::Created;
                self.paid_at = None;
                self.created = true;
            }
            OrderEvent::OrderPaid(e) => {
                self.status = OrderStatus::Paid;
                self.courier_id = Some(e.courier_id);
                self.paid_at = Some(e.paid_at);
            }
            OrderEvent::OrderStatusAdvanced(e) => {
                self.status = e.to;
            }
            OrderEvent::OrderDeleted(_) => {
                self.deleted = true;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::PlaceOrder(cmd) => self.handle_place(cmd),
            OrderCommand::AdvanceStatus(cmd) => self.handle_advance(cmd),
            OrderCommand::DeleteOrder(cmd) => self.handle_delete(cmd),
        }
    }
}

impl Order {
    fn handle_place(&self, cmd: &PlaceOrder) -> DomainResult<Vec<OrderEvent>> {
        if self.created {
            return Err(DomainError::conflict(format!("order {} already exists", cmd.order_id)));
        }
        self.ensure_order_id(cmd.order_id)?;

        Ok(vec![OrderEvent::OrderPlaced(OrderPlaced {
            order_id: cmd.order_id,
            user_id: cmd.user_id,
            restaurant_id: cmd.restaurant_id,
            delivery_price: cmd.delivery_price,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_advance(&self, cmd: &AdvanceStatus) -> DomainResult<Vec<OrderEvent>> {
        self.ensure_order_id(cmd.order_id)?;
        self.check_transition(&cmd.actor, cmd.target)?;

        match (cmd.target, cmd.assigned_courier) {
            (OrderStatus::Paid, Some(courier_id)) => Ok(vec![OrderEvent::OrderPaid(OrderPaid {
                order_id: cmd.order_id,
                courier_id,
                paid_at: cmd.occurred_at,
            })]),
            (OrderStatus::Paid, None) => Err(DomainError::invariant(
                "a paid order must have a courier assigned",
            )),
            (_, Some(_)) => Err(DomainError::invariant(
                "a courier can only be assigned by the payment transition",
            )),
            (target, None) => Ok(vec![OrderEvent::OrderStatusAdvanced(OrderStatusAdvanced {
                order_id: cmd.order_id,
                from: self.status,
                to: target,
                occurred_at: cmd.occurred_at,
            })]),
        }
    }

    fn handle_delete(&self, cmd: &DeleteOrder) -> DomainResult<Vec<OrderEvent>> {
        self.ensure_placed()?;
        self.ensure_order_id(cmd.order_id)?;
        authorize_order_owner(&cmd.actor, &self.parties(), Role::User)?;

        if self.status != OrderStatus::Created {
            return Err(DomainError::conflict(format!(
                "order {} is {} and can no longer be deleted",
                self.id, self.status
            )));
        }

        Ok(vec![OrderEvent::OrderDeleted(OrderDeleted {
            order_id: cmd.order_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
