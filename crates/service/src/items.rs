//! Order item ledger.
//!
//! Writes are reserved to the user who owns the order; every party of the order
//! may read. An item is always addressed through its order.

use serde_json::Value as JsonValue;

use yad_auth::Actor;
use yad_core::{MenuItemId, OrderId, OrderItemId};
use yad_events::{EventBus, EventEnvelope};
use yad_infra::Store;
use yad_orders::{ItemCount, NewOrderItem, OrderItem};

use crate::engine::Engine;
use crate::error::{ServiceError, ServiceResult};

impl<S, B> Engine<S, B>
where
    S: Store,
    B: EventBus<EventEnvelope<JsonValue>>,
{
    pub fn create_order_item(
        &self,
        actor: &Actor,
        order_id: OrderId,
        menu_item_id: MenuItemId,
        count: u32,
    ) -> ServiceResult<OrderItem> {
        let order = self.require_order(order_id)?;
        order.authorize_item_write(actor)?;
        let count = ItemCount::new(count)?;

        let menu_item = self
            .store()
            .load_menu_item(menu_item_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("menu item {menu_item_id}")))?;
        menu_item.ensure_offered_by(order.restaurant_id())?;

        let item = self.store().insert_item(NewOrderItem {
            order_id,
            menu_item_id,
            count,
        })?;

        tracing::info!(%order_id, item_id = %item.id, %menu_item_id, %count, "order item added");
        Ok(item)
    }

    pub fn get_order_item(
        &self,
        actor: &Actor,
        order_id: OrderId,
        item_id: OrderItemId,
    ) -> ServiceResult<OrderItem> {
        self.require_order(order_id)?.authorize_read(actor)?;
        self.require_item(order_id, item_id)
    }

    pub fn list_order_items(&self, actor: &Actor, order_id: OrderId) -> ServiceResult<Vec<OrderItem>> {
        self.require_order(order_id)?.authorize_read(actor)?;
        let items = self.store().list_items(order_id)?;
        tracing::debug!(%order_id, count = items.len(), "order items listed");
        Ok(items)
    }

    pub fn update_order_item(
        &self,
        actor: &Actor,
        order_id: OrderId,
        item_id: OrderItemId,
        count: u32,
    ) -> ServiceResult<OrderItem> {
        self.require_order(order_id)?.authorize_item_write(actor)?;
        let count = ItemCount::new(count)?;
        self.require_item(order_id, item_id)?;

        let item = self.store().update_item_count(item_id, count)?;
        tracing::info!(%order_id, %item_id, %count, "order item updated");
        Ok(item)
    }

    pub fn delete_order_item(
        &self,
        actor: &Actor,
        order_id: OrderId,
        item_id: OrderItemId,
    ) -> ServiceResult<()> {
        self.require_order(order_id)?.authorize_item_write(actor)?;
        self.require_item(order_id, item_id)?;

        self.store().remove_item(item_id)?;
        tracing::info!(%order_id, %item_id, "order item removed");
        Ok(())
    }

    /// Load an item and make sure it belongs to `order_id`.
    fn require_item(&self, order_id: OrderId, item_id: OrderItemId) -> ServiceResult<OrderItem> {
        let item = self
            .store()
            .load_item(item_id)?
            .ok_or_else(|| ServiceError::NotFound("no such item for this order".to_string()))?;
        item.ensure_belongs_to(order_id)?;
        Ok(item)
    }
}
