use serde::{Deserialize, Serialize};

use yad_core::{
    DomainError, DomainResult, Entity, MenuItemId, OrderId, OrderItemId, ValueObject,
};

pub const MIN_ITEM_COUNT: u32 = 1;
pub const MAX_ITEM_COUNT: u32 = 99;

/// Quantity of one menu item within an order (1..=99).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ItemCount(u32);

impl ValueObject for ItemCount {}

impl ItemCount {
    pub fn new(count: u32) -> DomainResult<Self> {
        if !(MIN_ITEM_COUNT..=MAX_ITEM_COUNT).contains(&count) {
            return Err(DomainError::validation(format!(
                "item count must be within {MIN_ITEM_COUNT}..={MAX_ITEM_COUNT}, got {count}"
            )));
        }
        Ok(Self(count))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for ItemCount {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ItemCount> for u32 {
    fn from(value: ItemCount) -> Self {
        value.0
    }
}

impl core::fmt::Display for ItemCount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A line item before the repository has assigned it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub menu_item_id: MenuItemId,
    pub count: ItemCount,
}

/// A persisted line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub menu_item_id: MenuItemId,
    pub count: ItemCount,
}

impl OrderItem {
    pub fn from_new(id: OrderItemId, new: NewOrderItem) -> Self {
        Self {
            id,
            order_id: new.order_id,
            menu_item_id: new.menu_item_id,
            count: new.count,
        }
    }

    /// Items are addressed through their order; an item of another order is
    /// reported exactly like a missing one.
    pub fn ensure_belongs_to(&self, order_id: OrderId) -> DomainResult<()> {
        if self.order_id == order_id {
            Ok(())
        } else {
            Err(DomainError::not_found("no such item for this order"))
        }
    }
}

impl Entity for OrderItem {
    type Id = OrderItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
