use serde::{Deserialize, Serialize};

use yad_core::{DomainError, DomainResult, Entity, Location, MenuItemId, RestaurantId};

/// Whether a restaurant accepts new orders: `Unable(0)` or `Working(1)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestaurantStatus {
    Unable,
    Working,
}

impl RestaurantStatus {
    pub fn code(self) -> i64 {
        match self {
            RestaurantStatus::Unable => 0,
            RestaurantStatus::Working => 1,
        }
    }

    pub fn from_code(code: i64) -> DomainResult<Self> {
        match code {
            0 => Ok(RestaurantStatus::Unable),
            1 => Ok(RestaurantStatus::Working),
            other => Err(DomainError::validation(format!(
                "unknown restaurant working status code {other}"
            ))),
        }
    }
}

impl core::fmt::Display for RestaurantStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            RestaurantStatus::Unable => "unable",
            RestaurantStatus::Working => "working",
        })
    }
}

/// Restaurant profile as provisioned by an admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRestaurant {
    pub name: String,
    pub phone: String,
    pub location: Location,
    pub working_status: RestaurantStatus,
}

impl NewRestaurant {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("restaurant name cannot be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    pub phone: String,
    pub location: Location,
    pub working_status: RestaurantStatus,
}

impl Restaurant {
    pub fn from_new(id: RestaurantId, new: NewRestaurant) -> Self {
        Self {
            id,
            name: new.name,
            phone: new.phone,
            location: new.location,
            working_status: new.working_status,
        }
    }

    /// New orders may only be placed with a working restaurant.
    pub fn ensure_accepting_orders(&self) -> DomainResult<()> {
        match self.working_status {
            RestaurantStatus::Working => Ok(()),
            RestaurantStatus::Unable => Err(DomainError::conflict(format!(
                "restaurant {} is not accepting orders",
                self.id
            ))),
        }
    }
}

impl Entity for Restaurant {
    type Id = RestaurantId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A catalog entry. Plain data: menu CRUD has no lifecycle of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub restaurant_id: RestaurantId,
    pub title: String,
    pub price: u64,
}

impl MenuItem {
    /// A line item may only reference dishes of the order's own restaurant.
    pub fn ensure_offered_by(&self, restaurant_id: RestaurantId) -> DomainResult<()> {
        if self.restaurant_id == restaurant_id {
            Ok(())
        } else {
            Err(DomainError::validation(format!(
                "menu item {} is not offered by restaurant {}",
                self.id, restaurant_id
            )))
        }
    }
}

impl Entity for MenuItem {
    type Id = MenuItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMenuItem {
    pub restaurant_id: RestaurantId,
    pub title: String,
    pub price: u64,
}
