//! Account provisioning: user self sign-up, admin-provisioned couriers and
//! restaurants, restaurant availability and menus.

use chrono::Utc;
use serde_json::Value as JsonValue;

use yad_auth::{Actor, Role, authorize_provisioning, authorize_restaurant_update};
use yad_core::{ExpectedVersion, Location, RestaurantId};
use yad_events::{EventBus, EventEnvelope};
use yad_infra::Store;
use yad_parties::{
    Courier, CourierCommand, CourierContact, MenuItem, NewMenuItem, NewRestaurant, NewUser,
    RegisterCourier, Restaurant, RestaurantStatus, User, WorkingStatus,
};

use crate::engine::{COURIER_AGGREGATE, Engine, execute};
use crate::error::{ServiceError, ServiceResult};

impl<S, B> Engine<S, B>
where
    S: Store,
    B: EventBus<EventEnvelope<JsonValue>>,
{
    /// Self-service user sign-up. Needs no authenticated actor.
    pub fn sign_up_user(&self, profile: NewUser) -> ServiceResult<User> {
        authorize_provisioning(None, Role::User)?;
        profile.validate()?;
        let user = self.store().insert_user(profile)?;
        tracing::info!(user_id = %user.id, "user signed up");
        Ok(user)
    }

    pub fn provision_courier(
        &self,
        actor: &Actor,
        contact: CourierContact,
        location: Location,
        working_status: WorkingStatus,
    ) -> ServiceResult<Courier> {
        authorize_provisioning(Some(actor), Role::Courier)?;

        let courier_id = self.store().next_courier_id()?;
        let (courier, events) = execute(
            &Courier::empty(courier_id),
            CourierCommand::RegisterCourier(RegisterCourier {
                courier_id,
                contact,
                location,
                working_status,
                occurred_at: Utc::now(),
            }),
        )?;
        self.store().save_courier(&courier, ExpectedVersion::Exact(0))?;
        self.publish(COURIER_AGGREGATE, courier_id.get(), 0, &events);

        tracing::info!(%courier_id, status = %working_status, "courier provisioned");
        Ok(courier)
    }

    pub fn provision_restaurant(
        &self,
        actor: &Actor,
        profile: NewRestaurant,
    ) -> ServiceResult<Restaurant> {
        authorize_provisioning(Some(actor), Role::Restaurant)?;
        profile.validate()?;
        let restaurant = self.store().insert_restaurant(profile)?;
        tracing::info!(restaurant_id = %restaurant.id, "restaurant provisioned");
        Ok(restaurant)
    }

    /// Open or close a restaurant for new orders.
    pub fn update_restaurant_status(
        &self,
        actor: &Actor,
        restaurant_id: RestaurantId,
        status: RestaurantStatus,
    ) -> ServiceResult<Restaurant> {
        authorize_restaurant_update(actor, restaurant_id)?;
        let mut restaurant = self
            .store()
            .load_restaurant(restaurant_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("restaurant {restaurant_id}")))?;

        restaurant.working_status = status;
        self.store().save_restaurant(&restaurant)?;
        tracing::info!(%restaurant_id, %status, "restaurant status updated");
        Ok(restaurant)
    }

    /// Add a dish to a restaurant's menu (the restaurant itself or an admin).
    pub fn add_menu_item(&self, actor: &Actor, item: NewMenuItem) -> ServiceResult<MenuItem> {
        authorize_restaurant_update(actor, item.restaurant_id)?;
        if item.title.trim().is_empty() {
            return Err(ServiceError::Validation("menu item title cannot be empty".to_string()));
        }
        let item = self.store().insert_menu_item(item)?;
        tracing::info!(menu_item_id = %item.id, restaurant_id = %item.restaurant_id, "menu item added");
        Ok(item)
    }
}
