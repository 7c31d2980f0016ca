#![allow(dead_code)]

use std::sync::Arc;

use yad_auth::Actor;
use yad_core::{AdminId, CourierId, Location, OrderId, RestaurantId, UserId};
use yad_infra::InMemoryStore;
use yad_orders::OrderStatus;
use yad_parties::{
    CourierContact, MenuItem, NewMenuItem, NewRestaurant, NewUser, RestaurantStatus, WorkingStatus,
};
use yad_service::{Engine, EngineConfig, InMemoryBus, in_memory_engine};

pub type TestEngine = Engine<InMemoryStore, InMemoryBus>;

/// A marketplace with one admin, one user, one working restaurant and one dish.
pub struct World {
    pub engine: Arc<TestEngine>,
    pub admin: Actor,
    pub user_id: UserId,
    pub user: Actor,
    pub restaurant_id: RestaurantId,
    pub restaurant: Actor,
    pub dish: MenuItem,
}

pub const USER_ADDRESS: (f64, f64) = (55.7512, 37.6184);

pub fn location(lat: f64, lon: f64) -> Location {
    Location::new(lat, lon).unwrap()
}

impl World {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let engine = Arc::new(in_memory_engine(config));
        let admin = Actor::admin(AdminId::new(1));

        let restaurant = engine
            .provision_restaurant(
                &admin,
                NewRestaurant {
                    name: "Pelmeni House".to_string(),
                    phone: "+70000000001".to_string(),
                    location: location(55.7601, 37.6186),
                    working_status: RestaurantStatus::Working,
                },
            )
            .unwrap();
        let dish = engine
            .add_menu_item(
                &admin,
                NewMenuItem {
                    restaurant_id: restaurant.id,
                    title: "Pelmeni".to_string(),
                    price: 100,
                },
            )
            .unwrap();
        let user = engine
            .sign_up_user(NewUser {
                name: "Anna".to_string(),
                phone: "+70000000003".to_string(),
                email: "anna@example.com".to_string(),
                address: location(USER_ADDRESS.0, USER_ADDRESS.1),
            })
            .unwrap();

        Self {
            engine,
            admin,
            user_id: user.id,
            user: Actor::user(user.id),
            restaurant_id: restaurant.id,
            restaurant: Actor::restaurant(restaurant.id),
            dish,
        }
    }

    pub fn add_courier(&self, lat: f64, lon: f64, status: WorkingStatus) -> CourierId {
        self.engine
            .provision_courier(
                &self.admin,
                CourierContact {
                    name: format!("courier at {lat},{lon}"),
                    phone: format!("+7{}", (lat * 1e4) as i64),
                    email: String::new(),
                },
                location(lat, lon),
                status,
            )
            .unwrap()
            .id_typed()
    }

    pub fn new_order(&self) -> OrderId {
        self.engine
            .create_order(&self.user, self.restaurant_id, 150)
            .unwrap()
            .id_typed()
    }

    /// A paid order with a freshly provisioned waiting courier assigned to it.
    pub fn paid_order(&self) -> (OrderId, CourierId) {
        let courier_id = self.add_courier(55.7558, 37.6173, WorkingStatus::Waiting);
        let order_id = self.new_order();
        let order = self
            .engine
            .advance_order_status(&self.user, order_id, OrderStatus::Paid)
            .unwrap();
        assert_eq!(order.courier_id(), Some(courier_id));
        (order_id, courier_id)
    }

    /// Drive a paid order forward to `status` with the entitled actors.
    pub fn advance_to(&self, order_id: OrderId, courier_id: CourierId, status: OrderStatus) {
        let courier = Actor::courier(courier_id);
        let mut current = self.engine.get_order(&self.user, order_id).unwrap().status();
        while current < status {
            let target = current.next().unwrap();
            let actor = match target {
                OrderStatus::Preparing | OrderStatus::WaitingForCourier => &self.restaurant,
                OrderStatus::EnRoute | OrderStatus::Delivered => &courier,
                _ => &self.user,
            };
            current = self
                .engine
                .advance_order_status(actor, order_id, target)
                .unwrap()
                .status();
        }
    }
}
