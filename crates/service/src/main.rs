use anyhow::Context;

use yad_auth::Actor;
use yad_core::{AdminId, Location};
use yad_events::EventBus;
use yad_orders::OrderStatus;
use yad_parties::{CourierContact, NewMenuItem, NewRestaurant, NewUser, RestaurantStatus, WorkingStatus};
use yad_service::{EngineConfig, in_memory_engine};

/// Walks one order from placement to delivery against the in-memory store,
/// logging every step and the published lifecycle events.
fn main() -> anyhow::Result<()> {
    let config = EngineConfig::from_env().context("invalid engine configuration")?;
    yad_observability::init_with(config.log_format);

    let engine = in_memory_engine(config);
    let events = engine.bus().subscribe();
    let admin = Actor::admin(AdminId::new(1));

    let restaurant = engine.provision_restaurant(
        &admin,
        NewRestaurant {
            name: "Pelmeni House".to_string(),
            phone: "+70000000001".to_string(),
            location: Location::new(55.7601, 37.6186)?,
            working_status: RestaurantStatus::Working,
        },
    )?;
    let dish = engine.add_menu_item(
        &admin,
        NewMenuItem {
            restaurant_id: restaurant.id,
            title: "Pelmeni".to_string(),
            price: 100,
        },
    )?;
    let courier = engine.provision_courier(
        &admin,
        CourierContact {
            name: "Ivan".to_string(),
            phone: "+70000000002".to_string(),
            email: "ivan@example.com".to_string(),
        },
        Location::new(55.7558, 37.6173)?,
        WorkingStatus::Waiting,
    )?;
    let user = engine.sign_up_user(NewUser {
        name: "Anna".to_string(),
        phone: "+70000000003".to_string(),
        email: "anna@example.com".to_string(),
        address: Location::new(55.7512, 37.6184)?,
    })?;

    let as_user = Actor::user(user.id);
    let as_restaurant = Actor::restaurant(restaurant.id);
    let as_courier = Actor::courier(courier.id_typed());

    let order = engine.create_order(&as_user, restaurant.id, 150)?;
    let order_id = order.id_typed();
    engine.create_order_item(&as_user, order_id, dish.id, 2)?;

    engine.advance_order_status(&as_user, order_id, OrderStatus::Paid)?;
    engine.advance_order_status(&as_restaurant, order_id, OrderStatus::Preparing)?;
    engine.advance_order_status(&as_restaurant, order_id, OrderStatus::WaitingForCourier)?;
    engine.advance_order_status(&as_courier, order_id, OrderStatus::EnRoute)?;
    engine.advance_order_status(&as_courier, order_id, OrderStatus::Delivered)?;
    let courier = engine.get_courier(&as_courier, courier.id_typed())?;
    tracing::info!(courier_id = %courier.id_typed(), status = %courier.working_status(), "courier back in the pool");

    let delivered = engine.get_order(&as_user, order_id)?;
    tracing::info!(
        order = %serde_json::to_string(&delivered)?,
        "order delivered"
    );

    for envelope in events.drain() {
        tracing::info!(
            aggregate_type = envelope.aggregate_type(),
            aggregate_id = envelope.aggregate_id(),
            sequence_number = envelope.sequence_number(),
            event_type = envelope.event_type(),
            "lifecycle event"
        );
    }

    Ok(())
}
