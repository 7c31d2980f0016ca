mod common;

use yad_auth::Actor;
use yad_core::{CourierId, UserId};
use yad_orders::OrderStatus;
use yad_parties::{CourierChanges, CourierContact, WorkingStatus};
use yad_service::ServiceError;

use common::{World, location};

#[test]
fn status_moves_one_step_at_a_time() {
    let world = World::new();
    let courier_id = world.add_courier(55.76, 37.62, WorkingStatus::Unable);
    let courier = Actor::courier(courier_id);

    // Unable -> Working skips Waiting.
    let err = world
        .engine
        .update_courier_status(&courier, courier_id, WorkingStatus::Working)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    let waiting = world
        .engine
        .update_courier_status(&courier, courier_id, WorkingStatus::Waiting)
        .unwrap();
    assert_eq!(waiting.working_status(), WorkingStatus::Waiting);

    let unable = world
        .engine
        .update_courier_status(&courier, courier_id, WorkingStatus::Unable)
        .unwrap();
    assert_eq!(unable.working_status(), WorkingStatus::Unable);
}

#[test]
fn courier_starts_working_by_being_assigned() {
    let world = World::new();
    let (lat, lon) = common::USER_ADDRESS;
    let courier_id = world.add_courier(lat, lon, WorkingStatus::Unable);
    let courier = Actor::courier(courier_id);

    world
        .engine
        .update_courier_status(&courier, courier_id, WorkingStatus::Waiting)
        .unwrap();

    // Waiting -> Working is not self-service without an order to work on.
    let err = world
        .engine
        .update_courier_status(&courier, courier_id, WorkingStatus::Working)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    let order_id = world.new_order();
    world
        .engine
        .advance_order_status(&world.user, order_id, OrderStatus::Paid)
        .unwrap();
    assert_eq!(
        world.engine.get_courier(&courier, courier_id).unwrap().working_status(),
        WorkingStatus::Working
    );

    // Working -> Working while holding the order is a no-op.
    let same = world
        .engine
        .update_courier_status(&courier, courier_id, WorkingStatus::Working)
        .unwrap();
    assert_eq!(same.working_status(), WorkingStatus::Working);
}

#[test]
fn courier_is_working_exactly_while_the_order_is_active() {
    let world = World::new();
    let (order_id, courier_id) = world.paid_order();
    let courier = Actor::courier(courier_id);

    let err = world
        .engine
        .update_courier_status(&courier, courier_id, WorkingStatus::Waiting)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    world.advance_to(order_id, courier_id, OrderStatus::EnRoute);
    let err = world
        .engine
        .update_courier_status(&world.admin, courier_id, WorkingStatus::Waiting)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    world.advance_to(order_id, courier_id, OrderStatus::Delivered);
    assert_eq!(
        world.engine.get_courier(&world.admin, courier_id).unwrap().working_status(),
        WorkingStatus::Waiting
    );

    // Back in the pool: the next payment picks the same courier.
    let next_order = world.new_order();
    let paid = world
        .engine
        .advance_order_status(&world.user, next_order, OrderStatus::Paid)
        .unwrap();
    assert_eq!(paid.courier_id(), Some(courier_id));
    assert_eq!(
        world
            .engine
            .get_active_courier_order(&courier, courier_id)
            .unwrap()
            .id_typed(),
        next_order
    );
}

#[test]
fn self_service_updates_drop_contact_fields() {
    let world = World::new();
    let courier_id = world.add_courier(55.76, 37.62, WorkingStatus::Waiting);
    let before = world.engine.get_courier(&world.admin, courier_id).unwrap();

    let after = world
        .engine
        .update_courier(
            &Actor::courier(courier_id),
            courier_id,
            CourierChanges {
                location: Some(location(55.77, 37.63)),
                name: Some("Hacker".to_string()),
                phone: Some("+79999999999".to_string()),
                email: Some("h@example.com".to_string()),
                ..CourierChanges::default()
            },
        )
        .unwrap();

    assert_eq!(after.location(), location(55.77, 37.63));
    assert_eq!(after.contact(), before.contact());
}

#[test]
fn admin_updates_every_field() {
    let world = World::new();
    let courier_id = world.add_courier(55.76, 37.62, WorkingStatus::Waiting);

    let updated = world
        .engine
        .update_courier(
            &world.admin,
            courier_id,
            CourierChanges {
                working_status: Some(WorkingStatus::Unable),
                location: Some(location(55.70, 37.60)),
                name: Some("Pyotr".to_string()),
                phone: Some("+71111111111".to_string()),
                email: Some("pyotr@example.com".to_string()),
            },
        )
        .unwrap();

    assert_eq!(updated.working_status(), WorkingStatus::Unable);
    assert_eq!(updated.location(), location(55.70, 37.60));
    assert_eq!(
        updated.contact(),
        &CourierContact {
            name: "Pyotr".to_string(),
            phone: "+71111111111".to_string(),
            email: "pyotr@example.com".to_string(),
        }
    );
    assert_eq!(world.engine.get_courier(&world.admin, courier_id).unwrap(), updated);
}

#[test]
fn only_the_courier_itself_or_an_admin_may_update() {
    let world = World::new();
    let courier_id = world.add_courier(55.76, 37.62, WorkingStatus::Waiting);
    let other_id = world.add_courier(55.77, 37.62, WorkingStatus::Waiting);

    for actor in [
        Actor::courier(other_id),
        world.user,
        world.restaurant,
    ] {
        let err = world
            .engine
            .update_courier_status(&actor, courier_id, WorkingStatus::Unable)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)), "{actor}: {err:?}");
    }
    assert_eq!(
        world.engine.get_courier(&world.admin, courier_id).unwrap().working_status(),
        WorkingStatus::Waiting
    );
}

#[test]
fn courier_profiles_are_hidden_from_other_couriers() {
    let world = World::new();
    let courier_id = world.add_courier(55.76, 37.62, WorkingStatus::Waiting);
    let other_id = world.add_courier(55.77, 37.62, WorkingStatus::Waiting);

    for reader in [Actor::courier(courier_id), world.user, world.restaurant, world.admin] {
        assert!(world.engine.get_courier(&reader, courier_id).is_ok());
    }
    assert!(matches!(
        world.engine.get_courier(&Actor::courier(other_id), courier_id),
        Err(ServiceError::Forbidden(_))
    ));
    assert!(matches!(
        world.engine.get_courier(&world.admin, CourierId::new(9_999)),
        Err(ServiceError::NotFound(_))
    ));
}

#[test]
fn couriers_are_provisioned_by_admins_only() {
    let world = World::new();
    let contact = CourierContact {
        name: "Oleg".to_string(),
        phone: "+72222222222".to_string(),
        email: String::new(),
    };

    let err = world
        .engine
        .provision_courier(
            &Actor::user(UserId::new(world.user_id.get())),
            contact.clone(),
            location(55.76, 37.62),
            WorkingStatus::Waiting,
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let err = world
        .engine
        .provision_courier(&world.admin, contact, location(55.76, 37.62), WorkingStatus::Working)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}
