mod common;

use std::collections::BTreeSet;
use std::sync::{Arc, Barrier};
use std::thread;

use yad_auth::Actor;
use yad_core::{AggregateRoot, CourierId, OrderId};
use yad_orders::{Order, OrderStatus};
use yad_parties::WorkingStatus;
use yad_service::{EngineConfig, ServiceError, ServiceResult};

use common::World;

/// Run `work` on `threads` threads released at the same instant.
fn race<T, F>(threads: usize, work: F) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(usize) -> T + Send + Sync + 'static,
{
    let barrier = Arc::new(Barrier::new(threads));
    let work = Arc::new(work);
    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let barrier = Arc::clone(&barrier);
            let work = Arc::clone(&work);
            thread::spawn(move || {
                barrier.wait();
                work(i)
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

fn successes(results: &[ServiceResult<Order>]) -> usize {
    results.iter().filter(|r| r.is_ok()).count()
}

#[test]
fn concurrent_advances_of_one_order_apply_once() {
    let world = World::new();
    let (order_id, _) = world.paid_order();
    let before = world.engine.get_order(&world.user, order_id).unwrap().version();

    let engine = Arc::clone(&world.engine);
    let restaurant = world.restaurant;
    let results = race(8, move |_| {
        engine.advance_order_status(&restaurant, order_id, OrderStatus::Preparing)
    });

    assert_eq!(successes(&results), 1, "{results:?}");
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(
            matches!(err, ServiceError::Conflict(_) | ServiceError::InvalidTransition(_)),
            "{err:?}"
        );
    }

    let order = world.engine.get_order(&world.user, order_id).unwrap();
    assert_eq!(order.status(), OrderStatus::Preparing);
    assert_eq!(order.version(), before + 1);
}

#[test]
fn one_waiting_courier_serves_one_of_two_payments() {
    let world = World::new();
    let courier_id = world.add_courier(55.7558, 37.6173, WorkingStatus::Waiting);
    let orders = [world.new_order(), world.new_order()];

    let engine = Arc::clone(&world.engine);
    let user = world.user;
    let results = race(2, move |i| {
        engine.advance_order_status(&user, orders[i], OrderStatus::Paid)
    });

    assert_eq!(successes(&results), 1, "{results:?}");
    for (order_id, result) in orders.iter().zip(&results) {
        let order = world.engine.get_order(&world.user, *order_id).unwrap();
        match result {
            Ok(paid) => {
                assert_eq!(paid.courier_id(), Some(courier_id));
                assert_eq!(order.status(), OrderStatus::Paid);
            }
            Err(err) => {
                assert!(
                    matches!(err, ServiceError::Unavailable(_) | ServiceError::Conflict(_)),
                    "{err:?}"
                );
                assert_eq!(order.status(), OrderStatus::Created);
                assert_eq!(order.courier_id(), None);
            }
        }
    }
    assert_eq!(
        world.engine.get_courier(&world.admin, courier_id).unwrap().working_status(),
        WorkingStatus::Working
    );
}

#[test]
fn racing_payments_of_one_order_release_the_losing_reservations() {
    let world = World::new();
    let couriers: Vec<CourierId> = (0..4)
        .map(|i| world.add_courier(55.75 + f64::from(i) * 0.01, 37.62, WorkingStatus::Waiting))
        .collect();
    let order_id = world.new_order();

    let engine = Arc::clone(&world.engine);
    let user = world.user;
    let results = race(4, move |_| {
        engine.advance_order_status(&user, order_id, OrderStatus::Paid)
    });

    assert_eq!(successes(&results), 1, "{results:?}");
    let order = world.engine.get_order(&world.user, order_id).unwrap();
    assert_eq!(order.status(), OrderStatus::Paid);
    let assigned = order.courier_id().unwrap();

    for courier_id in couriers {
        let expected = if courier_id == assigned {
            WorkingStatus::Working
        } else {
            WorkingStatus::Waiting
        };
        assert_eq!(
            world.engine.get_courier(&world.admin, courier_id).unwrap().working_status(),
            expected,
            "courier {courier_id}"
        );
    }
}

#[test]
fn concurrent_payments_get_distinct_couriers() {
    const ORDERS: usize = 4;
    let world = World::with_config(EngineConfig {
        assignment_attempts: 8,
        ..EngineConfig::default()
    });
    for i in 0..ORDERS {
        world.add_courier(55.75 + i as f64 * 0.001, 37.62, WorkingStatus::Waiting);
    }
    let orders: Vec<OrderId> = (0..ORDERS).map(|_| world.new_order()).collect();

    let engine = Arc::clone(&world.engine);
    let user = world.user;
    let to_pay = orders.clone();
    let results = race(ORDERS, move |i| {
        engine.advance_order_status(&user, to_pay[i], OrderStatus::Paid)
    });
    assert_eq!(successes(&results), ORDERS, "{results:?}");

    let assigned: BTreeSet<CourierId> = orders
        .iter()
        .map(|id| world.engine.get_order(&world.user, *id).unwrap().courier_id().unwrap())
        .collect();
    assert_eq!(assigned.len(), ORDERS);

    for courier_id in assigned {
        let courier = Actor::courier(courier_id);
        let active = world
            .engine
            .get_active_courier_order(&courier, courier_id)
            .unwrap();
        assert_eq!(active.courier_id(), Some(courier_id));
    }
}
