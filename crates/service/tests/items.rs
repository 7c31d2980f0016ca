mod common;

use yad_auth::Actor;
use yad_core::{MenuItemId, OrderItemId, UserId};
use yad_orders::{MAX_ITEM_COUNT, MIN_ITEM_COUNT, OrderStatus};
use yad_parties::{NewMenuItem, NewRestaurant, RestaurantStatus};
use yad_service::ServiceError;

use proptest::prelude::*;

use common::{World, location};

#[test]
fn item_count_bounds_are_enforced() {
    let world = World::new();
    let order_id = world.new_order();

    for count in [0, MAX_ITEM_COUNT + 1] {
        let err = world
            .engine
            .create_order_item(&world.user, order_id, world.dish.id, count)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)), "count {count}: {err:?}");
    }

    let low = world
        .engine
        .create_order_item(&world.user, order_id, world.dish.id, MIN_ITEM_COUNT)
        .unwrap();
    assert_eq!(low.count.get(), MIN_ITEM_COUNT);

    let high = world
        .engine
        .create_order_item(&world.user, order_id, world.dish.id, MAX_ITEM_COUNT)
        .unwrap();
    assert_eq!(high.count.get(), MAX_ITEM_COUNT);

    let err = world
        .engine
        .update_order_item(&world.user, order_id, low.id, 0)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[test]
fn total_price_follows_every_item_change() {
    let world = World::new();
    let order_id = world.new_order();
    let total = || world.engine.get_order(&world.user, order_id).unwrap().total_price();
    assert_eq!(total(), 0);

    let first = world
        .engine
        .create_order_item(&world.user, order_id, world.dish.id, 2)
        .unwrap();
    assert_eq!(total(), 200);

    let second = world
        .engine
        .create_order_item(&world.user, order_id, world.dish.id, 1)
        .unwrap();
    assert_eq!(total(), 300);

    world
        .engine
        .update_order_item(&world.user, order_id, first.id, 5)
        .unwrap();
    assert_eq!(total(), 600);

    world
        .engine
        .delete_order_item(&world.user, order_id, second.id)
        .unwrap();
    assert_eq!(total(), 500);

    // The delivery price never enters the total.
    let order = world.engine.get_order(&world.user, order_id).unwrap();
    assert_eq!(order.delivery_price(), 150);
    assert_eq!(order.total_price(), 500);
}

#[test]
fn total_that_overflows_is_rejected_without_damage() {
    let world = World::new();
    let order_id = world.new_order();
    let kept = world
        .engine
        .create_order_item(&world.user, order_id, world.dish.id, 2)
        .unwrap();
    let pricey = world
        .engine
        .add_menu_item(
            &world.admin,
            NewMenuItem {
                restaurant_id: world.restaurant_id,
                title: "Gold leaf".to_string(),
                price: u64::MAX / 2,
            },
        )
        .unwrap();

    let err = world
        .engine
        .create_order_item(&world.user, order_id, pricey.id, 3)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)), "{err:?}");

    let single = world
        .engine
        .create_order_item(&world.user, order_id, pricey.id, 1)
        .unwrap();
    let err = world
        .engine
        .update_order_item(&world.user, order_id, single.id, 3)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)), "{err:?}");

    // The store stays usable and the ledger is what it was before the rejects.
    let order = world.engine.get_order(&world.user, order_id).unwrap();
    assert_eq!(order.total_price(), 200 + u64::MAX / 2);
    let items = world.engine.list_order_items(&world.user, order_id).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0], kept);
    assert_eq!(items[1].count.get(), 1);
    world.new_order();
}

#[test]
fn items_stay_editable_after_payment() {
    let world = World::new();
    let (order_id, _) = world.paid_order();

    world
        .engine
        .create_order_item(&world.user, order_id, world.dish.id, 3)
        .unwrap();
    let order = world.engine.get_order(&world.user, order_id).unwrap();
    assert_eq!(order.total_price(), 300);
    assert_eq!(order.status(), OrderStatus::Paid);
}

#[test]
fn every_party_reads_but_only_the_user_writes() {
    let world = World::new();
    let (order_id, courier_id) = world.paid_order();
    let courier = Actor::courier(courier_id);
    let item = world
        .engine
        .create_order_item(&world.user, order_id, world.dish.id, 1)
        .unwrap();

    for reader in [&world.user, &world.restaurant, &courier] {
        assert_eq!(
            world.engine.get_order_item(reader, order_id, item.id).unwrap(),
            item
        );
        assert_eq!(
            world.engine.list_order_items(reader, order_id).unwrap(),
            vec![item.clone()]
        );
    }

    for writer in [&world.restaurant, &courier, &world.admin] {
        assert!(matches!(
            world
                .engine
                .create_order_item(writer, order_id, world.dish.id, 1),
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            world.engine.update_order_item(writer, order_id, item.id, 2),
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            world.engine.delete_order_item(writer, order_id, item.id),
            Err(ServiceError::Forbidden(_))
        ));
    }

    let stranger = Actor::user(UserId::new(world.user_id.get() + 1));
    assert!(matches!(
        world.engine.list_order_items(&stranger, order_id),
        Err(ServiceError::Forbidden(_))
    ));
}

#[test]
fn items_are_addressed_through_their_order() {
    let world = World::new();
    let first = world.new_order();
    let second = world.new_order();
    let item = world
        .engine
        .create_order_item(&world.user, first, world.dish.id, 1)
        .unwrap();

    assert!(matches!(
        world.engine.get_order_item(&world.user, second, item.id),
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        world.engine.update_order_item(&world.user, second, item.id, 4),
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        world.engine.delete_order_item(&world.user, second, item.id),
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        world
            .engine
            .get_order_item(&world.user, first, OrderItemId::new(item.id.get() + 100)),
        Err(ServiceError::NotFound(_))
    ));

    // The item is untouched by the misaddressed calls.
    assert_eq!(
        world.engine.get_order_item(&world.user, first, item.id).unwrap().count.get(),
        1
    );
}

#[test]
fn menu_item_must_exist_and_belong_to_the_restaurant() {
    let world = World::new();
    let order_id = world.new_order();

    let other = world
        .engine
        .provision_restaurant(
            &world.admin,
            NewRestaurant {
                name: "Blini".to_string(),
                phone: "+70000000009".to_string(),
                location: location(55.70, 37.50),
                working_status: RestaurantStatus::Working,
            },
        )
        .unwrap();
    let foreign_dish = world
        .engine
        .add_menu_item(
            &world.admin,
            NewMenuItem {
                restaurant_id: other.id,
                title: "Blini".to_string(),
                price: 80,
            },
        )
        .unwrap();

    assert!(matches!(
        world
            .engine
            .create_order_item(&world.user, order_id, foreign_dish.id, 1),
        Err(ServiceError::Validation(_))
    ));
    assert!(matches!(
        world
            .engine
            .create_order_item(&world.user, order_id, MenuItemId::new(9_999), 1),
        Err(ServiceError::NotFound(_))
    ));
    assert!(world.engine.list_order_items(&world.user, order_id).unwrap().is_empty());
}

#[test]
fn only_the_restaurant_or_an_admin_edits_the_menu() {
    let world = World::new();
    let dish = NewMenuItem {
        restaurant_id: world.restaurant_id,
        title: "Vareniki".to_string(),
        price: 90,
    };

    assert!(matches!(
        world.engine.add_menu_item(&world.user, dish.clone()),
        Err(ServiceError::Forbidden(_))
    ));
    assert!(world.engine.add_menu_item(&world.restaurant, dish.clone()).is_ok());
    assert!(matches!(
        world.engine.add_menu_item(
            &world.restaurant,
            NewMenuItem {
                title: "  ".to_string(),
                ..dish
            }
        ),
        Err(ServiceError::Validation(_))
    ));
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 32,
        ..ProptestConfig::default()
    })]

    /// Property: after any sequence of adds and count changes, the order total
    /// equals the sum of count times dish price over the remaining items.
    #[test]
    fn total_is_the_sum_of_the_ledger(
        counts in proptest::collection::vec(MIN_ITEM_COUNT..=MAX_ITEM_COUNT, 1..6),
        recount in MIN_ITEM_COUNT..=MAX_ITEM_COUNT,
        drop_first in any::<bool>(),
    ) {
        let world = World::new();
        let order_id = world.new_order();
        let price = world.dish.price;

        let items: Vec<_> = counts
            .iter()
            .map(|&count| {
                world
                    .engine
                    .create_order_item(&world.user, order_id, world.dish.id, count)
                    .unwrap()
            })
            .collect();

        let last = items.last().unwrap();
        world
            .engine
            .update_order_item(&world.user, order_id, last.id, recount)
            .unwrap();
        if drop_first && items.len() > 1 {
            world
                .engine
                .delete_order_item(&world.user, order_id, items[0].id)
                .unwrap();
        }

        let expected: u64 = world
            .engine
            .list_order_items(&world.user, order_id)
            .unwrap()
            .iter()
            .map(|item| u64::from(item.count.get()) * price)
            .sum();
        let order = world.engine.get_order(&world.user, order_id).unwrap();
        prop_assert_eq!(order.total_price(), expected);
        prop_assert!(order.total_price() >= u64::from(recount) * price);
    }
}
