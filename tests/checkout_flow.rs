mod common;

use canteen_api::{
    dto::{cart::AddToCartRequest, discounts::CreateDiscountRequest, orders::CheckoutRequest},
    entity::{
        discounts::DiscountScope,
        menus::Entity as Menus,
        orders::{self, Entity as Orders, OrderStatus},
    },
    error::AppError,
    services::{cart_service, discount_service, order_service},
};
use chrono::{Duration, Utc};
use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, TransactionTrait,
    sea_query::LockType,
};
use tokio::time::sleep;

#[tokio::test]
async fn adding_the_same_menu_twice_merges_quantity() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let (_, stan) = common::create_vendor(&state).await?;
    let (siswa, _) = common::create_student(&state).await?;
    let menu = common::create_menu(&state, stan.id, 10_000, 10).await?;

    for quantity in [1, 3] {
        cart_service::add_to_cart(&state, &siswa, AddToCartRequest { menu_id: menu.id, quantity })
            .await?;
    }

    let cart = cart_service::list_cart(&state, &siswa).await?.data.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 4);
    assert_eq!(cart.total_items, 4);
    assert_eq!(cart.total_price, 40_000);
    Ok(())
}

#[tokio::test]
async fn empty_cart_checkout_creates_no_order() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let (_, stan) = common::create_vendor(&state).await?;
    let (siswa, student) = common::create_student(&state).await?;

    let err = order_service::checkout(&state, &siswa, CheckoutRequest { stan_id: stan.id })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::EmptyCart));

    let orders = Orders::find()
        .filter(orders::Column::StudentId.eq(student.id))
        .count(&state.orm)
        .await?;
    assert_eq!(orders, 0);
    Ok(())
}

#[tokio::test]
async fn checkout_snapshots_prices_and_takes_stock() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let (_, stan) = common::create_vendor(&state).await?;
    let (siswa, _) = common::create_student(&state).await?;
    let nasi = common::create_menu(&state, stan.id, 10_000, 10).await?;
    let teh = common::create_menu(&state, stan.id, 5_000, 3).await?;

    cart_service::add_to_cart(&state, &siswa, AddToCartRequest { menu_id: nasi.id, quantity: 3 })
        .await?;
    cart_service::add_to_cart(&state, &siswa, AddToCartRequest { menu_id: teh.id, quantity: 1 })
        .await?;

    let placed = order_service::checkout(&state, &siswa, CheckoutRequest { stan_id: stan.id })
        .await?
        .data
        .unwrap();
    assert_eq!(placed.order.status, OrderStatus::Unconfirmed);
    assert_eq!(placed.items.len(), 2);
    assert_eq!(placed.total, 35_000);
    let mut prices: Vec<i64> = placed.items.iter().map(|item| item.purchase_price).collect();
    prices.sort_unstable();
    assert_eq!(prices, vec![5_000, 10_000]);
    for item in &placed.items {
        assert_eq!(item.unit_price, item.purchase_price);
        assert!(item.discount_name.is_empty());
    }

    let nasi_after = Menus::find_by_id(nasi.id).one(&state.orm).await?.unwrap();
    let teh_after = Menus::find_by_id(teh.id).one(&state.orm).await?.unwrap();
    assert_eq!(nasi_after.stock, 7);
    assert_eq!(teh_after.stock, 2);

    let cart = cart_service::list_cart(&state, &siswa).await?.data.unwrap();
    assert!(cart.items.is_empty());
    Ok(())
}

#[tokio::test]
async fn insufficient_stock_rolls_back_everything() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let (_, stan) = common::create_vendor(&state).await?;
    let (siswa, student) = common::create_student(&state).await?;
    let plenty = common::create_menu(&state, stan.id, 8_000, 10).await?;
    let scarce = common::create_menu(&state, stan.id, 12_000, 1).await?;

    cart_service::add_to_cart(&state, &siswa, AddToCartRequest { menu_id: plenty.id, quantity: 2 })
        .await?;
    cart_service::add_to_cart(&state, &siswa, AddToCartRequest { menu_id: scarce.id, quantity: 2 })
        .await?;

    let err = order_service::checkout(&state, &siswa, CheckoutRequest { stan_id: stan.id })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock(id) if id == scarce.id));

    let plenty_after = Menus::find_by_id(plenty.id).one(&state.orm).await?.unwrap();
    assert_eq!(plenty_after.stock, 10);
    let orders = Orders::find()
        .filter(orders::Column::StudentId.eq(student.id))
        .count(&state.orm)
        .await?;
    assert_eq!(orders, 0);
    let cart = cart_service::list_cart(&state, &siswa).await?.data.unwrap();
    assert_eq!(cart.items.len(), 2);
    Ok(())
}

#[tokio::test]
async fn active_discount_sets_purchase_price() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let (vendor, stan) = common::create_vendor(&state).await?;
    let (siswa, _) = common::create_student(&state).await?;
    let menu = common::create_menu(&state, stan.id, 10_000, 5).await?;

    let now = Utc::now();
    discount_service::create_discount(
        &state,
        &vendor,
        CreateDiscountRequest {
            name: "Promo Siang".into(),
            percentage: 20.0,
            starts_at: now - Duration::hours(1),
            ends_at: now + Duration::hours(1),
            scope: DiscountScope::Menu,
            stan_id: None,
            menu_ids: vec![menu.id],
        },
    )
    .await?;

    cart_service::add_to_cart(&state, &siswa, AddToCartRequest { menu_id: menu.id, quantity: 1 })
        .await?;
    let placed = order_service::checkout(&state, &siswa, CheckoutRequest { stan_id: stan.id })
        .await?
        .data
        .unwrap();

    let line = &placed.items[0];
    assert_eq!(line.unit_price, 10_000);
    assert_eq!(line.purchase_price, 8_000);
    assert_eq!(line.discount_name, "Promo Siang");
    assert_eq!(placed.total, 8_000);
    Ok(())
}

#[tokio::test]
async fn sold_out_item_can_be_carted_but_not_checked_out() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let (_, stan) = common::create_vendor(&state).await?;
    let (siswa, student) = common::create_student(&state).await?;
    let menu = common::create_menu(&state, stan.id, 6_000, 0).await?;

    let line = cart_service::add_to_cart(&state, &siswa, AddToCartRequest { menu_id: menu.id, quantity: 1 })
        .await?
        .data
        .unwrap();
    assert_eq!(line.quantity, 1);

    let err = order_service::checkout(&state, &siswa, CheckoutRequest { stan_id: stan.id })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock(id) if id == menu.id));

    let orders = Orders::find()
        .filter(orders::Column::StudentId.eq(student.id))
        .count(&state.orm)
        .await?;
    assert_eq!(orders, 0);
    let cart = cart_service::list_cart(&state, &siswa).await?.data.unwrap();
    assert_eq!(cart.total_items, 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_merge_into_one_line() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let (_, stan) = common::create_vendor(&state).await?;
    let (siswa, _) = common::create_student(&state).await?;
    let menu = common::create_menu(&state, stan.id, 3_000, 10).await?;

    let menu_id = menu.id;
    let mut handles = Vec::new();
    for _ in 0..5 {
        let state = state.clone();
        let siswa = siswa.clone();
        handles.push(tokio::spawn(async move {
            cart_service::add_to_cart(&state, &siswa, AddToCartRequest { menu_id, quantity: 1 })
                .await
                .map(|_| ())
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let cart = cart_service::list_cart(&state, &siswa).await?.data.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 5);
    Ok(())
}

#[tokio::test]
async fn add_during_checkout_is_kept_in_cart() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let (_, stan) = common::create_vendor(&state).await?;
    let (siswa, student) = common::create_student(&state).await?;
    let menu = common::create_menu(&state, stan.id, 10_000, 10).await?;

    cart_service::add_to_cart(&state, &siswa, AddToCartRequest { menu_id: menu.id, quantity: 1 })
        .await?;

    // Holding the menu row stalls checkout after it has read the cart.
    let blocker = state.orm.begin().await?;
    Menus::find_by_id(menu.id)
        .lock(LockType::Update)
        .one(&blocker)
        .await?;

    let (placed, added, released) = tokio::join!(
        order_service::place_order(&state.orm, student.id, stan.id, Utc::now()),
        async {
            sleep(std::time::Duration::from_millis(200)).await;
            cart_service::add_to_cart(
                &state,
                &siswa,
                AddToCartRequest { menu_id: menu.id, quantity: 2 },
            )
            .await
        },
        async {
            sleep(std::time::Duration::from_millis(500)).await;
            blocker.commit().await
        },
    );
    released?;
    added?;
    let placed = placed?;

    let ordered: i64 = placed.items.iter().map(|item| i64::from(item.quantity)).sum();
    let cart = cart_service::list_cart(&state, &siswa).await?.data.unwrap();
    assert_eq!(ordered + cart.total_items, 3);

    let menu_after = Menus::find_by_id(menu.id).one(&state.orm).await?.unwrap();
    assert_eq!(i64::from(menu_after.stock), 10 - ordered);
    Ok(())
}
