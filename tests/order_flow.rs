mod common;

use canteen_api::{
    dto::{
        cart::AddToCartRequest,
        discounts::CreateDiscountRequest,
        orders::{CheckoutRequest, OrderWithItems, UpdateOrderStatusRequest},
    },
    entity::{
        discounts::DiscountScope,
        order_items::{self, Entity as OrderItems},
        orders::{Entity as Orders, OrderStatus},
        users::UserRole,
    },
    error::AppError,
    middleware::auth::AuthUser,
    routes::params::DateRangeQuery,
    services::{cart_service, discount_service, order_service, report_service},
    state::AppState,
};
use chrono::{Duration, Utc};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

async fn place(
    state: &AppState,
    siswa: &AuthUser,
    stan_id: Uuid,
    lines: &[(Uuid, i32)],
) -> anyhow::Result<OrderWithItems> {
    for &(menu_id, quantity) in lines {
        cart_service::add_to_cart(state, siswa, AddToCartRequest { menu_id, quantity }).await?;
    }
    let placed = order_service::checkout(state, siswa, CheckoutRequest { stan_id })
        .await?
        .data
        .unwrap();
    Ok(placed)
}

async fn move_to(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    status: OrderStatus,
) -> Result<OrderStatus, AppError> {
    let order = order_service::update_order_status(
        state,
        user,
        id,
        UpdateOrderStatusRequest { status },
    )
    .await?;
    Ok(order.data.unwrap().status)
}

#[tokio::test]
async fn status_moves_forward_one_step_at_a_time() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let (vendor, stan) = common::create_vendor(&state).await?;
    let (intruder, _) = common::create_vendor(&state).await?;
    let (siswa, _) = common::create_student(&state).await?;
    let menu = common::create_menu(&state, stan.id, 10_000, 5).await?;
    let order = place(&state, &siswa, stan.id, &[(menu.id, 1)]).await?.order;

    let err = move_to(&state, &vendor, order.id, OrderStatus::Delivering).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let err = move_to(&state, &intruder, order.id, OrderStatus::Cooking).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = move_to(&state, &siswa, order.id, OrderStatus::Cooking).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    assert_eq!(
        move_to(&state, &vendor, order.id, OrderStatus::Cooking).await?,
        OrderStatus::Cooking
    );
    let err = move_to(&state, &vendor, order.id, OrderStatus::Unconfirmed).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    assert_eq!(
        move_to(&state, &vendor, order.id, OrderStatus::Delivering).await?,
        OrderStatus::Delivering
    );
    assert_eq!(
        move_to(&state, &vendor, order.id, OrderStatus::Delivered).await?,
        OrderStatus::Delivered
    );
    let err = move_to(&state, &vendor, order.id, OrderStatus::Delivered).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let err = move_to(&state, &vendor, Uuid::new_v4(), OrderStatus::Cooking).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    Ok(())
}

#[tokio::test]
async fn deleting_an_order_removes_its_lines() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let (vendor, stan) = common::create_vendor(&state).await?;
    let (intruder, _) = common::create_vendor(&state).await?;
    let (siswa, _) = common::create_student(&state).await?;
    let nasi = common::create_menu(&state, stan.id, 10_000, 5).await?;
    let teh = common::create_menu(&state, stan.id, 4_000, 5).await?;
    let order = place(&state, &siswa, stan.id, &[(nasi.id, 1), (teh.id, 2)]).await?.order;

    let err = order_service::delete_order(&state, &intruder, order.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    let err = order_service::delete_order(&state, &siswa, order.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    order_service::delete_order(&state, &vendor, order.id).await?;

    assert!(Orders::find_by_id(order.id).one(&state.orm).await?.is_none());
    let lines = OrderItems::find()
        .filter(order_items::Column::OrderId.eq(order.id))
        .count(&state.orm)
        .await?;
    assert_eq!(lines, 0);

    let err = order_service::get_order(&state, &vendor, order.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    Ok(())
}

#[tokio::test]
async fn revenue_sums_discounted_purchase_prices() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let (vendor, stan) = common::create_vendor(&state).await?;
    let (siswa, _) = common::create_student(&state).await?;
    let bakso = common::create_menu(&state, stan.id, 10_000, 10).await?;
    let es = common::create_menu(&state, stan.id, 5_000, 10).await?;

    let now = Utc::now();
    discount_service::create_discount(
        &state,
        &vendor,
        CreateDiscountRequest {
            name: "Promo Bakso".into(),
            percentage: 20.0,
            starts_at: now - Duration::hours(1),
            ends_at: now + Duration::hours(1),
            scope: DiscountScope::Menu,
            stan_id: None,
            menu_ids: vec![bakso.id],
        },
    )
    .await?;

    let placed = place(&state, &siswa, stan.id, &[(bakso.id, 2), (es.id, 1)]).await?;
    assert_eq!(placed.total, 21_000);

    let revenue = report_service::stan_revenue(&state.pool, stan.id, DateRangeQuery::default()).await?;
    assert_eq!(revenue.total_revenue, 21_000);
    assert_eq!(revenue.total_orders, 1);

    let own = report_service::get_stan_revenue(&state, &vendor, None, DateRangeQuery::default())
        .await?
        .data
        .unwrap();
    assert_eq!(own, revenue);

    let superadmin = common::create_user(&state, UserRole::Superadmin).await?;
    let stats = report_service::get_stan_statistics(
        &state,
        &superadmin,
        stan.id,
        DateRangeQuery::default(),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(stats.total_revenue, 21_000);
    assert_eq!(stats.total_menu, 2);
    assert_eq!(stats.average_order, 21_000.0);
    Ok(())
}

#[tokio::test]
async fn revenue_of_missing_stan_is_not_found_before_forbidden() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let (vendor, _) = common::create_vendor(&state).await?;
    let (_, other) = common::create_vendor(&state).await?;

    let err = report_service::get_stan_revenue(
        &state,
        &vendor,
        Some(Uuid::new_v4()),
        DateRangeQuery::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let err = report_service::get_stan_revenue(
        &state,
        &vendor,
        Some(other.id),
        DateRangeQuery::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    Ok(())
}
