mod common;

use canteen_api::{
    dto::discounts::{CreateDiscountRequest, UpdateDiscountRequest},
    entity::{discounts::DiscountScope, users::UserRole},
    error::AppError,
    services::discount_service,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

// Windows sit far in the future so these rows never price live checkouts.
fn future_window() -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap();
    (start, start + Duration::days(7))
}

fn request(
    name: &str,
    percentage: f64,
    scope: DiscountScope,
    menu_ids: Vec<Uuid>,
) -> CreateDiscountRequest {
    let (starts_at, ends_at) = future_window();
    CreateDiscountRequest {
        name: name.into(),
        percentage,
        starts_at,
        ends_at,
        scope,
        stan_id: None,
        menu_ids,
    }
}

#[tokio::test]
async fn menu_discount_outranks_global() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let superadmin = common::create_user(&state, UserRole::Superadmin).await?;
    let (vendor, stan) = common::create_vendor(&state).await?;
    let linked = common::create_menu(&state, stan.id, 10_000, 5).await?;
    let plain = common::create_menu(&state, stan.id, 10_000, 5).await?;

    discount_service::create_discount(
        &state,
        &superadmin,
        request("Hari Guru", 5.0, DiscountScope::Global, vec![]),
    )
    .await?;
    let per_menu = discount_service::create_discount(
        &state,
        &vendor,
        request("Promo Bakso", 20.0, DiscountScope::Menu, vec![linked.id]),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(per_menu.menu_ids, vec![linked.id]);
    assert_eq!(per_menu.discount.stan_id, Some(stan.id));

    let at = future_window().0 + Duration::days(1);
    let picked = discount_service::resolve_active_discount(&state.orm, linked.id, at)
        .await?
        .expect("menu discount applies");
    assert_eq!(picked.id, per_menu.discount.id);
    assert_eq!(picked.percentage, 20.0);

    let fallback = discount_service::resolve_active_discount(&state.orm, plain.id, at)
        .await?
        .expect("global discount applies");
    assert_eq!(fallback.scope, DiscountScope::Global);
    assert_eq!(fallback.percentage, 5.0);

    let outside = discount_service::resolve_active_discount(&state.orm, linked.id, Utc::now()).await?;
    assert!(outside.is_none());
    Ok(())
}

#[tokio::test]
async fn start_after_end_is_rejected() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let (vendor, _) = common::create_vendor(&state).await?;

    let (starts_at, ends_at) = future_window();
    let mut bad = request("Terbalik", 10.0, DiscountScope::Stan, vec![]);
    bad.starts_at = ends_at;
    bad.ends_at = starts_at;

    let err = discount_service::create_discount(&state, &vendor, bad)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let over = request("Kebanyakan", 120.0, DiscountScope::Stan, vec![]);
    let err = discount_service::create_discount(&state, &vendor, over)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    Ok(())
}

#[tokio::test]
async fn vendor_cannot_touch_another_stans_discount() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let (owner, _) = common::create_vendor(&state).await?;
    let (intruder, _) = common::create_vendor(&state).await?;

    let created = discount_service::create_discount(
        &state,
        &owner,
        request("Promo Pagi", 10.0, DiscountScope::Stan, vec![]),
    )
    .await?
    .data
    .unwrap();

    let err = discount_service::update_discount(
        &state,
        &intruder,
        created.discount.id,
        UpdateDiscountRequest {
            percentage: Some(90.0),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = discount_service::delete_discount(&state, &intruder, created.discount.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = discount_service::create_discount(
        &state,
        &owner,
        request("Global Palsu", 10.0, DiscountScope::Global, vec![]),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    Ok(())
}

#[tokio::test]
async fn unknown_discount_is_not_found() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let (vendor, _) = common::create_vendor(&state).await?;

    let err = discount_service::get_discount(&state, &vendor, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    Ok(())
}
