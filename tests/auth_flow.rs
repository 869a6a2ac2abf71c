mod common;

use canteen_api::{
    dto::auth::{LoginRequest, RegisterRequest},
    entity::users::UserRole,
    error::AppError,
    middleware::auth::{AuthUser, ClientInfo},
    services::{auth_service, stan_service},
};
use uuid::Uuid;

fn register(username: &str, role: UserRole) -> RegisterRequest {
    RegisterRequest {
        username: username.into(),
        password: "rahasia123".into(),
        role,
        name: "Soto Bu Sri".into(),
        phone: Some("08123456789".into()),
        address: None,
        owner_name: Some("Bu Sri".into()),
    }
}

#[tokio::test]
async fn vendor_registration_creates_stan_and_can_log_in() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let username = format!("soto_{}", Uuid::new_v4().simple());

    let user = auth_service::register_user(
        &state,
        register(&username, UserRole::AdminStan),
        ClientInfo::default(),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(user.role, UserRole::AdminStan);

    let stan = stan_service::my_stan(&state, &AuthUser::new(user.id, user.role))
        .await?
        .data
        .unwrap();
    assert_eq!(stan.name, "Soto Bu Sri");
    assert_eq!(stan.owner_name, "Bu Sri");

    let login = auth_service::login_user(
        &state,
        LoginRequest {
            username: username.clone(),
            password: "rahasia123".into(),
        },
        ClientInfo {
            ip_address: Some("10.1.2.3".into()),
            user_agent: Some("integration-test".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(!login.token.is_empty());
    assert_eq!(login.user.id, user.id);

    let err = auth_service::register_user(
        &state,
        register(&username, UserRole::Siswa),
        ClientInfo::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let username = format!("siswa_{}", Uuid::new_v4().simple());
    auth_service::register_user(&state, register(&username, UserRole::Siswa), ClientInfo::default())
        .await?;

    let err = auth_service::login_user(
        &state,
        LoginRequest {
            username,
            password: "salah-total".into(),
        },
        ClientInfo::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
    Ok(())
}
