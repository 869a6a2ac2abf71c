#![allow(dead_code)]

use canteen_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    entity::{
        menus::{self, ActiveModel as MenuActive, MenuCategory},
        stans::{self, ActiveModel as StanActive},
        students::{self, ActiveModel as StudentActive},
        users::{ActiveModel as UserActive, UserRole},
    },
    middleware::auth::AuthUser,
    state::AppState,
};
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

/// Connects and migrates, or returns `None` when no database is configured.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests.");
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;

    let config = AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        jwt_ttl_hours: 1,
        log_retention_days: 90,
    };
    Ok(Some(AppState::new(pool, config)))
}

/// Usernames are unique per call so tests can share one database.
pub async fn create_user(state: &AppState, role: UserRole) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(format!("{}_{}", role.as_str(), Uuid::new_v4().simple())),
        password_hash: Set("not-a-real-hash".into()),
        role: Set(role),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;
    Ok(AuthUser::new(user.id, user.role))
}

pub async fn create_vendor(state: &AppState) -> anyhow::Result<(AuthUser, stans::Model)> {
    let owner = create_user(state, UserRole::AdminStan).await?;
    let stan = StanActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(owner.user_id),
        name: Set("Warung Test".into()),
        owner_name: Set("Bu Test".into()),
        accept_cash: Set(true),
        accept_qris: Set(false),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;
    Ok((owner, stan))
}

pub async fn create_student(state: &AppState) -> anyhow::Result<(AuthUser, students::Model)> {
    let user = create_user(state, UserRole::Siswa).await?;
    let student = StudentActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        name: Set("Siswa Test".into()),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;
    Ok((user, student))
}

pub async fn create_menu(
    state: &AppState,
    stan_id: Uuid,
    price: i64,
    stock: i32,
) -> anyhow::Result<menus::Model> {
    let menu = MenuActive {
        id: Set(Uuid::new_v4()),
        stan_id: Set(stan_id),
        name: Set(format!("Menu {}", Uuid::new_v4().simple())),
        price: Set(price),
        category: Set(MenuCategory::Food),
        stock: Set(stock),
        is_available: Set(stock > 0),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;
    Ok(menu)
}
