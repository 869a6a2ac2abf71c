use canteen_api::{
    config::AppConfig,
    db::{DbPool, create_pool, run_migrations},
    entity::{menus::MenuCategory, users::UserRole},
    services::auth_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let superadmin_id = ensure_user(&pool, "superadmin", "superadmin123", UserRole::Superadmin).await?;
    let vendor_id = ensure_user(&pool, "stan_bakso", "stan123", UserRole::AdminStan).await?;
    let siswa_id = ensure_user(&pool, "siswa1", "siswa123", UserRole::Siswa).await?;

    let stan_id = ensure_stan(&pool, vendor_id, "Bakso Pak Kumis", "Pak Kumis").await?;
    ensure_student(&pool, siswa_id, "Siswa Satu").await?;
    seed_menus(&pool, stan_id).await?;

    println!("Seed completed. Superadmin ID: {superadmin_id}, Stan ID: {stan_id}");
    Ok(())
}

async fn ensure_user(
    pool: &DbPool,
    username: &str,
    password: &str,
    role: UserRole,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (username) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;

    println!("Ensured user {username} (role={role})");
    Ok(id)
}

async fn ensure_stan(pool: &DbPool, user_id: Uuid, name: &str, owner: &str) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO stans (id, user_id, name, owner_name)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(name)
    .bind(owner)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn ensure_student(pool: &DbPool, user_id: Uuid, name: &str) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO students (id, user_id, name)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(name)
    .execute(pool)
    .await?;
    Ok(())
}

async fn seed_menus(pool: &DbPool, stan_id: Uuid) -> anyhow::Result<()> {
    let menus = vec![
        ("Bakso Urat", "Bakso urat dengan mie kuning", 15000_i64, MenuCategory::Food, 30),
        ("Mie Ayam", "Mie ayam pangsit", 12000, MenuCategory::Food, 25),
        ("Es Teh Manis", "Teh manis dingin", 4000, MenuCategory::Drink, 50),
        ("Es Jeruk", "Jeruk peras segar", 5000, MenuCategory::Drink, 0),
    ];

    for (name, desc, price, category, stock) in menus {
        let exists: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM menus WHERE stan_id = $1 AND name = $2")
                .bind(stan_id)
                .bind(name)
                .fetch_optional(pool)
                .await?;
        if exists.is_some() {
            continue;
        }

        sqlx::query(
            r#"
            INSERT INTO menus (id, stan_id, name, description, price, category, stock, is_available)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(stan_id)
        .bind(name)
        .bind(desc)
        .bind(price)
        .bind(category.as_str())
        .bind(stock)
        .bind(stock > 0)
        .execute(pool)
        .await?;
    }

    println!("Seeded menus");
    Ok(())
}
