use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    config::AppConfig,
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest},
    entity::{
        stans::ActiveModel as StanActive,
        students::ActiveModel as StudentActive,
        users::{self, ActiveModel as UserActive, Entity as Users, UserRole},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ClientInfo},
    models::User,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub fn issue_token(config: &AppConfig, user_id: Uuid, role: UserRole) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(config.jwt_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        role: role.as_str().to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn validate_registration(payload: &RegisterRequest) -> AppResult<()> {
    if payload.username.trim().is_empty() {
        return Err(AppError::bad_request("username is required"));
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::bad_request(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if payload.name.trim().is_empty() {
        return Err(AppError::bad_request("name is required"));
    }
    if payload.role == UserRole::Superadmin {
        return Err(AppError::bad_request("cannot self-register as superadmin"));
    }
    Ok(())
}

/// Create the user and its profile (stan or student) in one transaction.
pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
    client: ClientInfo,
) -> AppResult<ApiResponse<User>> {
    validate_registration(&payload)?;
    let username = payload.username.trim().to_string();

    let txn = state.orm.begin().await?;

    let taken = Users::find()
        .filter(users::Column::Username.eq(username.as_str()))
        .one(&txn)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict("Username is already taken".into()));
    }

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username),
        password_hash: Set(hash_password(&payload.password)?),
        role: Set(payload.role),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    match payload.role {
        UserRole::AdminStan => {
            StanActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.id),
                name: Set(payload.name.trim().to_string()),
                owner_name: Set(payload
                    .owner_name
                    .clone()
                    .unwrap_or_else(|| payload.name.trim().to_string())),
                phone: Set(payload.phone.clone()),
                accept_cash: Set(true),
                accept_qris: Set(false),
                deleted_at: Set(None),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
        UserRole::Siswa => {
            StudentActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.id),
                name: Set(payload.name.trim().to_string()),
                address: Set(payload.address.clone()),
                phone: Set(payload.phone.clone()),
                deleted_at: Set(None),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
        UserRole::Superadmin => {}
    }

    txn.commit().await?;

    let actor = AuthUser::new(user.id, user.role).with_client(client);
    audit::record(
        &state.pool,
        &actor,
        "register",
        format!("registered as {}", user.role),
    )
    .await;

    Ok(ApiResponse::success("User created", User::from(user), None))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
    client: ClientInfo,
) -> AppResult<ApiResponse<LoginResponse>> {
    let user = Users::find()
        .filter(users::Column::Username.eq(payload.username.trim()))
        .filter(users::Column::DeletedAt.is_null())
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid username or password".into()))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid username or password".into()));
    }

    let token = issue_token(&state.config, user.id, user.role)?;

    let actor = AuthUser::new(user.id, user.role).with_client(client);
    audit::record(&state.pool, &actor, "login", "logged in").await;

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            token,
            user: User::from(user),
        },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{DecodingKey, Validation, decode};

    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            database_url: String::new(),
            host: "127.0.0.1".into(),
            port: 3000,
            jwt_secret: "test-secret".into(),
            jwt_ttl_hours: 1,
            log_retention_days: 90,
        }
    }

    fn request(role: UserRole, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: "budi".into(),
            password: password.into(),
            role,
            name: "Budi".into(),
            phone: None,
            address: None,
            owner_name: None,
        }
    }

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("rahasia123").unwrap();
        assert!(verify_password("rahasia123", &hash).unwrap());
        assert!(!verify_password("salah", &hash).unwrap());
    }

    #[test]
    fn token_carries_subject_and_role() {
        let cfg = config();
        let id = Uuid::new_v4();
        let token = issue_token(&cfg, id, UserRole::AdminStan).unwrap();
        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(cfg.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(decoded.claims.sub, id.to_string());
        assert_eq!(decoded.claims.role, "admin_stan");
    }

    #[test]
    fn registration_rules() {
        assert!(validate_registration(&request(UserRole::Siswa, "123456")).is_ok());
        assert!(validate_registration(&request(UserRole::Siswa, "12345")).is_err());
        assert!(validate_registration(&request(UserRole::Superadmin, "123456")).is_err());
    }
}
