use uuid::Uuid;

use crate::{db::DbPool, error::AppResult, middleware::auth::AuthUser};

/// Append one activity row for `user`.
pub async fn log_activity(
    pool: &DbPool,
    user: &AuthUser,
    action: &str,
    description: impl Into<String>,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO activity_logs (id, user_id, action, description, ip_address, user_agent)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(action)
    .bind(description.into())
    .bind(user.ip_address.as_deref())
    .bind(user.user_agent.as_deref())
    .execute(pool)
    .await?;

    Ok(())
}

/// Same as [`log_activity`] but never fails the caller.
pub async fn record(pool: &DbPool, user: &AuthUser, action: &str, description: impl Into<String>) {
    if let Err(err) = log_activity(pool, user, action, description).await {
        tracing::warn!(error = %err, action, "activity log failed");
    }
}
