use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit,
    db::DbPool,
    dto::activity_logs::{ActivityLogList, ActivityStats, CleanLogsResult},
    entity::activity_logs::{self, Entity as ActivityLogs},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_superadmin},
    models::ActivityLog,
    response::{ApiResponse, Meta},
    routes::params::{ActivityLogQuery, CleanLogsQuery},
    state::AppState,
};

#[derive(FromRow)]
struct StatsRow {
    total_activities: i64,
    unique_users: i64,
    today_activities: i64,
}

pub fn retention_cutoff(now: DateTime<Utc>, days: i64) -> AppResult<DateTime<Utc>> {
    if days < 0 {
        return Err(AppError::bad_request("retention days cannot be negative"));
    }
    Duration::try_days(days)
        .and_then(|span| now.checked_sub_signed(span))
        .ok_or_else(|| AppError::bad_request("retention days out of range"))
}

/// Delete log rows created before `now - days`. Returns the number removed
/// and the cutoff used.
pub async fn prune_activity_logs(
    pool: &DbPool,
    days: i64,
    now: DateTime<Utc>,
) -> AppResult<(u64, DateTime<Utc>)> {
    let cutoff = retention_cutoff(now, days)?;
    let result = sqlx::query("DELETE FROM activity_logs WHERE created_at < $1")
        .bind(cutoff)
        .execute(pool)
        .await?;
    Ok((result.rows_affected(), cutoff))
}

pub async fn activity_stats(pool: &DbPool, now: DateTime<Utc>) -> AppResult<ActivityStats> {
    let start_of_day = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or(now);

    let row = sqlx::query_as::<_, StatsRow>(
        r#"
        SELECT COUNT(*)::BIGINT AS total_activities,
               COUNT(DISTINCT user_id)::BIGINT AS unique_users,
               COUNT(*) FILTER (WHERE created_at >= $1)::BIGINT AS today_activities
        FROM activity_logs
        "#,
    )
    .bind(start_of_day)
    .fetch_one(pool)
    .await?;

    Ok(ActivityStats {
        total_activities: row.total_activities,
        unique_users: row.unique_users,
        today_activities: row.today_activities,
    })
}

/// Superadmin sees every row; everyone else only their own.
pub async fn list_activity_logs(
    state: &AppState,
    user: &AuthUser,
    query: ActivityLogQuery,
) -> AppResult<ApiResponse<ActivityLogList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if !user.is_superadmin() {
        condition = condition.add(activity_logs::Column::UserId.eq(user.user_id));
    }
    if let Some(action) = query.action.as_deref().filter(|a| !a.is_empty()) {
        condition = condition.add(activity_logs::Column::Action.eq(action));
    }
    if let Some(from) = query.from {
        condition = condition.add(activity_logs::Column::CreatedAt.gte(from));
    }
    if let Some(to) = query.to {
        condition = condition.add(activity_logs::Column::CreatedAt.lte(to));
    }

    let finder = ActivityLogs::find()
        .filter(condition)
        .order_by_desc(activity_logs::Column::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(ActivityLog::from)
        .collect();

    Ok(ApiResponse::success(
        "Activity logs",
        ActivityLogList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_activity_log(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<ActivityLog>> {
    let log = ActivityLogs::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if !user.is_superadmin() && log.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }
    Ok(ApiResponse::success(
        "OK",
        ActivityLog::from(log),
        Some(Meta::empty()),
    ))
}

pub async fn get_activity_stats(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ActivityStats>> {
    ensure_superadmin(user)?;
    let stats = activity_stats(&state.pool, Utc::now()).await?;
    Ok(ApiResponse::success("Activity stats", stats, Some(Meta::empty())))
}

pub async fn clean_old_logs(
    state: &AppState,
    user: &AuthUser,
    query: CleanLogsQuery,
) -> AppResult<ApiResponse<CleanLogsResult>> {
    ensure_superadmin(user)?;
    let days = query
        .older_than_days
        .unwrap_or(state.config.log_retention_days);

    let (deleted, cutoff) = prune_activity_logs(&state.pool, days, Utc::now()).await?;
    tracing::info!(deleted, %cutoff, "activity logs pruned");

    audit::record(
        &state.pool,
        user,
        "clean_activity_logs",
        format!("removed {deleted} activity logs older than {days} days"),
    )
    .await;

    Ok(ApiResponse::success(
        "Old logs removed",
        CleanLogsResult { deleted, cutoff },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn cutoff_is_days_before_now() {
        let now = Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap();
        let cutoff = retention_cutoff(now, 90).unwrap();
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap());
        assert_eq!(retention_cutoff(now, 0).unwrap(), now);
    }

    #[test]
    fn negative_or_huge_retention_is_rejected() {
        let now = Utc::now();
        assert!(matches!(retention_cutoff(now, -1), Err(AppError::BadRequest(_))));
        assert!(retention_cutoff(now, i64::MAX).is_err());
    }
}
