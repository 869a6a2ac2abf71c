use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::reports::{RevenueReport, StanRevenue, StanStatistics, StanStatisticsList},
    entity::{
        stans::{self, Entity as Stans},
        users::UserRole,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_role, ensure_superadmin},
    response::{ApiResponse, Meta},
    routes::params::DateRangeQuery,
    services::ownership::{ResourceOwner, resolve_tenant},
    state::AppState,
};

#[derive(FromRow)]
struct RevenueRow {
    stan_id: Uuid,
    stan_name: String,
    total_revenue: i64,
    total_orders: i64,
}

impl From<RevenueRow> for StanRevenue {
    fn from(row: RevenueRow) -> Self {
        Self {
            stan_id: row.stan_id,
            stan_name: row.stan_name,
            total_revenue: row.total_revenue,
            total_orders: row.total_orders,
        }
    }
}

#[derive(FromRow)]
struct MenuCountRow {
    total_menu: i64,
    available_menu: i64,
}

// Orders are counted in every status; revenue is quantity x purchase price.
const REVENUE_SQL: &str = r#"
    SELECT s.id AS stan_id, s.name AS stan_name,
           COALESCE(SUM(oi.quantity::BIGINT * oi.purchase_price), 0)::BIGINT AS total_revenue,
           COUNT(DISTINCT o.id)::BIGINT AS total_orders
    FROM stans s
    LEFT JOIN orders o ON o.stan_id = s.id
        AND ($1::timestamptz IS NULL OR o.ordered_at >= $1)
        AND ($2::timestamptz IS NULL OR o.ordered_at <= $2)
    LEFT JOIN order_items oi ON oi.order_id = o.id
"#;

pub fn average_order(total_revenue: i64, total_orders: i64) -> f64 {
    if total_orders > 0 {
        total_revenue as f64 / total_orders as f64
    } else {
        0.0
    }
}

pub fn build_report(stans: Vec<StanRevenue>, range: DateRangeQuery) -> RevenueReport {
    let total_revenue = stans.iter().map(|s| s.total_revenue).sum();
    let total_orders = stans.iter().map(|s| s.total_orders).sum();
    RevenueReport {
        total_revenue,
        total_orders,
        stans,
        from: range.from,
        to: range.to,
    }
}

pub async fn stan_revenue(
    pool: &DbPool,
    stan_id: Uuid,
    range: DateRangeQuery,
) -> AppResult<StanRevenue> {
    let sql = format!("{REVENUE_SQL} WHERE s.id = $3 AND s.deleted_at IS NULL GROUP BY s.id, s.name");
    let row = sqlx::query_as::<_, RevenueRow>(&sql)
        .bind(range.from)
        .bind(range.to)
        .bind(stan_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(row.into())
}

pub async fn all_stan_revenue(pool: &DbPool, range: DateRangeQuery) -> AppResult<Vec<StanRevenue>> {
    let sql = format!(
        "{REVENUE_SQL} WHERE s.deleted_at IS NULL GROUP BY s.id, s.name ORDER BY total_revenue DESC, s.name"
    );
    let rows = sqlx::query_as::<_, RevenueRow>(&sql)
        .bind(range.from)
        .bind(range.to)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(StanRevenue::from).collect())
}

pub async fn stan_statistics(
    pool: &DbPool,
    stan_id: Uuid,
    range: DateRangeQuery,
) -> AppResult<StanStatistics> {
    let revenue = stan_revenue(pool, stan_id, range).await?;

    let menus = sqlx::query_as::<_, MenuCountRow>(
        r#"
        SELECT COUNT(*)::BIGINT AS total_menu,
               COUNT(*) FILTER (WHERE is_available AND stock > 0)::BIGINT AS available_menu
        FROM menus
        WHERE stan_id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(stan_id)
    .fetch_one(pool)
    .await?;

    Ok(StanStatistics {
        stan_id: revenue.stan_id,
        stan_name: revenue.stan_name,
        total_menu: menus.total_menu,
        available_menu: menus.available_menu,
        total_orders: revenue.total_orders,
        total_revenue: revenue.total_revenue,
        average_order: average_order(revenue.total_revenue, revenue.total_orders),
    })
}

async fn authorized_stan(state: &AppState, user: &AuthUser, stan_id: Option<Uuid>) -> AppResult<Uuid> {
    ensure_role(user, &[UserRole::Superadmin, UserRole::AdminStan])?;
    let tenant = resolve_tenant(&state.orm, user).await?;
    let stan_id = stan_id
        .or(tenant.stan_id())
        .ok_or_else(|| AppError::bad_request("stan_id is required"))?;
    let stan = Stans::find_by_id(stan_id)
        .filter(stans::Column::DeletedAt.is_null())
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    tenant.ensure_can_access(ResourceOwner::Stan(stan.id))?;
    Ok(stan.id)
}

/// Revenue of one stan; vendor admins default to their own.
pub async fn get_stan_revenue(
    state: &AppState,
    user: &AuthUser,
    stan_id: Option<Uuid>,
    range: DateRangeQuery,
) -> AppResult<ApiResponse<StanRevenue>> {
    let stan_id = authorized_stan(state, user, stan_id).await?;
    let revenue = stan_revenue(&state.pool, stan_id, range).await?;
    Ok(ApiResponse::success("Revenue", revenue, Some(Meta::empty())))
}

pub async fn get_revenue_report(
    state: &AppState,
    user: &AuthUser,
    range: DateRangeQuery,
) -> AppResult<ApiResponse<RevenueReport>> {
    ensure_superadmin(user)?;
    let stans = all_stan_revenue(&state.pool, range).await?;
    Ok(ApiResponse::success(
        "Revenue report",
        build_report(stans, range),
        Some(Meta::empty()),
    ))
}

pub async fn get_stan_statistics(
    state: &AppState,
    user: &AuthUser,
    stan_id: Uuid,
    range: DateRangeQuery,
) -> AppResult<ApiResponse<StanStatistics>> {
    let stan_id = authorized_stan(state, user, Some(stan_id)).await?;
    let stats = stan_statistics(&state.pool, stan_id, range).await?;
    Ok(ApiResponse::success("Stan statistics", stats, Some(Meta::empty())))
}

pub async fn list_stan_statistics(
    state: &AppState,
    user: &AuthUser,
    range: DateRangeQuery,
) -> AppResult<ApiResponse<StanStatisticsList>> {
    ensure_superadmin(user)?;
    let revenues = all_stan_revenue(&state.pool, range).await?;
    let mut items = Vec::with_capacity(revenues.len());
    for revenue in revenues {
        items.push(stan_statistics(&state.pool, revenue.stan_id, range).await?);
    }
    Ok(ApiResponse::success(
        "Stan statistics",
        StanStatisticsList { items },
        None,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_guards_zero_orders() {
        assert_eq!(average_order(0, 0), 0.0);
        assert_eq!(average_order(45_000, 3), 15_000.0);
    }

    #[test]
    fn report_sums_stans() {
        let stans = vec![
            StanRevenue {
                stan_id: Uuid::new_v4(),
                stan_name: "Bakso Pak Kumis".into(),
                total_revenue: 30_000,
                total_orders: 2,
            },
            StanRevenue {
                stan_id: Uuid::new_v4(),
                stan_name: "Es Teh Manis".into(),
                total_revenue: 12_000,
                total_orders: 3,
            },
        ];
        let report = build_report(stans, DateRangeQuery::default());
        assert_eq!(report.total_revenue, 42_000);
        assert_eq!(report.total_orders, 5);
        assert_eq!(report.stans.len(), 2);
    }
}
