use axum::Router;

use crate::state::AppState;

pub mod activity_logs;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod discounts;
pub mod doc;
pub mod health;
pub mod menus;
pub mod orders;
pub mod params;
pub mod stans;
pub mod students;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/stans", stans::router())
        .nest("/menus", menus::router())
        .nest("/discounts", discounts::router())
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
        .nest("/students", students::router())
        .nest("/activity-logs", activity_logs::router())
        .nest("/admin", admin::router())
}
