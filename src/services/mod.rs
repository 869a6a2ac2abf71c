pub mod activity_log_service;
pub mod auth_service;
pub mod cart_service;
pub mod discount_service;
pub mod menu_service;
pub mod order_service;
pub mod ownership;
pub mod report_service;
pub mod stan_service;
pub mod stock_service;
pub mod student_service;
pub mod user_service;
