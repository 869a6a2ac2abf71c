pub mod activity_logs;
pub mod auth;
pub mod cart;
pub mod discounts;
pub mod menus;
pub mod orders;
pub mod reports;
pub mod stans;
pub mod students;
pub mod users;
