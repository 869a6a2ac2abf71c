pub mod activity_logs;
pub mod cart_items;
pub mod discounts;
pub mod menu_discounts;
pub mod menus;
pub mod order_items;
pub mod orders;
pub mod stans;
pub mod students;
pub mod users;

pub use activity_logs::Entity as ActivityLogs;
pub use cart_items::Entity as CartItems;
pub use discounts::Entity as Discounts;
pub use menu_discounts::Entity as MenuDiscounts;
pub use menus::Entity as Menus;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use stans::Entity as Stans;
pub use students::Entity as Students;
pub use users::Entity as Users;
