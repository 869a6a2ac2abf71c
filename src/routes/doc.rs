use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        activity_logs::{ActivityLogList, ActivityStats, CleanLogsResult},
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, CartLine, CartMenu, CartView, UpdateCartItemRequest},
        discounts::{
            AssignMenuRequest, CreateDiscountRequest, DiscountList, DiscountWithMenus,
            UpdateDiscountRequest,
        },
        menus::{
            AdjustStockRequest, AppliedDiscount, CreateMenuRequest, MenuList, MenuWithDiscount,
            SetAvailabilityRequest, SetStockRequest, StockList, UpdateMenuRequest,
        },
        orders::{CheckoutRequest, OrderList, OrderWithItems, UpdateOrderStatusRequest},
        reports::{RevenueReport, StanRevenue, StanStatistics, StanStatisticsList},
        stans::{CreateStanRequest, PaymentSettingsRequest, StanList, UpdateStanRequest},
        students::UpdateStudentRequest,
        users::{UpdateRoleRequest, UserList},
    },
    entity::{
        discounts::DiscountScope, menus::MenuCategory, orders::OrderStatus, users::UserRole,
    },
    models::{ActivityLog, CartItem, Discount, Menu, Order, OrderItem, Stan, Student, User},
    response::{ApiResponse, Empty, Meta},
    routes::{
        activity_logs, admin, auth, cart, discounts, health, menus, orders, params, stans,
        students,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        stans::list_stans,
        stans::get_stan,
        stans::stan_menus,
        stans::stan_discounts,
        stans::my_stan,
        stans::update_my_stan,
        stans::update_payment_settings,
        stans::my_revenue,
        menus::list_menus,
        menus::get_menu,
        menus::create_menu,
        menus::update_menu,
        menus::delete_menu,
        menus::set_stock,
        menus::adjust_stock,
        menus::set_availability,
        menus::low_stock,
        discounts::list_discounts,
        discounts::create_discount,
        discounts::get_discount,
        discounts::update_discount,
        discounts::delete_discount,
        discounts::assign_menu,
        discounts::unassign_menu,
        cart::cart_list,
        cart::add_to_cart,
        cart::update_cart_item,
        cart::remove_from_cart,
        cart::clear_cart,
        orders::list_orders,
        orders::checkout,
        orders::get_order,
        orders::update_order_status,
        orders::delete_order,
        students::my_profile,
        students::update_my_profile,
        activity_logs::list_activity_logs,
        activity_logs::get_activity_log,
        admin::list_users,
        admin::change_role,
        admin::delete_user,
        admin::create_stan,
        admin::delete_stan,
        admin::revenue_report,
        admin::list_stan_statistics,
        admin::stan_statistics,
        admin::stan_revenue,
        admin::activity_stats,
        admin::clean_activity_logs
    ),
    components(
        schemas(
            UserRole,
            OrderStatus,
            MenuCategory,
            DiscountScope,
            User,
            Stan,
            Student,
            Menu,
            Discount,
            CartItem,
            Order,
            OrderItem,
            ActivityLog,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateStanRequest,
            UpdateStanRequest,
            PaymentSettingsRequest,
            StanList,
            CreateMenuRequest,
            UpdateMenuRequest,
            SetStockRequest,
            AdjustStockRequest,
            SetAvailabilityRequest,
            AppliedDiscount,
            MenuWithDiscount,
            MenuList,
            StockList,
            CreateDiscountRequest,
            UpdateDiscountRequest,
            AssignMenuRequest,
            DiscountWithMenus,
            DiscountList,
            AddToCartRequest,
            UpdateCartItemRequest,
            CartMenu,
            CartLine,
            CartView,
            CheckoutRequest,
            UpdateOrderStatusRequest,
            OrderWithItems,
            OrderList,
            UpdateStudentRequest,
            StanRevenue,
            RevenueReport,
            StanStatistics,
            StanStatisticsList,
            ActivityLogList,
            ActivityStats,
            CleanLogsResult,
            UpdateRoleRequest,
            UserList,
            params::Pagination,
            params::SortOrder,
            health::HealthData,
            Meta,
            Empty,
            ApiResponse<Menu>,
            ApiResponse<MenuList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<CartView>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and login"),
        (name = "Stans", description = "Vendor stalls and their settings"),
        (name = "Menus", description = "Menu items and stock"),
        (name = "Discounts", description = "Timed discounts"),
        (name = "Cart", description = "Student cart"),
        (name = "Orders", description = "Checkout and order lifecycle"),
        (name = "Students", description = "Student profile"),
        (name = "Activity Logs", description = "User activity trail"),
        (name = "Admin", description = "Superadmin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_api_group_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/auth/login",
            "/api/menus/{id}/stock/adjust",
            "/api/orders/checkout",
            "/api/discounts/{id}/menus/{menu_id}",
            "/api/admin/activity-logs",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let schemes = doc.components.expect("components").security_schemes;
        assert!(schemes.contains_key("bearer_auth"));
    }
}
