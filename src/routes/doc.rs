use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, SessionData},
        cart::{
            AddToCartRequest, AddToCartResponse, BuyNowRequest, CartView, DrawerAction,
            DrawerRequest, DrawerState, Notice, UpdateQuantityRequest,
        },
        orders::{CheckoutPreview, OrderList, OrderSummary},
        products::{CategoryList, ProductCatalog, ProductList},
    },
    models::{CartItem, Order, OrderStatus, Product, Rating, User},
    response::{ApiResponse, Meta, RedirectData},
    routes::{auth, cart, checkout, health, orders, params, products},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::logout,
        auth::me,
        products::list_products,
        products::featured_products,
        products::list_categories,
        products::products_in_category,
        products::get_product,
        cart::cart_view,
        cart::add_to_cart,
        cart::buy_now,
        cart::update_quantity,
        cart::remove_item,
        cart::clear_cart,
        cart::set_drawer,
        checkout::checkout_preview,
        checkout::place_order,
        orders::list_orders
    ),
    components(
        schemas(
            User,
            Product,
            Rating,
            CartItem,
            Order,
            OrderStatus,
            LoginRequest,
            SessionData,
            AddToCartRequest,
            AddToCartResponse,
            BuyNowRequest,
            UpdateQuantityRequest,
            DrawerAction,
            DrawerRequest,
            DrawerState,
            Notice,
            CartView,
            CheckoutPreview,
            OrderSummary,
            OrderList,
            ProductList,
            CategoryList,
            ProductCatalog,
            RedirectData,
            params::ProductQuery,
            params::ProductSort,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartView>,
            ApiResponse<Order>,
            ApiResponse<OrderList>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Catalog browsing"),
        (name = "Auth", description = "Local session login (no credential check)"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Checkout", description = "Simulated checkout"),
        (name = "Orders", description = "Order history"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
