use axum::{
    Json, Router,
    extract::{Path, State},
    response::Response,
    routing::{get, patch, post},
};

use crate::{
    dto::cart::{
        AddToCartRequest, AddToCartResponse, BuyNowRequest, CartView, DrawerRequest, DrawerState,
        Notice, UpdateQuantityRequest,
    },
    error::{AppError, AppResult},
    response::{ApiResponse, Meta, redirect},
    services::{
        cart_service::{AddOutcome, AddToCartOptions},
        product_service,
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cart_view).post(add_to_cart).delete(clear_cart))
        .route("/drawer", post(set_drawer))
        .route("/buy-now", post(buy_now))
        .route("/{id}", patch(update_quantity).delete(remove_item))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart items with derived totals", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn cart_view(State(state): State<AppState>) -> Json<ApiResponse<CartView>> {
    let view = state.cart.view();
    let meta = Meta::new(view.items.len() as u64);
    Json(ApiResponse::success("OK", view, Some(meta)))
}

async fn add_product(
    state: &AppState,
    product_id: u64,
    options: AddToCartOptions,
) -> AppResult<AddToCartResponse> {
    if state.auth.current_user().is_none() {
        return Err(AppError::LoginRequired(AddOutcome::LoginRequired.notice()));
    }
    let product = product_service::get_product(&state.catalog, product_id).await?;
    let outcome = state.cart.add_to_cart(product, options);
    let notice = outcome.notice();
    match outcome {
        AddOutcome::Added(item) => Ok(AddToCartResponse { item, notice }),
        AddOutcome::LoginRequired => Err(AppError::LoginRequired(notice)),
    }
}

#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Added one unit of the product", body = ApiResponse<AddToCartResponse>),
        (status = 401, description = "Login required; cart unchanged"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<AddToCartResponse>>> {
    let options = AddToCartOptions {
        open_drawer: payload.open_drawer.unwrap_or(true),
    };
    let added = add_product(&state, payload.product_id, options).await?;
    let meta = Meta::with_notice(added.notice.clone());
    Ok(Json(ApiResponse::success("Added to cart", added, Some(meta))))
}

#[utoipa::path(
    post,
    path = "/api/cart/buy-now",
    request_body = BuyNowRequest,
    responses(
        (status = 303, description = "Added without opening the drawer; continue to checkout"),
        (status = 401, description = "Login required; cart unchanged"),
    ),
    tag = "Cart"
)]
pub async fn buy_now(
    State(state): State<AppState>,
    Json(payload): Json<BuyNowRequest>,
) -> AppResult<Response> {
    let added = add_product(
        &state,
        payload.product_id,
        AddToCartOptions { open_drawer: false },
    )
    .await?;
    Ok(redirect("/api/checkout", Some(added.notice)))
}

#[utoipa::path(
    patch,
    path = "/api/cart/{id}",
    params(
        ("id" = u64, Path, description = "Product ID")
    ),
    request_body = UpdateQuantityRequest,
    responses(
        (status = 200, description = "Quantity set (minimum 1)", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn update_quantity(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> Json<ApiResponse<CartView>> {
    let quantity = u32::try_from(payload.quantity.max(1)).unwrap_or(u32::MAX);
    state.cart.update_quantity(id, quantity);
    Json(ApiResponse::success("Updated", state.cart.view(), None))
}

#[utoipa::path(
    delete,
    path = "/api/cart/{id}",
    params(
        ("id" = u64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Removed (no-op when absent)", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Json<ApiResponse<CartView>> {
    state.cart.remove_item(id);
    let notice = Notice::new(
        "Removed from cart",
        "Item has been removed from your cart",
    );
    Json(ApiResponse::success(
        "Removed from cart",
        state.cart.view(),
        Some(Meta::with_notice(notice)),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart emptied", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn clear_cart(State(state): State<AppState>) -> Json<ApiResponse<CartView>> {
    state.cart.clear_cart();
    Json(ApiResponse::success("Cleared", state.cart.view(), None))
}

#[utoipa::path(
    post,
    path = "/api/cart/drawer",
    request_body = DrawerRequest,
    responses(
        (status = 200, description = "Drawer state after the action", body = ApiResponse<DrawerState>)
    ),
    tag = "Cart"
)]
pub async fn set_drawer(
    State(state): State<AppState>,
    Json(payload): Json<DrawerRequest>,
) -> Json<ApiResponse<DrawerState>> {
    let is_open = state.cart.set_drawer(payload.action);
    Json(ApiResponse::success("OK", DrawerState { is_open }, None))
}
