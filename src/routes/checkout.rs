use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::{
    dto::{cart::Notice, orders::CheckoutPreview},
    error::AppResult,
    models::Order,
    response::{ApiResponse, Meta, redirect},
    services::order_service::CheckoutOutcome,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(checkout_preview).post(place_order))
}

#[utoipa::path(
    get,
    path = "/api/checkout",
    responses(
        (status = 200, description = "Cart lines with shipping, tax and total", body = ApiResponse<CheckoutPreview>),
        (status = 303, description = "Not logged in (to /auth) or empty cart (to /products)"),
    ),
    tag = "Checkout"
)]
pub async fn checkout_preview(State(state): State<AppState>) -> Response {
    match state.checkout.preview() {
        CheckoutOutcome::Ready(preview) => {
            Json(ApiResponse::success("Checkout", preview, Some(Meta::empty()))).into_response()
        }
        CheckoutOutcome::Redirect { location, notice } => redirect(location, notice),
    }
}

#[utoipa::path(
    post,
    path = "/api/checkout",
    responses(
        (status = 200, description = "Order placed", body = ApiResponse<Order>),
        (status = 303, description = "Not logged in (to /auth) or empty cart (to /products)"),
        (status = 409, description = "A checkout is already processing"),
    ),
    tag = "Checkout"
)]
pub async fn place_order(State(state): State<AppState>) -> AppResult<Response> {
    let response = match state.checkout.place_order().await? {
        CheckoutOutcome::Ready(order) => {
            let notice = Notice::new(
                "Order placed successfully!",
                format!("Order #{} has been confirmed", order.id),
            );
            Json(ApiResponse::success(
                "Checkout success",
                order,
                Some(Meta::with_notice(notice)),
            ))
            .into_response()
        }
        CheckoutOutcome::Redirect { location, notice } => redirect(location, notice),
    };
    Ok(response)
}
