use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::orders::OrderList,
    middleware::auth::CurrentUser,
    models::Order,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn route() -> Router<AppState> {
    Router::new().route("/", get(list_orders))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "Order history, newest first", body = ApiResponse<OrderList>),
        (status = 401, description = "Not logged in")
    ),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Json<ApiResponse<OrderList>> {
    let orders: Vec<Order> = state.checkout.orders();
    let meta = Meta::new(orders.len() as u64);
    Json(ApiResponse::success("Ok", OrderList { items: orders }, Some(meta)))
}
