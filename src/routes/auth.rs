use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::auth::{LoginRequest, SessionData},
    error::AppResult,
    middleware::auth::CurrentUser,
    models::User,
    response::{ApiResponse, Meta},
    services::auth_service::user_from_login,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in (local stand-in, no credential check)", body = ApiResponse<User>),
        (status = 400, description = "Invalid email")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let user = user_from_login(payload)?;
    state.auth.login(user.clone());
    Ok(Json(ApiResponse::success("Logged in", user, Some(Meta::empty()))))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out; the cart is emptied", body = ApiResponse<SessionData>)
    ),
    tag = "Auth"
)]
pub async fn logout(State(state): State<AppState>) -> Json<ApiResponse<SessionData>> {
    state.auth.logout();
    Json(ApiResponse::success(
        "Logged out",
        SessionData { user: None },
        Some(Meta::empty()),
    ))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<SessionData>),
        (status = 401, description = "Not logged in")
    ),
    tag = "Auth"
)]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<ApiResponse<SessionData>> {
    Json(ApiResponse::success(
        "OK",
        SessionData { user: Some(user) },
        None,
    ))
}
