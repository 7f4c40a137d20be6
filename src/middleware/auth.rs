use axum::extract::{FromRef, FromRequestParts};

use crate::{error::AppError, models::User, state::AppState};

/// The logged-in session user. Rejects with 401 when nobody is logged in.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        state
            .auth
            .current_user()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized("You need to login first".into()))
    }
}
