use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::cart::Notice;

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    pub total: Option<u64>,
    pub notice: Option<Notice>,
}

impl Meta {
    pub fn new(total: u64) -> Self {
        Self {
            total: Some(total),
            notice: None,
        }
    }

    pub fn empty() -> Self {
        Self {
            total: None,
            notice: None,
        }
    }

    pub fn with_notice(notice: Notice) -> Self {
        Self {
            total: None,
            notice: Some(notice),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RedirectData {
    pub location: String,
}

/// `303 See Other` carrying the target in both the header and the body.
pub fn redirect(location: &str, notice: Option<Notice>) -> Response {
    let message = notice
        .as_ref()
        .map_or_else(|| "Redirect".to_string(), |n| n.title.clone());
    let body = ApiResponse {
        message,
        data: Some(RedirectData {
            location: location.to_string(),
        }),
        meta: Some(notice.map_or_else(Meta::empty, Meta::with_notice)),
    };
    (
        StatusCode::SEE_OTHER,
        [(header::LOCATION, location.to_string())],
        Json(body),
    )
        .into_response()
}
