use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::CartItem;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: u64,
    pub open_drawer: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BuyNowRequest {
    pub product_id: u64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DrawerAction {
    Open,
    Close,
    Toggle,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DrawerRequest {
    pub action: DrawerAction,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DrawerState {
    pub is_open: bool,
}

/// User-facing toast text.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub items_count: u64,
    #[schema(value_type = String)]
    pub subtotal: Decimal,
    pub is_open: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddToCartResponse {
    pub item: CartItem,
    pub notice: Notice,
}
