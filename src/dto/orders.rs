use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{CartItem, Order};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct OrderSummary {
    #[schema(value_type = String)]
    pub subtotal: Decimal,
    #[schema(value_type = String)]
    pub shipping: Decimal,
    #[schema(value_type = String)]
    pub tax: Decimal,
    #[schema(value_type = String)]
    pub total: Decimal,
    pub free_shipping: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutPreview {
    pub items: Vec<CartItem>,
    pub summary: OrderSummary,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<Order>)]
    pub items: Vec<Order>,
}
