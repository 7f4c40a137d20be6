use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ProductSort {
    #[default]
    Default,
    PriceLow,
    PriceHigh,
    Rating,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// Category name, or `all`.
    pub category: Option<String>,
    /// Case-insensitive title search.
    pub q: Option<String>,
    pub sort: Option<ProductSort>,
}
