use rand::seq::SliceRandom;

use crate::{
    catalog::{CatalogClient, FetchHint},
    dto::products::ProductCatalog,
    error::{AppError, AppResult},
    models::Product,
    routes::params::{ProductQuery, ProductSort},
};

pub const FEATURED_COUNT: usize = 4;

pub async fn list_products(
    catalog: &CatalogClient,
    query: &ProductQuery,
) -> AppResult<ProductCatalog> {
    let (products, categories) = tokio::try_join!(
        catalog.get_all_products(FetchHint::Cached),
        catalog.get_categories(FetchHint::Cached),
    )?;

    Ok(ProductCatalog {
        products: filter_products(products, query),
        categories,
    })
}

pub async fn get_product(catalog: &CatalogClient, id: u64) -> AppResult<Product> {
    catalog
        .get_product(id, FetchHint::Cached)
        .await
        .map_err(|err| {
            tracing::debug!(product_id = id, error = %err, "product lookup failed");
            AppError::NotFound
        })
}

pub async fn featured_products(catalog: &CatalogClient) -> AppResult<Vec<Product>> {
    let products = catalog.get_all_products(FetchHint::Cached).await?;
    Ok(pick_featured(products))
}

pub fn filter_products(products: Vec<Product>, query: &ProductQuery) -> Vec<Product> {
    let category = query
        .category
        .as_deref()
        .filter(|c| !c.is_empty() && *c != "all");
    let needle = query
        .q
        .as_deref()
        .map(str::to_lowercase)
        .filter(|q| !q.is_empty());

    let mut result: Vec<Product> = products
        .into_iter()
        .filter(|p| category.is_none_or(|c| p.category == c))
        .filter(|p| {
            needle
                .as_deref()
                .is_none_or(|q| p.title.to_lowercase().contains(q))
        })
        .collect();

    match query.sort.unwrap_or_default() {
        ProductSort::Default => {}
        ProductSort::PriceLow => result.sort_by(|a, b| a.price.cmp(&b.price)),
        ProductSort::PriceHigh => result.sort_by(|a, b| b.price.cmp(&a.price)),
        ProductSort::Rating => result.sort_by(|a, b| b.rating.rate.total_cmp(&a.rating.rate)),
    }
    result
}

pub fn pick_featured(mut products: Vec<Product>) -> Vec<Product> {
    if products.len() <= FEATURED_COUNT {
        return products;
    }
    products.shuffle(&mut rand::rng());
    products.truncate(FEATURED_COUNT);
    products
}
