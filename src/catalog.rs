//! Client for the remote product catalog API.
//!
//! Responses are cached in-process with `moka` for the revalidate window.

use std::{sync::Arc, time::Duration};

use moka::future::Cache;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::models::Product;

pub const DEFAULT_API_BASE: &str = "https://fakestoreapi.com";
pub const DEFAULT_REVALIDATE: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("API request failed with status {status}")]
    RequestFailed { status: u16 },

    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Cache key for catalog responses, one per endpoint.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    Product(u64),
    Categories,
    Category(String),
}

impl CacheKey {
    fn path(&self) -> String {
        match self {
            CacheKey::Products => "/products".to_string(),
            CacheKey::Product(id) => format!("/products/{id}"),
            CacheKey::Categories => "/products/categories".to_string(),
            CacheKey::Category(name) => {
                format!("/products/category/{}", urlencoding::encode(name))
            }
        }
    }
}

#[derive(Debug, Clone)]
enum CacheValue {
    Products(Arc<Vec<Product>>),
    Product(Box<Product>),
    Categories(Arc<Vec<String>>),
}

/// Per-call freshness hint. Only affects caching, never the result shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchHint {
    #[default]
    Cached,
    NoStore,
}

#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>, revalidate: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(revalidate)
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                base_url: base_url.into().trim_end_matches('/').to_string(),
                cache,
            }),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    #[instrument(skip(self))]
    pub async fn get_all_products(&self, hint: FetchHint) -> Result<Vec<Product>, CatalogError> {
        let key = CacheKey::Products;
        if let Some(CacheValue::Products(products)) = self.cached(&key, hint).await {
            return Ok(products.as_ref().clone());
        }
        let products: Vec<Product> = self.fetch(&key).await?;
        self.store(key, CacheValue::Products(Arc::new(products.clone())), hint)
            .await;
        Ok(products)
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: u64, hint: FetchHint) -> Result<Product, CatalogError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.cached(&key, hint).await {
            return Ok(*product);
        }
        let product: Product = self.fetch(&key).await?;
        self.store(key, CacheValue::Product(Box::new(product.clone())), hint)
            .await;
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn get_categories(&self, hint: FetchHint) -> Result<Vec<String>, CatalogError> {
        let key = CacheKey::Categories;
        if let Some(CacheValue::Categories(categories)) = self.cached(&key, hint).await {
            return Ok(categories.as_ref().clone());
        }
        let categories: Vec<String> = self.fetch(&key).await?;
        self.store(
            key,
            CacheValue::Categories(Arc::new(categories.clone())),
            hint,
        )
        .await;
        Ok(categories)
    }

    #[instrument(skip(self))]
    pub async fn get_products_by_category(
        &self,
        category: &str,
        hint: FetchHint,
    ) -> Result<Vec<Product>, CatalogError> {
        let key = CacheKey::Category(category.to_string());
        if let Some(CacheValue::Products(products)) = self.cached(&key, hint).await {
            return Ok(products.as_ref().clone());
        }
        let products: Vec<Product> = self.fetch(&key).await?;
        self.store(key, CacheValue::Products(Arc::new(products.clone())), hint)
            .await;
        Ok(products)
    }

    /// Drops one cached response so the next call refetches it.
    pub async fn revalidate(&self, key: &CacheKey) {
        self.inner.cache.invalidate(key).await;
    }

    async fn cached(&self, key: &CacheKey, hint: FetchHint) -> Option<CacheValue> {
        match hint {
            FetchHint::Cached => {
                let hit = self.inner.cache.get(key).await;
                if hit.is_some() {
                    debug!(?key, "catalog cache hit");
                }
                hit
            }
            FetchHint::NoStore => None,
        }
    }

    async fn store(&self, key: CacheKey, value: CacheValue, hint: FetchHint) {
        if hint == FetchHint::Cached {
            self.inner.cache.insert(key, value).await;
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.inner.base_url, key.path());
        let response = self.inner.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "catalog request failed");
            return Err(CatalogError::RequestFailed {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE, DEFAULT_REVALIDATE)
    }
}
