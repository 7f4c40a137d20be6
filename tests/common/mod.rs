#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde_json::{Value, json};

use axum_storefront::{
    catalog::CatalogClient, routes::create_app, state::AppState, storage::Storage,
};

#[derive(Clone, Default)]
pub struct CatalogHits(pub Arc<AtomicUsize>);

impl CatalogHits {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn product_json(id: u64) -> Option<Value> {
    let (title, price, category, rate) = match id {
        1 => ("Fjallraven Backpack", 109.95, "men's clothing", 3.9),
        2 => ("Mens Casual Slim Fit T-Shirt", 22.3, "men's clothing", 4.1),
        5 => ("Dragon Station Chain Bracelet", 695.0, "jewelery", 4.6),
        9 => ("WD 2TB External Hard Drive", 64.0, "electronics", 3.3),
        _ => return None,
    };
    Some(json!({
        "id": id,
        "title": title,
        "price": price,
        "description": "fixture",
        "category": category,
        "image": format!("https://img.example/{id}.png"),
        "rating": { "rate": rate, "count": 120 }
    }))
}

fn all_products() -> Vec<Value> {
    [1, 2, 5, 9].into_iter().filter_map(product_json).collect()
}

async fn products(State(hits): State<CatalogHits>) -> Json<Value> {
    hits.0.fetch_add(1, Ordering::SeqCst);
    Json(Value::Array(all_products()))
}

async fn product(
    State(hits): State<CatalogHits>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, StatusCode> {
    hits.0.fetch_add(1, Ordering::SeqCst);
    product_json(id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn categories(State(hits): State<CatalogHits>) -> Json<Value> {
    hits.0.fetch_add(1, Ordering::SeqCst);
    Json(json!(["electronics", "jewelery", "men's clothing", "women's clothing"]))
}

async fn by_category(
    State(hits): State<CatalogHits>,
    Path(category): Path<String>,
) -> Json<Value> {
    hits.0.fetch_add(1, Ordering::SeqCst);
    let items = all_products()
        .into_iter()
        .filter(|p| p["category"] == category.as_str())
        .collect();
    Json(Value::Array(items))
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    addr
}

/// Stand-in for the remote catalog API.
pub async fn spawn_catalog() -> (String, CatalogHits) {
    let hits = CatalogHits::default();
    let router = Router::new()
        .route("/products", get(products))
        .route("/products/categories", get(categories))
        .route("/products/category/{category}", get(by_category))
        .route("/products/{id}", get(product))
        .with_state(hits.clone());
    let addr = serve(router).await;
    (format!("http://{addr}"), hits)
}

pub async fn spawn_storefront(storage: Storage, checkout_delay: Duration) -> (String, AppState) {
    let (catalog_url, _) = spawn_catalog().await;
    let state = AppState::new(
        CatalogClient::new(catalog_url, Duration::from_secs(60)),
        storage,
        checkout_delay,
    );
    let addr = serve(create_app(state.clone())).await;
    (format!("http://{addr}"), state)
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("client")
}
