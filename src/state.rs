use std::{sync::Arc, time::Duration};

use crate::{
    catalog::CatalogClient,
    config::{AppConfig, StorageKind},
    services::{auth_service::AuthStore, cart_service::CartStore, order_service::CheckoutFlow},
    storage::{FileStore, Storage},
};

/// Session containers, built and hydrated once at startup.
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogClient,
    pub storage: Storage,
    pub auth: Arc<AuthStore>,
    pub cart: Arc<CartStore>,
    pub checkout: Arc<CheckoutFlow>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        let storage = match config.storage {
            StorageKind::File => Storage::new(Arc::new(FileStore::new(&config.data_dir))),
            StorageKind::Memory => Storage::in_memory(),
            StorageKind::None => Storage::detached(),
        };
        let catalog = CatalogClient::new(&config.catalog_api_base, config.catalog_revalidate);
        Self::new(catalog, storage, config.checkout_delay)
    }

    pub fn new(catalog: CatalogClient, storage: Storage, checkout_delay: Duration) -> Self {
        let auth = Arc::new(AuthStore::new(storage.clone()));
        let cart = Arc::new(CartStore::new(storage.clone()));
        auth.subscribe(cart.clone());

        cart.hydrate();
        auth.hydrate();

        let checkout = Arc::new(CheckoutFlow::new(
            storage.clone(),
            auth.clone(),
            cart.clone(),
            checkout_delay,
        ));

        Self {
            catalog,
            storage,
            auth,
            cart,
            checkout,
        }
    }
}
