//! Durable local store for the three session records (cart, orders, user).
//!
//! Values are JSON text under fixed string keys. Reads never fail the caller:
//! a missing key, an empty value or text that does not parse all yield the
//! caller's fallback. A [`Storage`] without a backend is detached and turns
//! every operation into a no-op.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
};

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::models::{CartItem, Order, User};

pub const CART_KEY: &str = "ecommerce_cart";
pub const ORDERS_KEY: &str = "ecommerce_orders";
pub const USER_KEY: &str = "ecommerce_user";

/// String-keyed, string-valued persistence backend.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
}

#[derive(Debug, Error)]
#[error("corrupt data under `{key}`: {source}")]
pub struct CorruptDataError {
    pub key: String,
    #[source]
    pub source: serde_json::Error,
}

/// One `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Some(text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                tracing::warn!(key, error = %err, "failed to read stored value");
                None
            }
        }
    }

    fn set_item(&self, key: &str, value: &str) {
        let result = fs::create_dir_all(&self.dir).and_then(|_| fs::write(self.path_for(key), value));
        if let Err(err) = result {
            tracing::warn!(key, error = %err, "failed to write stored value");
        }
    }

    fn remove_item(&self, key: &str) {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => tracing::warn!(key, error = %err, "failed to remove stored value"),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// JSON adapter over an optional [`KeyValueStore`].
#[derive(Clone, Default)]
pub struct Storage {
    backend: Option<Arc<dyn KeyValueStore>>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl Storage {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    pub fn detached() -> Self {
        Self { backend: None }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn is_attached(&self) -> bool {
        self.backend.is_some()
    }

    pub fn read<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        match self.try_read(key) {
            Ok(Some(value)) => value,
            Ok(None) => fallback,
            Err(err) => {
                tracing::warn!(error = %err, "failed to parse storage value");
                fallback
            }
        }
    }

    fn try_read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CorruptDataError> {
        let Some(backend) = &self.backend else {
            return Ok(None);
        };
        match backend.get_item(key) {
            Some(text) if !text.is_empty() => serde_json::from_str(&text)
                .map(Some)
                .map_err(|source| CorruptDataError {
                    key: key.to_string(),
                    source,
                }),
            _ => Ok(None),
        }
    }

    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let Some(backend) = &self.backend else {
            return;
        };
        match serde_json::to_string(value) {
            Ok(text) => backend.set_item(key, &text),
            Err(err) => tracing::warn!(key, error = %err, "failed to serialize storage value"),
        }
    }

    pub fn clear(&self, key: &str) {
        if let Some(backend) = &self.backend {
            backend.remove_item(key);
        }
    }

    pub fn get_cart(&self) -> Vec<CartItem> {
        self.read(CART_KEY, Vec::new())
    }

    pub fn save_cart(&self, cart: &[CartItem]) {
        self.write(CART_KEY, cart);
    }

    pub fn clear_cart(&self) {
        self.clear(CART_KEY);
    }

    pub fn get_orders(&self) -> Vec<Order> {
        self.read(ORDERS_KEY, Vec::new())
    }

    /// Prepends `order` so the stored list stays newest first.
    pub fn save_order(&self, order: &Order) {
        if !self.is_attached() {
            return;
        }
        let mut orders = self.get_orders();
        orders.insert(0, order.clone());
        self.write(ORDERS_KEY, &orders);
    }

    pub fn get_user(&self) -> Option<User> {
        self.read(USER_KEY, None)
    }

    pub fn save_user(&self, user: &User) {
        self.write(USER_KEY, user);
    }

    pub fn clear_user(&self) {
        self.clear(USER_KEY);
    }
}
