use std::{env, path::PathBuf, str::FromStr, time::Duration};

use crate::catalog::{DEFAULT_API_BASE, DEFAULT_REVALIDATE};
use crate::services::order_service::DEFAULT_PAYMENT_DELAY;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageKind {
    File,
    Memory,
    None,
}

impl FromStr for StorageKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StorageKind::File),
            "memory" => Ok(StorageKind::Memory),
            "none" => Ok(StorageKind::None),
            other => Err(anyhow::anyhow!("unknown STOREFRONT_STORAGE `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub catalog_api_base: String,
    pub catalog_revalidate: Duration,
    pub storage: StorageKind,
    pub data_dir: PathBuf,
    pub checkout_delay: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let catalog_api_base =
            env::var("CATALOG_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let catalog_revalidate = env::var("CATALOG_REVALIDATE_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map_or(DEFAULT_REVALIDATE, Duration::from_secs);
        let storage = match env::var("STOREFRONT_STORAGE") {
            Ok(kind) => kind.parse()?,
            Err(_) => StorageKind::File,
        };
        let data_dir = env::var("STOREFRONT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".storefront"));
        let checkout_delay = env::var("CHECKOUT_DELAY_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map_or(DEFAULT_PAYMENT_DELAY, Duration::from_millis);

        Ok(Self {
            host,
            port,
            catalog_api_base,
            catalog_revalidate,
            storage,
            data_dir,
            checkout_delay,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            catalog_api_base: DEFAULT_API_BASE.to_string(),
            catalog_revalidate: DEFAULT_REVALIDATE,
            storage: StorageKind::File,
            data_dir: PathBuf::from(".storefront"),
            checkout_delay: DEFAULT_PAYMENT_DELAY,
        }
    }
}
