//! Single-session storefront: catalog browsing, a locally persisted cart,
//! a simulated checkout and order history, served over HTTP.

pub mod catalog;
pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
