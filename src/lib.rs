pub mod auth;
pub mod config;
pub mod error;
pub mod feed;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;

pub use config::AppConfig;
pub use store::DataStore;
