pub mod config;
pub mod identity;
pub mod logger;
pub mod models;
pub mod notifier;
