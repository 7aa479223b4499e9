pub mod db;
pub mod error;
pub mod memory_store;
pub mod repositories;
pub mod sql_store;
pub mod store;

pub use error::StoreError;
pub use memory_store::InMemoryStore;
pub use sql_store::SqlStore;
pub use store::{Store, build_store};
