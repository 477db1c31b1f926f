pub mod error;
pub mod models;
pub mod openapi;
pub mod reactions;
pub mod routes;
pub mod store;
pub mod threads;

// Re-export commonly used items for tests / external users
pub use routes::{config, AppState};
pub use store::{Document, JsonStore};
