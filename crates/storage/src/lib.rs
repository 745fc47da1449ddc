//! Record storage for the tile server.
//!
//! Provides:
//! - The `DatasetStore` and `ViewConfStore` traits the tile engine consumes
//! - A SQLite-backed `Catalog` implementing both

pub mod catalog;
pub mod store;

pub use catalog::Catalog;
pub use store::{DatasetStore, ViewConfStore};
