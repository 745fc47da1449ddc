//! Tile resolution and generation engine.
//!
//! Turns tile addresses and dataset ids into payloads:
//!
//! ```text
//! get_tiles(["a.3.1.2", "a.3.1.2", "b.0.0"])
//!      │
//!      ├─► trim + dedupe addresses, parse each (invalid → omitted)
//!      │
//!      ├─► fetch each distinct record once (DatasetStore)
//!      │
//!      ├─► access gate (private + not owner → omitted)
//!      │
//!      ├─► HandleCache::acquire(path, kind)   (single-flight open)
//!      │
//!      └─► read_tile(zoom, coords, transform) (NotFound → omitted)
//!               │
//!               ▼
//!        { "a.3.1.2": payload, ... }
//! ```
//!
//! Tileset info follows the same path but reports failures as
//! `{ "error": reason }` entries. Catalog search, suggestions and admission
//! live alongside on [`TileService`].

pub mod access;
pub mod admission;
pub mod batch;
pub mod config;
pub mod metrics;
pub mod search;
pub mod service;

pub use admission::generate_uid;
pub use batch::{InfoBatch, TileBatch};
pub use config::EngineConfig;
pub use search::{ChromPosition, ChromSizesBody, ChromSizesFormat, ListQuery, ListResult, OrderField};
pub use service::TileService;
