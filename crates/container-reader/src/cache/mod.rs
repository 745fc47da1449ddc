//! Caching of open container handles.

mod handle_cache;

pub use handle_cache::HandleCache;
