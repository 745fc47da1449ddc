//! LRU cache of open container handles with per-path single-flight opens.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

use crate::config::ReaderConfig;
use crate::handle::ContainerHandle;
use crate::types::{CacheStats, ContainerKind};
use crate::Result;

type HandleKey = (PathBuf, ContainerKind);
type HandleSlot = Arc<OnceCell<Result<Arc<ContainerHandle>>>>;

/// Memoizes open container handles keyed by file path.
///
/// Concurrent `acquire` calls for the same path share one open attempt and
/// its outcome, failure included. A failed attempt is dropped from the
/// cache once it settles, so the next call retries.
pub struct HandleCache {
    slots: Mutex<LruCache<HandleKey, HandleSlot>>,
    config: ReaderConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    opens: AtomicU64,
    evictions: AtomicU64,
}

impl HandleCache {
    pub fn new(config: ReaderConfig) -> Self {
        let capacity = NonZeroUsize::new(config.handle_cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            slots: Mutex::new(LruCache::new(capacity)),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            opens: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Return the open handle for `path`, opening it if needed.
    pub async fn acquire(&self, path: &Path, kind: ContainerKind) -> Result<Arc<ContainerHandle>> {
        let key = (path.to_path_buf(), kind);

        let (slot, evicted) = {
            let mut slots = self.slots.lock().await;
            if let Some(slot) = slots.get(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                (slot.clone(), None)
            } else {
                self.misses.fetch_add(1, Ordering::Relaxed);
                let slot: HandleSlot = Arc::new(OnceCell::new());
                let evicted = slots.push(key.clone(), slot.clone());
                (slot, evicted)
            }
        };

        if let Some((evicted_key, evicted_slot)) = evicted {
            self.evictions.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(path = %evicted_key.0.display(), "Evicted container handle");
            close_slot(&evicted_slot).await;
        }

        let outcome = slot
            .get_or_init(|| async {
                self.opens.fetch_add(1, Ordering::Relaxed);
                ContainerHandle::open(path, kind, &self.config).await.map(Arc::new)
            })
            .await
            .clone();

        if let Err(e) = &outcome {
            // Drop the failed slot unless another caller already replaced it.
            let mut slots = self.slots.lock().await;
            if slots
                .peek(&key)
                .map(|current| Arc::ptr_eq(current, &slot))
                .unwrap_or(false)
            {
                slots.pop(&key);
                tracing::warn!(path = %path.display(), kind = ?kind, error = %e, "Failed to open container");
            }
        }
        outcome
    }

    /// Evict and close every handle opened for `path`.
    pub async fn invalidate(&self, path: &Path) {
        let removed: Vec<HandleSlot> = {
            let mut slots = self.slots.lock().await;
            let keys: Vec<HandleKey> = slots
                .iter()
                .filter(|((p, _), _)| p == path)
                .map(|(k, _)| k.clone())
                .collect();
            keys.iter().filter_map(|k| slots.pop(k)).collect()
        };

        for slot in &removed {
            close_slot(slot).await;
        }

        if !removed.is_empty() {
            tracing::info!(path = %path.display(), handles = removed.len(), "Invalidated container handles");
        }
    }

    /// Get cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let entries = self.slots.lock().await.len();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries,
            opens: self.opens.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

async fn close_slot(slot: &HandleSlot) {
    if let Some(Ok(handle)) = slot.get() {
        handle.close().await;
    }
}
