//! Batched tile and tileset-info requests.
//!
//! Tile batches omit anything that cannot be served. Info batches report an
//! explicit `{error}` entry per failing id. Neither lets one item abort its
//! siblings.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use futures::stream::{self, StreamExt};
use tileset_common::{
    DatasetRecord, InfoEntry, Requester, TileAddress, TileError, TilePayload, TileResult,
};
use tracing::{debug, warn};

use crate::access;
use crate::metrics;
use crate::service::TileService;

/// Tile payloads keyed by the (trimmed) address that requested them.
pub type TileBatch = BTreeMap<String, TilePayload>;

/// Info entries keyed by dataset id.
pub type InfoBatch = BTreeMap<String, InfoEntry>;

impl TileService {
    /// Resolve a batch of tile addresses.
    ///
    /// Duplicates resolve once. Invalid, missing, out-of-range and
    /// unauthorized addresses are absent from the result.
    pub async fn get_tiles(&self, requester: &Requester, addresses: &[String]) -> TileBatch {
        let mut seen = BTreeSet::new();
        let mut parsed: Vec<(String, TileAddress)> = Vec::new();

        for raw in addresses {
            let key = raw.trim();
            if key.is_empty() || !seen.insert(key.to_string()) {
                continue;
            }
            match TileAddress::parse(key) {
                Ok(address) => parsed.push((key.to_string(), address)),
                Err(e) => {
                    debug!(address = %key, error = %e, "Skipping invalid tile address");
                    metrics::record_tile_omitted(e.reason());
                }
            }
        }
        metrics::record_batch("tiles", seen.len());

        let ids: BTreeSet<&str> = parsed.iter().map(|(_, a)| a.dataset_id.as_str()).collect();
        let records = self.fetch_records(ids).await;

        let results: Vec<(String, TileResult<(TilePayload, String)>)> = stream::iter(parsed)
            .map(|(key, address)| {
                let records = &records;
                async move {
                    let result = match records.get(address.dataset_id.as_str()) {
                        Some(Ok(record)) if access::can_read(record, requester) => self
                            .read_tile(record, &address)
                            .await
                            .map(|payload| (payload, record.file_type.to_string())),
                        Some(Ok(_)) => Err(TileError::permission_denied(format!(
                            "tileset {} is private",
                            address.dataset_id
                        ))),
                        Some(Err(e)) => Err(TileError::Database(e.clone())),
                        None => Err(TileError::not_found(format!(
                            "No such tileset with uid: {}",
                            address.dataset_id
                        ))),
                    };
                    (key, result)
                }
            })
            .buffer_unordered(self.config.batch_concurrency.max(1))
            .collect()
            .await;

        let mut tiles = TileBatch::new();
        for (key, result) in results {
            match result {
                Ok((payload, file_type)) => {
                    metrics::record_tile_served(&file_type);
                    tiles.insert(key, payload);
                }
                Err(e) => {
                    match &e {
                        TileError::MalformedContainer { path, reason } => {
                            warn!(address = %key, path = %path, reason = %reason, "Malformed container");
                        }
                        e if e.is_item_scoped() => {
                            debug!(address = %key, error = %e, "Tile omitted");
                        }
                        e => {
                            warn!(address = %key, error = %e, "Tile failed");
                        }
                    }
                    metrics::record_tile_omitted(e.reason());
                }
            }
        }

        tiles
    }

    /// Tileset info for each requested id, with an error entry for each id
    /// that cannot be described.
    pub async fn get_tileset_info(&self, requester: &Requester, ids: &[String]) -> InfoBatch {
        let unique: BTreeSet<&str> = ids.iter().map(|id| id.trim()).filter(|id| !id.is_empty()).collect();
        metrics::record_batch("tileset_info", unique.len());

        let results: Vec<(String, TileResult<_>)> = stream::iter(unique.into_iter().map(str::to_owned))
            .map(|id: String| async move {
                let result = match self.readable_dataset(requester, &id).await {
                    Ok(record) => self.read_info(&record).await,
                    Err(e) => Err(e),
                };
                (id, result)
            })
            .buffer_unordered(self.config.batch_concurrency.max(1))
            .collect()
            .await;

        results
            .into_iter()
            .map(|(id, result)| {
                let entry = match result {
                    Ok(info) => InfoEntry::Info(Box::new(info)),
                    Err(e) => {
                        if let TileError::MalformedContainer { path, reason } = &e {
                            warn!(uuid = %id, path = %path, reason = %reason, "Malformed container");
                        } else {
                            debug!(uuid = %id, error = %e, "Tileset info unavailable");
                        }
                        metrics::record_info_error(e.reason());
                        InfoEntry::from_error(&e)
                    }
                };
                (id, entry)
            })
            .collect()
    }

    /// Fetch each distinct record once. Lookup failures are kept per id so
    /// they only affect that id's addresses.
    async fn fetch_records(&self, ids: BTreeSet<&str>) -> HashMap<String, Result<DatasetRecord, String>> {
        let lookups: Vec<(String, TileResult<Option<DatasetRecord>>)> = stream::iter(ids.into_iter().map(str::to_owned))
            .map(|id: String| async move {
                let lookup = self.datasets.get_dataset(&id).await;
                (id, lookup)
            })
            .buffer_unordered(self.config.batch_concurrency.max(1))
            .collect()
            .await;

        lookups
            .into_iter()
            .filter_map(|(id, lookup)| match lookup {
                Ok(Some(record)) => Some((id, Ok(record))),
                Ok(None) => None,
                Err(e) => {
                    warn!(uuid = %id, error = %e, "Dataset lookup failed");
                    Some((id, Err(e.to_string())))
                }
            })
            .collect()
    }
}
