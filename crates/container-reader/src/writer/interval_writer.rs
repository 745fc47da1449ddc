//! Interval database writer.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tileset_common::TileError;

use super::PyramidSummary;
use crate::reader::IntervalLayout;
use crate::types::zoom_levels_for;
use crate::Result;

const INFO_SCHEMA: &str = "CREATE TABLE tileset_info (
    zoom_step INTEGER,
    max_length INTEGER,
    assembly TEXT,
    chrom_names TEXT,
    chrom_sizes TEXT,
    tile_size INTEGER,
    max_zoom INTEGER,
    max_width REAL,
    header TEXT,
    version TEXT
)";

const LINEAR_SCHEMA: &str = "CREATE TABLE intervals (
    id INTEGER PRIMARY KEY,
    zoomLevel INTEGER NOT NULL,
    importance REAL NOT NULL,
    startPos INTEGER NOT NULL,
    endPos INTEGER NOT NULL,
    chrOffset INTEGER NOT NULL,
    uid TEXT NOT NULL,
    name TEXT NOT NULL,
    fields TEXT NOT NULL DEFAULT '{}'
);
CREATE INDEX idx_intervals_range ON intervals (zoomLevel, startPos, endPos)";

const STACKED_SCHEMA: &str = "CREATE TABLE intervals (
    id INTEGER PRIMARY KEY,
    zoomLevel INTEGER NOT NULL,
    importance REAL NOT NULL,
    startPos INTEGER NOT NULL,
    endPos INTEGER NOT NULL,
    chrOffset INTEGER NOT NULL,
    uid TEXT NOT NULL,
    name TEXT NOT NULL,
    fields TEXT NOT NULL DEFAULT '{}',
    track INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX idx_intervals_range ON intervals (zoomLevel, startPos, endPos)";

const PAIRED_SCHEMA: &str = "CREATE TABLE intervals (
    id INTEGER PRIMARY KEY,
    zoomLevel INTEGER NOT NULL,
    importance REAL NOT NULL,
    fromX INTEGER NOT NULL,
    toX INTEGER NOT NULL,
    fromY INTEGER NOT NULL,
    toY INTEGER NOT NULL,
    chrOffset INTEGER NOT NULL,
    uid TEXT NOT NULL,
    name TEXT NOT NULL,
    fields TEXT NOT NULL DEFAULT '{}'
);
CREATE INDEX idx_intervals_range ON intervals (zoomLevel, fromX, toX, fromY, toY)";

/// One feature to write. Positions are absolute genome coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalRecord {
    pub uid: String,
    pub name: String,
    pub importance: f64,
    pub x_start: u64,
    pub x_end: u64,
    pub y_start: Option<u64>,
    pub y_end: Option<u64>,
    pub chr_offset: u64,
    pub track: u32,
    pub fields: BTreeMap<String, String>,
    /// Lowest zoom to show the feature at; assigned by importance when unset.
    pub zoom_level: Option<u32>,
}

impl IntervalRecord {
    pub fn new(uid: impl Into<String>, name: impl Into<String>, importance: f64, start: u64, end: u64) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            importance,
            x_start: start,
            x_end: end,
            y_start: None,
            y_end: None,
            chr_offset: 0,
            track: 0,
            fields: BTreeMap::new(),
            zoom_level: None,
        }
    }

    pub fn with_y(mut self, start: u64, end: u64) -> Self {
        self.y_start = Some(start);
        self.y_end = Some(end);
        self
    }

    pub fn with_track(mut self, track: u32) -> Self {
        self.track = track;
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_zoom_level(mut self, zoom: u32) -> Self {
        self.zoom_level = Some(zoom);
        self
    }
}

/// Header values for a new database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalDbMeta {
    pub assembly: String,
    /// `(chromosome, length)` pairs in genome order.
    pub chromsizes: Vec<(String, u64)>,
    pub tile_size: u64,
    /// Features per tile used when assigning zoom levels.
    pub max_features_per_tile: usize,
}

impl Default for IntervalDbMeta {
    fn default() -> Self {
        Self {
            assembly: String::new(),
            chromsizes: Vec::new(),
            tile_size: 1024,
            max_features_per_tile: 100,
        }
    }
}

/// Writes interval databases in one of the three layouts.
pub struct IntervalDbWriter {
    layout: IntervalLayout,
    meta: IntervalDbMeta,
}

impl IntervalDbWriter {
    pub fn new(layout: IntervalLayout, meta: IntervalDbMeta) -> Self {
        Self { layout, meta }
    }

    /// Create a new database at `path` holding `records`.
    pub async fn write(&self, path: &Path, records: &[IntervalRecord]) -> Result<PyramidSummary> {
        if self.meta.tile_size == 0 || self.meta.max_features_per_tile == 0 {
            return Err(TileError::invalid_parameter("meta", "tile size and features per tile must be > 0"));
        }
        if self.layout == IntervalLayout::Paired
            && records.iter().any(|r| r.y_start.is_none() || r.y_end.is_none())
        {
            return Err(TileError::invalid_parameter("records", "paired records need y positions"));
        }

        let max_length = if self.meta.chromsizes.is_empty() {
            records
                .iter()
                .map(|r| r.x_end.max(r.y_end.unwrap_or(0)))
                .max()
                .unwrap_or(0)
        } else {
            self.meta.chromsizes.iter().map(|(_, size)| size).sum()
        };
        let max_zoom = zoom_levels_for(max_length, self.meta.tile_size);
        let max_width = self.meta.tile_size as f64 * 2f64.powi(max_zoom as i32);
        let zooms = self.assign_zoom_levels(records, max_zoom, max_width);

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(db_error)?;

        let schema = match self.layout {
            IntervalLayout::Linear => LINEAR_SCHEMA,
            IntervalLayout::Paired => PAIRED_SCHEMA,
            IntervalLayout::Stacked => STACKED_SCHEMA,
        };

        let mut tx = pool.begin().await.map_err(db_error)?;
        for statement in INFO_SCHEMA.split(';').chain(schema.split(';')) {
            let statement = statement.trim();
            if !statement.is_empty() {
                sqlx::query(statement).execute(&mut *tx).await.map_err(db_error)?;
            }
        }

        let (names, sizes): (Vec<String>, Vec<String>) = self
            .meta
            .chromsizes
            .iter()
            .map(|(name, size)| (name.clone(), size.to_string()))
            .unzip();

        sqlx::query(
            "INSERT INTO tileset_info (zoom_step, max_length, assembly, chrom_names, chrom_sizes, \
             tile_size, max_zoom, max_width, header, version) VALUES (1, ?, ?, ?, ?, ?, ?, ?, '', '3')",
        )
        .bind(max_length as i64)
        .bind(&self.meta.assembly)
        .bind(names.join("\t"))
        .bind(sizes.join("\t"))
        .bind(self.meta.tile_size as i64)
        .bind(max_zoom as i64)
        .bind(max_width)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        for (record, zoom) in records.iter().zip(&zooms) {
            let fields = serde_json::to_string(&record.fields)?;
            let query = match self.layout {
                IntervalLayout::Linear => sqlx::query(
                    "INSERT INTO intervals (zoomLevel, importance, startPos, endPos, chrOffset, uid, name, fields) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(*zoom as i64)
                .bind(record.importance)
                .bind(record.x_start as i64)
                .bind(record.x_end as i64),
                IntervalLayout::Stacked => sqlx::query(
                    "INSERT INTO intervals (zoomLevel, importance, startPos, endPos, track, chrOffset, uid, name, fields) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(*zoom as i64)
                .bind(record.importance)
                .bind(record.x_start as i64)
                .bind(record.x_end as i64)
                .bind(record.track as i64),
                IntervalLayout::Paired => sqlx::query(
                    "INSERT INTO intervals (zoomLevel, importance, fromX, toX, fromY, toY, chrOffset, uid, name, fields) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(*zoom as i64)
                .bind(record.importance)
                .bind(record.x_start as i64)
                .bind(record.x_end as i64)
                .bind(record.y_start.unwrap_or(0) as i64)
                .bind(record.y_end.unwrap_or(0) as i64),
            };

            query
                .bind(record.chr_offset as i64)
                .bind(&record.uid)
                .bind(&record.name)
                .bind(fields)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;
        pool.close().await;

        tracing::info!(
            path = %path.display(),
            layout = ?self.layout,
            features = records.len(),
            max_zoom,
            "Wrote interval database"
        );

        Ok(PyramidSummary {
            max_zoom,
            tile_size: self.meta.tile_size,
            level_bins: (0..=max_zoom).map(|z| 1u64 << z).collect(),
            max_width,
        })
    }

    /// Give each record the lowest zoom at which its tile still has room,
    /// visiting records by importance.
    fn assign_zoom_levels(&self, records: &[IntervalRecord], max_zoom: u32, max_width: f64) -> Vec<u32> {
        let mut order: Vec<usize> = (0..records.len()).collect();
        order.sort_by(|&a, &b| {
            records[b]
                .importance
                .partial_cmp(&records[a].importance)
                .unwrap_or(Ordering::Equal)
                .then_with(|| records[a].uid.cmp(&records[b].uid))
        });

        let tile_of = |pos: u64, zoom: u32| -> u64 {
            let width = max_width / 2f64.powi(zoom as i32);
            (pos as f64 / width) as u64
        };

        let mut counts: HashMap<(u32, u64, u64), usize> = HashMap::new();
        let mut zooms = vec![max_zoom; records.len()];

        for idx in order {
            let record = &records[idx];
            if let Some(zoom) = record.zoom_level {
                zooms[idx] = zoom;
                continue;
            }

            let key = |zoom: u32| {
                (
                    zoom,
                    tile_of(record.x_start, zoom),
                    record.y_start.map(|y| tile_of(y, zoom)).unwrap_or(0),
                )
            };

            let assigned = (0..=max_zoom)
                .find(|&zoom| counts.get(&key(zoom)).copied().unwrap_or(0) < self.meta.max_features_per_tile)
                .unwrap_or(max_zoom);
            for zoom in assigned..=max_zoom {
                *counts.entry(key(zoom)).or_insert(0) += 1;
            }
            zooms[idx] = assigned;
        }

        zooms
    }
}

fn db_error(e: sqlx::Error) -> TileError {
    TileError::Storage(format!("interval database write failed: {}", e))
}
