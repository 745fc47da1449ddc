//! Interval database reader (linear, paired and stacked layouts).
//!
//! Interval databases are SQLite files with a one-row `tileset_info` table
//! and an `intervals` table. Every feature carries the lowest zoom level at
//! which it is shown, so a tile query is a ranked range query bounded by
//! `max_features_per_tile`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tileset_common::{escape_like, Feature, TileCoords, TileError, TilePayload, TilesetInfo, Transform};

use super::{check_tile_range, TileReader};
use crate::config::ReaderConfig;
use crate::Result;

/// Row layout of an interval database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntervalLayout {
    /// `startPos`/`endPos` features on one axis.
    Linear,
    /// `fromX`/`toX`/`fromY`/`toY` features on two axes.
    Paired,
    /// Linear features with a `track` slot.
    Stacked,
}

impl IntervalLayout {
    fn columns(&self) -> &'static str {
        match self {
            IntervalLayout::Linear => {
                "uid, importance, startPos AS x_start, endPos AS x_end, NULL AS y_start, \
                 NULL AS y_end, chrOffset AS chr_offset, name, fields, 0 AS track"
            }
            IntervalLayout::Paired => {
                "uid, importance, fromX AS x_start, toX AS x_end, fromY AS y_start, \
                 toY AS y_end, chrOffset AS chr_offset, name, fields, 0 AS track"
            }
            IntervalLayout::Stacked => {
                "uid, importance, startPos AS x_start, endPos AS x_end, NULL AS y_start, \
                 NULL AS y_end, chrOffset AS chr_offset, name, fields, track"
            }
        }
    }

    fn tile_filter(&self) -> &'static str {
        match self {
            IntervalLayout::Linear | IntervalLayout::Stacked => {
                "zoomLevel <= ? AND startPos < ? AND endPos > ?"
            }
            IntervalLayout::Paired => {
                "zoomLevel <= ? AND fromX < ? AND toX > ? AND fromY < ? AND toY > ?"
            }
        }
    }

    fn dimensions(&self) -> usize {
        match self {
            IntervalLayout::Paired => 2,
            _ => 1,
        }
    }
}

/// A name-search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub uid: String,
    pub gene_name: String,
    pub score: f64,
    pub chr_offset: u64,
    pub tx_start: u64,
    pub tx_end: u64,
}

#[derive(Debug, FromRow)]
struct InfoRow {
    tile_size: i64,
    max_zoom: i64,
    max_width: f64,
    max_length: i64,
    chrom_names: Option<String>,
    chrom_sizes: Option<String>,
}

#[derive(Debug, FromRow)]
struct IntervalRow {
    uid: String,
    importance: f64,
    x_start: i64,
    x_end: i64,
    y_start: Option<i64>,
    y_end: Option<i64>,
    chr_offset: i64,
    name: String,
    fields: String,
    track: i64,
}

/// An open interval database.
pub struct IntervalDb {
    path: PathBuf,
    layout: IntervalLayout,
    pool: SqlitePool,
    info: InfoRow,
    max_features: u32,
}

impl IntervalDb {
    /// Open a database read-only and validate its tables.
    pub async fn open(path: &Path, layout: IntervalLayout, config: &ReaderConfig) -> Result<Self> {
        tokio::fs::metadata(path).await?;

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.interval_pool_size)
            .connect_with(options)
            .await
            .map_err(|e| TileError::malformed(path.display(), e))?;

        let info: Option<InfoRow> = sqlx::query_as(
            "SELECT tile_size, max_zoom, max_width, max_length, chrom_names, chrom_sizes \
             FROM tileset_info LIMIT 1",
        )
        .fetch_optional(&pool)
        .await
        .map_err(|e| TileError::malformed(path.display(), e))?;
        let info = info.ok_or_else(|| TileError::malformed(path.display(), "empty tileset_info"))?;

        if info.max_zoom < 0 || info.tile_size <= 0 {
            return Err(TileError::malformed(path.display(), "invalid zoom geometry"));
        }

        // Select the layout's columns so a mismatched file fails at open.
        let layout_check = format!("SELECT {} FROM intervals LIMIT 0", layout.columns());
        sqlx::query(&layout_check)
            .fetch_all(&pool)
            .await
            .map_err(|e| TileError::malformed(path.display(), e))?;

        tracing::debug!(
            path = %path.display(),
            layout = ?layout,
            max_zoom = info.max_zoom,
            "Opened interval database"
        );

        Ok(Self {
            path: path.to_path_buf(),
            layout,
            pool,
            info,
            max_features: config.max_features_per_tile,
        })
    }

    pub fn layout(&self) -> IntervalLayout {
        self.layout
    }

    pub fn max_zoom(&self) -> u32 {
        self.info.max_zoom as u32
    }

    /// Features intersecting a tile, importance-ranked.
    async fn query_tile(&self, zoom: u32, positions: &[u64]) -> Result<Vec<IntervalRow>> {
        check_tile_range(zoom, self.max_zoom(), positions)?;

        let width = self.info.max_width / 2f64.powi(zoom as i32);
        let sql = format!(
            "SELECT {} FROM intervals WHERE {} ORDER BY importance DESC, uid ASC LIMIT ?",
            self.layout.columns(),
            self.layout.tile_filter()
        );

        let mut query = sqlx::query_as::<_, IntervalRow>(&sql).bind(zoom as i64);
        for &pos in positions {
            let start = pos as f64 * width;
            query = query.bind(start + width).bind(start);
        }

        query
            .bind(self.max_features as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| TileError::malformed(self.path.display(), e))
    }

    /// Case-insensitive substring search over feature names.
    pub async fn suggest(&self, text: &str, limit: u32) -> Result<Vec<Suggestion>> {
        let sql = format!(
            "SELECT {} FROM intervals WHERE name LIKE ? ESCAPE '\\' \
             ORDER BY importance DESC, uid ASC LIMIT ?",
            self.layout.columns()
        );
        let pattern = format!("%{}%", escape_like(text));

        let rows: Vec<IntervalRow> = sqlx::query_as(&sql)
            .bind(pattern)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| TileError::malformed(self.path.display(), e))?;

        Ok(rows
            .into_iter()
            .map(|row| Suggestion {
                uid: row.uid,
                gene_name: row.name,
                score: row.importance,
                chr_offset: to_u64(row.chr_offset),
                tx_start: to_u64(row.x_start),
                tx_end: to_u64(row.x_end),
            })
            .collect())
    }

    /// Close the pool. Later reads through this handle fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    fn to_feature(&self, row: IntervalRow) -> Result<(u32, Feature)> {
        let fields = parse_fields(&row.fields).map_err(|e| TileError::malformed(self.path.display(), e))?;
        let feature = Feature {
            uid: row.uid,
            importance: row.importance,
            x_start: to_u64(row.x_start),
            x_end: to_u64(row.x_end),
            y_start: row.y_start.map(to_u64),
            y_end: row.y_end.map(to_u64),
            chr_offset: to_u64(row.chr_offset),
            name: row.name,
            fields,
        };
        Ok((row.track.clamp(0, u32::MAX as i64) as u32, feature))
    }
}

#[async_trait]
impl TileReader for IntervalDb {
    async fn tileset_info(&self) -> Result<TilesetInfo> {
        let dims = self.layout.dimensions();
        let mut info = TilesetInfo::new(
            vec![0.0; dims],
            vec![self.info.max_length as f64; dims],
            self.max_zoom(),
            self.info.max_width,
            self.info.tile_size as u64,
        );
        info.chromsizes = parse_chromsizes(
            self.info.chrom_names.as_deref(),
            self.info.chrom_sizes.as_deref(),
        );
        Ok(info)
    }

    async fn read_tile(
        &self,
        zoom: u32,
        coords: TileCoords,
        _transform: &Transform,
    ) -> Result<TilePayload> {
        let positions: Vec<u64> = match (self.layout, coords) {
            (IntervalLayout::Paired, TileCoords::TwoD(x, y)) => vec![x, y],
            (IntervalLayout::Linear | IntervalLayout::Stacked, TileCoords::OneD(x)) => vec![x],
            _ => {
                return Err(TileError::not_found(format!(
                    "{:?} database cannot serve {:?} tiles",
                    self.layout, coords
                )))
            }
        };

        let rows = self.query_tile(zoom, &positions).await?;
        tracing::debug!(
            path = %self.path.display(),
            zoom,
            positions = ?positions,
            features = rows.len(),
            "Read interval tile"
        );

        if self.layout == IntervalLayout::Stacked {
            let mut discrete: BTreeMap<u32, Vec<Feature>> = BTreeMap::new();
            for row in rows {
                let (track, feature) = self.to_feature(row)?;
                discrete.entry(track).or_default().push(feature);
            }
            return Ok(TilePayload::Stacked { discrete });
        }

        let features = rows
            .into_iter()
            .map(|row| self.to_feature(row).map(|(_, f)| f))
            .collect::<Result<Vec<_>>>()?;
        Ok(TilePayload::Features(features))
    }
}

fn to_u64(v: i64) -> u64 {
    v.max(0) as u64
}

/// Parse the JSON `fields` column into string values.
fn parse_fields(raw: &str) -> std::result::Result<BTreeMap<String, String>, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw)?;
    Ok(map
        .into_iter()
        .map(|(k, v)| {
            let value = match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (k, value)
        })
        .collect())
}

fn parse_chromsizes(names: Option<&str>, sizes: Option<&str>) -> Option<Vec<(String, u64)>> {
    let names = names?;
    let sizes = sizes?;
    let pairs: Vec<(String, u64)> = names
        .split('\t')
        .zip(sizes.split('\t'))
        .filter_map(|(name, size)| Some((name.to_string(), size.trim().parse().ok()?)))
        .collect();
    if pairs.is_empty() {
        None
    } else {
        Some(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fields() {
        let fields = parse_fields(r#"{"strand": "+", "exons": 3}"#).unwrap();
        assert_eq!(fields["strand"], "+");
        assert_eq!(fields["exons"], "3");
        assert!(parse_fields("").unwrap().is_empty());
        assert!(parse_fields("[1, 2]").is_err());
    }

    #[test]
    fn test_parse_chromsizes() {
        let pairs = parse_chromsizes(Some("chr1\tchr2"), Some("1000\t500")).unwrap();
        assert_eq!(pairs, vec![("chr1".to_string(), 1000), ("chr2".to_string(), 500)]);
        assert!(parse_chromsizes(None, Some("1")).is_none());
    }

    #[test]
    fn test_layout_filters_match_bind_count() {
        assert_eq!(IntervalLayout::Linear.tile_filter().matches('?').count(), 3);
        assert_eq!(IntervalLayout::Paired.tile_filter().matches('?').count(), 5);
    }
}
