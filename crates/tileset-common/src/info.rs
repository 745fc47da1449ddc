//! Tileset info: the zoom/extent description a client needs before asking
//! for tiles.

use serde::{Deserialize, Serialize};

use crate::dataset::DatasetRecord;
use crate::error::TileError;

/// A named value transform offered by a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformSpec {
    /// Client-facing name, e.g. `ICE`.
    pub name: String,
    /// Container-level key the transform reads its factors from.
    pub value: String,
}

/// Geometry and labels of a tileset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilesetInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(rename = "coordSystem", default)]
    pub coord_system: String,
    #[serde(rename = "coordSystem2", default)]
    pub coord_system_2: String,
    pub min_pos: Vec<f64>,
    pub max_pos: Vec<f64>,
    pub max_zoom: u32,
    pub max_width: f64,
    pub tile_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bins_per_dimension: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transforms: Vec<TransformSpec>,
    /// `(chromosome, length)` pairs, in file order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chromsizes: Option<Vec<(String, u64)>>,
}

impl TilesetInfo {
    /// Info with the given geometry and no labels.
    pub fn new(min_pos: Vec<f64>, max_pos: Vec<f64>, max_zoom: u32, max_width: f64, tile_size: u64) -> Self {
        Self {
            name: None,
            datatype: None,
            coord_system: String::new(),
            coord_system_2: String::new(),
            min_pos,
            max_pos,
            max_zoom,
            max_width,
            tile_size,
            bins_per_dimension: None,
            transforms: Vec::new(),
            chromsizes: None,
        }
    }

    /// Fill the labels that come from the catalog rather than the file.
    pub fn decorate(mut self, record: &DatasetRecord) -> Self {
        self.name = Some(record.name.clone());
        self.datatype = Some(record.data_type.clone());
        self.coord_system = record.coord_system.clone();
        self.coord_system_2 = record.coord_system_2.clone();
        self
    }
}

/// One entry of a batched tileset-info response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InfoEntry {
    Info(Box<TilesetInfo>),
    Error { error: String },
}

impl InfoEntry {
    pub fn from_error(err: &TileError) -> Self {
        InfoEntry::Error {
            error: err.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, InfoEntry::Error { .. })
    }
}
