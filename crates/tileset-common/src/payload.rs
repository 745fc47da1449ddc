//! Tile payloads returned to clients.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use half::f16;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{TileError, TileResult};

/// Dense numeric tile, quantized to half precision.
///
/// `dense` holds little-endian binary16 values, row-major for 2D tiles,
/// base64 encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseTile {
    pub dense: String,
    pub dtype: String,
    pub shape: Vec<usize>,
    pub min_value: f32,
    pub max_value: f32,
}

impl DenseTile {
    pub const DTYPE: &'static str = "float16";

    /// Quantize and encode `values` with the given shape.
    pub fn encode(values: &[f32], shape: Vec<usize>) -> Self {
        let mut bytes = Vec::with_capacity(values.len() * 2);
        let mut min_value = f32::INFINITY;
        let mut max_value = f32::NEG_INFINITY;

        for &v in values {
            if v.is_finite() {
                min_value = min_value.min(v);
                max_value = max_value.max(v);
            }
            bytes.extend_from_slice(&f16::from_f32(v).to_le_bytes());
        }

        if min_value > max_value {
            min_value = 0.0;
            max_value = 0.0;
        }

        Self {
            dense: STANDARD.encode(&bytes),
            dtype: Self::DTYPE.to_string(),
            shape,
            min_value,
            max_value,
        }
    }

    /// Decode back to f32 values.
    pub fn decode(&self) -> TileResult<Vec<f32>> {
        let bytes = STANDARD
            .decode(&self.dense)
            .map_err(|e| TileError::Internal(format!("invalid dense payload: {}", e)))?;
        if bytes.len() % 2 != 0 {
            return Err(TileError::Internal("dense payload has odd length".to_string()));
        }
        Ok(bytes
            .chunks_exact(2)
            .map(|pair| f16::from_le_bytes([pair[0], pair[1]]).to_f32())
            .collect())
    }

    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One annotation feature inside a discrete tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub uid: String,
    pub importance: f64,
    pub x_start: u64,
    pub x_end: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_start: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_end: Option<u64>,
    pub chr_offset: u64,
    pub name: String,
    pub fields: BTreeMap<String, String>,
}

/// Content of one resolved tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TilePayload {
    Dense(DenseTile),
    /// Importance-ordered features.
    Features(Vec<Feature>),
    /// Features grouped by track slot.
    Stacked { discrete: BTreeMap<u32, Vec<Feature>> },
}

impl TilePayload {
    pub fn as_dense(&self) -> Option<&DenseTile> {
        match self {
            TilePayload::Dense(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_features(&self) -> Option<&[Feature]> {
        match self {
            TilePayload::Features(f) => Some(f),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TilePayload::Dense(_) => "dense",
            TilePayload::Features(_) => "features",
            TilePayload::Stacked { .. } => "stacked",
        }
    }
}
