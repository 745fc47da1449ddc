//! Tile addresses of the form `dataset_id.zoom.pos[.pos][.transform]`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{TileError, TileResult};

/// Grid position of a tile within its zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileCoords {
    /// Position along a single genome axis.
    OneD(u64),
    /// Row and column position on a genome-by-genome grid.
    TwoD(u64, u64),
}

impl TileCoords {
    pub fn is_2d(&self) -> bool {
        matches!(self, TileCoords::TwoD(..))
    }
}

/// Named value transform requested for a tile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transform {
    /// The dataset's default transform (the first one it lists, if any).
    Default,
    /// Raw values, no normalization.
    Identity,
    /// A transform by name, e.g. `ICE`.
    Named(String),
}

impl Transform {
    pub fn parse(name: &str) -> Self {
        match name {
            "default" => Transform::Default,
            "none" => Transform::Identity,
            other => Transform::Named(other.to_string()),
        }
    }
}

/// A parsed tile address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileAddress {
    pub dataset_id: String,
    pub zoom: u32,
    pub coords: TileCoords,
    pub transform: Transform,
}

impl TileAddress {
    /// Parse a tile address.
    ///
    /// Three fields give a 1D address and four numeric fields a 2D one. A
    /// trailing non-numeric field after at least one position is always the
    /// transform name.
    pub fn parse(raw: &str) -> TileResult<Self> {
        let parts: Vec<&str> = raw.split('.').collect();
        if parts.len() < 3 {
            return Err(TileError::invalid_address(raw, "expected id.zoom.position"));
        }
        if parts.len() > 5 {
            return Err(TileError::invalid_address(raw, "too many fields"));
        }

        let dataset_id = parts[0];
        if dataset_id.is_empty() {
            return Err(TileError::invalid_address(raw, "empty dataset id"));
        }

        let zoom = parts[1]
            .parse::<u32>()
            .map_err(|_| TileError::invalid_address(raw, "zoom must be a non-negative integer"))?;

        let mut positions = &parts[2..];
        let mut transform = Transform::Default;
        if positions.len() >= 2 {
            let last = positions[positions.len() - 1];
            if last.parse::<u64>().is_err() {
                transform = Transform::parse(last);
                positions = &positions[..positions.len() - 1];
            }
        }

        let mut values = Vec::with_capacity(positions.len());
        for field in positions {
            let value = field.parse::<u64>().map_err(|_| {
                TileError::invalid_address(raw, format!("position '{}' is not a non-negative integer", field))
            })?;
            values.push(value);
        }

        let coords = match values.as_slice() {
            [x] => TileCoords::OneD(*x),
            [x, y] => TileCoords::TwoD(*x, *y),
            _ => return Err(TileError::invalid_address(raw, "expected one or two positions")),
        };

        Ok(Self {
            dataset_id: dataset_id.to_string(),
            zoom,
            coords,
            transform,
        })
    }
}

impl FromStr for TileAddress {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TileAddress::parse(s)
    }
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.dataset_id, self.zoom)?;
        match self.coords {
            TileCoords::OneD(x) => write!(f, ".{}", x)?,
            TileCoords::TwoD(x, y) => write!(f, ".{}.{}", x, y)?,
        }
        match &self.transform {
            Transform::Default => Ok(()),
            Transform::Identity => write!(f, ".none"),
            Transform::Named(name) => write!(f, ".{}", name),
        }
    }
}
