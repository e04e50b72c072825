//! Boundary geometry input
//!
//! Planar polygons tagged with administrative codes. Projection from
//! geographic coordinates happens upstream.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::ConfigError;

/// One boundary region; several rings form a multi-part region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryFeature {
    /// Administrative code; features without one are not provinces
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: String,
    pub polygons: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TerritoryDataset {
    pub features: Vec<BoundaryFeature>,
}

impl TerritoryDataset {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Generate a rectangular grid of square provinces
    ///
    /// Codes are `RRCC` (row, column), so row 3 column 1 is `0301`.
    pub fn grid(cols: u32, rows: u32, cell: f64) -> Self {
        let mut features = Vec::with_capacity((cols * rows) as usize);
        for row in 0..rows {
            for col in 0..cols {
                let x = col as f64 * cell;
                let y = row as f64 * cell;
                features.push(BoundaryFeature {
                    code: Some(format!("{row:02}{col:02}")),
                    name: format!("Commandery {row}-{col}"),
                    polygons: vec![vec![
                        [x, y],
                        [x + cell, y],
                        [x + cell, y + cell],
                        [x, y + cell],
                        [x, y],
                    ]],
                });
            }
        }
        Self { features }
    }
}
