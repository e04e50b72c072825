//! Province - one territorial node of the conquest graph

use serde::{Deserialize, Serialize};

use crate::core::types::{FactionId, ProvinceId, Vec2};

/// A province: static graph data plus ownership and garrison
///
/// Ownership and garrison only change through `WorldState` so the cached
/// per-faction aggregates stay valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Province {
    pub id: ProvinceId,
    pub code: String,
    pub name: String,
    pub centroid: Vec2,
    /// Display area, drives passive income
    pub area: f64,
    /// Garrison a neutral province regenerates toward
    pub neutral_target: f64,
    pub(super) neighbors: Vec<ProvinceId>,
    pub(super) owner: Option<FactionId>,
    pub(super) garrison: f64,
}

impl Province {
    pub fn owner(&self) -> Option<FactionId> {
        self.owner
    }

    pub fn is_neutral(&self) -> bool {
        self.owner.is_none()
    }

    pub fn is_owned_by(&self, faction: FactionId) -> bool {
        self.owner == Some(faction)
    }

    /// Real-valued garrison, never negative
    pub fn garrison(&self) -> f64 {
        self.garrison
    }

    /// Garrison as shown to players
    pub fn displayed_garrison(&self) -> u32 {
        self.garrison.floor() as u32
    }

    /// Sorted, fixed adjacency
    pub fn neighbors(&self) -> &[ProvinceId] {
        &self.neighbors
    }

    pub fn is_adjacent(&self, other: ProvinceId) -> bool {
        self.neighbors.binary_search(&other).is_ok()
    }
}
