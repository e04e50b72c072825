//! Read-only views for the presentation layer

use serde::Serialize;

use crate::core::types::{DispatchId, FactionId, GeneralId, GroupId, Millis, ProvinceId, Vec2};
use crate::dispatch::lane::progress;
use crate::dispatch::Dispatch;
use crate::generals::{General, GeneralStats, GeneralStatus, Tier};
use crate::simulation::outcome::{standing, FactionStanding};
use crate::world::{Province, WorldState};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvinceView {
    pub id: ProvinceId,
    pub code: String,
    pub name: String,
    pub owner: Option<FactionId>,
    /// Floored for display
    pub garrison: u32,
    pub centroid: Vec2,
}

impl From<&Province> for ProvinceView {
    fn from(p: &Province) -> Self {
        Self {
            id: p.id,
            code: p.code.clone(),
            name: p.name.clone(),
            owner: p.owner(),
            garrison: p.displayed_garrison(),
            centroid: p.centroid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneralView {
    pub id: GeneralId,
    pub name: String,
    pub tier: Tier,
    pub stats: GeneralStats,
    pub troop_cap: u32,
    pub assigned: u32,
    pub status: GeneralStatus,
    pub station: Option<ProvinceId>,
}

impl From<&General> for GeneralView {
    fn from(g: &General) -> Self {
        Self {
            id: g.id,
            name: g.name.clone(),
            tier: g.tier,
            stats: g.stats,
            troop_cap: g.troop_cap,
            assigned: g.assigned_troops(),
            status: g.status(),
            station: g.station(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactionSnapshot {
    pub id: FactionId,
    pub name: String,
    pub color: String,
    pub economy: f64,
    pub grain: u32,
    pub economy_rate: f64,
    pub province_count: usize,
    pub standing: FactionStanding,
    pub roster: Vec<GeneralView>,
}

impl FactionSnapshot {
    pub fn capture(world: &WorldState, id: FactionId) -> Option<Self> {
        let faction = world.faction(id)?;
        Some(Self {
            id,
            name: faction.name().to_string(),
            color: faction.profile.color.clone(),
            economy: faction.economy(),
            grain: faction.grain(),
            economy_rate: world.economy_rate(id),
            province_count: world.province_count(id),
            standing: standing(world, id),
            roster: faction
                .roster()
                .iter()
                .filter_map(|g| world.general(*g))
                .map(GeneralView::from)
                .collect(),
        })
    }
}

/// A unit in flight, positioned for animation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchView {
    pub id: DispatchId,
    pub group: GroupId,
    pub faction: FactionId,
    pub from: ProvinceId,
    pub to: ProvinceId,
    pub position: Vec2,
    /// Fraction of the trip covered
    pub progress: f64,
}

impl DispatchView {
    pub fn at(unit: &Dispatch, now: Millis) -> Self {
        Self {
            id: unit.id,
            group: unit.group,
            faction: unit.faction,
            from: unit.from,
            to: unit.to,
            position: unit.position(now),
            progress: progress(unit.spawn, unit.travel_duration_ms, now),
        }
    }
}
