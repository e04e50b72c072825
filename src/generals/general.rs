//! Generals - named commanders that lead troops out of a province

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{FactionId, GeneralId, ProvinceId};

/// Quality class of a general, drawn at hire
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    S,
    A,
    B,
    C,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::S, Tier::A, Tier::B, Tier::C];

    /// Inclusive range each stat is rolled from
    pub fn stat_range(self) -> (u8, u8) {
        match self {
            Self::S => (88, 100),
            Self::A => (76, 92),
            Self::B => (60, 80),
            Self::C => (40, 66),
        }
    }
}

/// One value per tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierTable<T> {
    pub s: T,
    pub a: T,
    pub b: T,
    pub c: T,
}

impl<T: Copy> TierTable<T> {
    pub fn get(&self, tier: Tier) -> T {
        match tier {
            Tier::S => self.s,
            Tier::A => self.a,
            Tier::B => self.b,
            Tier::C => self.c,
        }
    }
}

/// The four stat scores of a general (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralStats {
    pub command: u8,
    pub valor: u8,
    pub intellect: u8,
    pub politics: u8,
}

impl GeneralStats {
    pub fn roll<R: Rng + ?Sized>(tier: Tier, rng: &mut R) -> Self {
        let (lo, hi) = tier.stat_range();
        Self {
            command: rng.gen_range(lo..=hi),
            valor: rng.gen_range(lo..=hi),
            intellect: rng.gen_range(lo..=hi),
            politics: rng.gen_range(lo..=hi),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneralStatus {
    Idle,
    Marching,
}

/// A hired commander
///
/// An Idle general always has a station; a Marching general never does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct General {
    pub id: GeneralId,
    pub faction: FactionId,
    pub name: String,
    pub tier: Tier,
    pub stats: GeneralStats,
    pub troop_cap: u32,
    pub(crate) assigned: u32,
    pub(crate) station: Option<ProvinceId>,
}

impl General {
    pub fn new(
        id: GeneralId,
        faction: FactionId,
        name: String,
        tier: Tier,
        stats: GeneralStats,
        troop_cap: u32,
        station: ProvinceId,
    ) -> Self {
        Self {
            id,
            faction,
            name,
            tier,
            stats,
            troop_cap,
            assigned: 0,
            station: Some(station),
        }
    }

    pub fn status(&self) -> GeneralStatus {
        if self.station.is_some() {
            GeneralStatus::Idle
        } else {
            GeneralStatus::Marching
        }
    }

    pub fn is_idle(&self) -> bool {
        self.station.is_some()
    }

    /// Idle generals only
    pub fn station(&self) -> Option<ProvinceId> {
        self.station
    }

    pub fn assigned_troops(&self) -> u32 {
        self.assigned
    }

    /// Is this general idle at the given province?
    pub fn is_idle_at(&self, province: ProvinceId) -> bool {
        self.station == Some(province)
    }

    pub(crate) fn march(&mut self) {
        self.station = None;
        self.assigned = 0;
    }

    pub(crate) fn station_at(&mut self, province: ProvinceId) {
        self.station = Some(province);
        self.assigned = 0;
    }
}
