//! Faction - one side competing for provinces

use ahash::AHashSet;

use crate::core::config::NameEntry;
use crate::core::types::{FactionId, GeneralId, ProvinceId};

/// Static per-faction data fixed for the whole match
#[derive(Debug, Clone, PartialEq)]
pub struct FactionProfile {
    pub id: FactionId,
    pub name: String,
    pub color: String,
    pub capital: ProvinceId,
    /// Economy per second per unit of owned area
    pub economy_multiplier: f64,
    pub name_pool: Vec<NameEntry>,
}

/// Mutable faction state: treasury and roster
#[derive(Debug, Clone, PartialEq)]
pub struct Faction {
    pub profile: FactionProfile,
    pub(crate) economy: f64,
    pub(crate) grain: u32,
    pub(crate) roster: Vec<GeneralId>,
    pub(crate) hired_names: AHashSet<String>,
}

impl Faction {
    pub fn new(profile: FactionProfile, economy: f64, grain: u32) -> Self {
        Self {
            profile,
            economy: economy.max(0.0),
            grain,
            roster: Vec::new(),
            hired_names: AHashSet::new(),
        }
    }

    pub fn id(&self) -> FactionId {
        self.profile.id
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn economy(&self) -> f64 {
        self.economy
    }

    pub fn grain(&self) -> u32 {
        self.grain
    }

    pub fn roster(&self) -> &[GeneralId] {
        &self.roster
    }

    pub fn hired_names(&self) -> &AHashSet<String> {
        &self.hired_names
    }

    /// Has every name in the pool been hired?
    pub fn pool_exhausted(&self) -> bool {
        self.profile
            .name_pool
            .iter()
            .all(|e| self.hired_names.contains(&e.name))
    }

    pub(crate) fn credit(&mut self, amount: f64) {
        self.economy = (self.economy + amount).max(0.0);
    }

    pub(crate) fn debit(&mut self, amount: f64) {
        self.economy = (self.economy - amount).max(0.0);
    }
}
