//! WorldState - the main match state container

use std::cell::OnceCell;
use std::collections::BTreeMap;

use ahash::AHashMap;

use crate::core::config::MatchConfig;
use crate::core::error::ConfigError;
use crate::core::types::{FactionId, GeneralId, IdCounter, ProvinceId};
use crate::generals::General;
use crate::territory::TerritoryGraph;
use crate::world::faction::{Faction, FactionProfile};
use crate::world::province::Province;

/// Per-faction values derived from ownership
#[derive(Debug, Clone, Default, PartialEq)]
struct Aggregates {
    province_counts: Vec<usize>,
    economy_rates: Vec<f64>,
}

/// Ownership, garrisons, treasuries and rosters of one match
#[derive(Debug, Clone)]
pub struct WorldState {
    provinces: Vec<Province>,
    factions: Vec<Faction>,
    generals: BTreeMap<GeneralId, General>,
    general_ids: IdCounter,
    codes: AHashMap<String, ProvinceId>,
    cache: OnceCell<Aggregates>,
}

impl PartialEq for WorldState {
    fn eq(&self, other: &Self) -> bool {
        self.provinces == other.provinces
            && self.factions == other.factions
            && self.generals == other.generals
            && self.general_ids == other.general_ids
    }
}

impl WorldState {
    /// Seed ownership and garrisons from the territory table and overrides
    pub fn initialize(graph: &TerritoryGraph, config: &MatchConfig) -> Result<Self, ConfigError> {
        let mut provinces: Vec<Province> = graph
            .nodes()
            .iter()
            .map(|node| Province {
                id: node.id,
                code: node.code.clone(),
                name: node.name.clone(),
                centroid: node.centroid,
                area: node.area,
                neutral_target: config.neutral.default_target,
                neighbors: node.neighbors.clone(),
                owner: None,
                garrison: config.neutral.default_garrison.max(0.0),
            })
            .collect();

        let codes: AHashMap<String, ProvinceId> = provinces
            .iter()
            .map(|p| (p.code.clone(), p.id))
            .collect();
        let lookup = |code: &str| {
            codes
                .get(code)
                .copied()
                .ok_or_else(|| ConfigError::UnknownCode(code.to_string()))
        };

        let mut factions = Vec::with_capacity(config.factions.len());
        for (i, fc) in config.factions.iter().enumerate() {
            let id = FactionId(i as u8);
            let capital = lookup(&fc.capital)?;
            for code in &fc.territory {
                let province = &mut provinces[lookup(code)?.index()];
                province.owner = Some(id);
                province.garrison = fc.starting_garrison.max(0.0);
            }

            let profile = FactionProfile {
                id,
                name: fc.name.clone(),
                color: fc.color.clone(),
                capital,
                economy_multiplier: fc.economy_multiplier,
                name_pool: fc.generals.clone(),
            };
            factions.push(Faction::new(profile, fc.starting_economy, fc.starting_grain));
        }

        for o in &config.province_overrides {
            let province = &mut provinces[lookup(&o.code)?.index()];
            if let Some(owner) = &o.owner {
                province.owner = config.faction_by_name(owner);
            }
            if let Some(garrison) = o.garrison {
                province.garrison = garrison.max(0.0);
            }
            if let Some(target) = o.neutral_target {
                province.neutral_target = target.max(0.0);
            }
        }

        Ok(Self {
            provinces,
            factions,
            generals: BTreeMap::new(),
            general_ids: IdCounter::new(),
            codes,
            cache: OnceCell::new(),
        })
    }

    // === PROVINCES ===

    pub fn provinces(&self) -> &[Province] {
        &self.provinces
    }

    pub fn province(&self, id: ProvinceId) -> Option<&Province> {
        self.provinces.get(id.index())
    }

    pub fn province_by_code(&self, code: &str) -> Option<&Province> {
        self.codes.get(code).and_then(|id| self.province(*id))
    }

    /// Set a garrison, clamped at zero
    ///
    /// Idle generals' claims at the province are trimmed if the garrison
    /// drops below what they hold.
    pub fn set_garrison(&mut self, id: ProvinceId, garrison: f64) {
        let Some(province) = self.provinces.get_mut(id.index()) else {
            return;
        };
        let clamped = if garrison.is_finite() { garrison.max(0.0) } else { 0.0 };
        let dropped = clamped < province.garrison;
        province.garrison = clamped;
        self.invalidate();

        if dropped {
            self.trim_claims(id);
        }
    }

    pub fn add_garrison(&mut self, id: ProvinceId, delta: f64) {
        if let Some(current) = self.province(id).map(|p| p.garrison) {
            self.set_garrison(id, current + delta);
        }
    }

    /// Change a province's owner; the only conquest mechanism
    ///
    /// Idle generals of the previous owner stationed there fall back to
    /// their faction's home province. Returns the previous owner.
    pub fn set_owner(&mut self, id: ProvinceId, owner: Option<FactionId>) -> Option<FactionId> {
        let Some(province) = self.provinces.get_mut(id.index()) else {
            return None;
        };
        let previous = province.owner;
        if previous == owner {
            return previous;
        }
        province.owner = owner;
        self.invalidate();

        if let Some(loser) = previous {
            self.relocate_stranded(loser, id);
        }
        previous
    }

    /// Regenerate neutral garrisons toward their targets
    pub fn regenerate_neutral(&mut self, dt_secs: f64, recover_rate: f64) {
        let gain = recover_rate * dt_secs;
        if gain <= 0.0 {
            return;
        }
        let mut changed = false;
        for province in self.provinces.iter_mut().filter(|p| p.owner.is_none()) {
            if province.garrison < province.neutral_target {
                province.garrison = (province.garrison + gain).min(province.neutral_target);
                changed = true;
            }
        }
        if changed {
            self.invalidate();
        }
    }

    // === FACTIONS ===

    pub fn factions(&self) -> &[Faction] {
        &self.factions
    }

    pub fn faction(&self, id: FactionId) -> Option<&Faction> {
        self.factions.get(id.index())
    }

    pub(crate) fn faction_mut(&mut self, id: FactionId) -> Option<&mut Faction> {
        self.factions.get_mut(id.index())
    }

    pub fn faction_ids(&self) -> impl Iterator<Item = FactionId> + '_ {
        self.factions.iter().map(|f| f.id())
    }

    /// Number of provinces the faction currently owns
    pub fn province_count(&self, id: FactionId) -> usize {
        self.aggregates().province_counts.get(id.index()).copied().unwrap_or(0)
    }

    /// Passive income: owned area times the faction multiplier
    pub fn economy_rate(&self, id: FactionId) -> f64 {
        self.aggregates().economy_rates.get(id.index()).copied().unwrap_or(0.0)
    }

    pub fn owned_provinces(&self, id: FactionId) -> impl Iterator<Item = &Province> + '_ {
        self.provinces.iter().filter(move |p| p.owner == Some(id))
    }

    /// Capital if still owned, else the lowest-id owned province
    pub fn home_province(&self, id: FactionId) -> Option<ProvinceId> {
        let faction = self.faction(id)?;
        let capital = faction.profile.capital;
        if self.province(capital).is_some_and(|p| p.is_owned_by(id)) {
            return Some(capital);
        }
        self.owned_provinces(id).map(|p| p.id).next()
    }

    // === GENERALS ===

    pub fn general(&self, id: GeneralId) -> Option<&General> {
        self.generals.get(&id)
    }

    pub(crate) fn general_mut(&mut self, id: GeneralId) -> Option<&mut General> {
        self.generals.get_mut(&id)
    }

    pub fn generals(&self) -> impl Iterator<Item = &General> + '_ {
        self.generals.values()
    }

    pub fn generals_of(&self, faction: FactionId) -> impl Iterator<Item = &General> + '_ {
        self.generals.values().filter(move |g| g.faction == faction)
    }

    /// Idle generals stationed at a province
    pub fn idle_generals_at(&self, province: ProvinceId) -> impl Iterator<Item = &General> + '_ {
        self.generals.values().filter(move |g| g.is_idle_at(province))
    }

    /// Troops already claimed at a province by Idle generals other than `except`
    pub fn claimed_at(&self, province: ProvinceId, except: Option<GeneralId>) -> u32 {
        self.idle_generals_at(province)
            .filter(|g| Some(g.id) != except)
            .map(|g| g.assigned)
            .sum()
    }

    pub(crate) fn next_general_id(&mut self) -> GeneralId {
        GeneralId(self.general_ids.next())
    }

    pub(crate) fn insert_general(&mut self, general: General) {
        if let Some(faction) = self.factions.get_mut(general.faction.index()) {
            faction.roster.push(general.id);
            faction.hired_names.insert(general.name.clone());
        }
        self.generals.insert(general.id, general);
    }

    /// Remove a general whose faction has nowhere left to station it
    pub(crate) fn dismiss_general(&mut self, id: GeneralId) {
        if let Some(general) = self.generals.remove(&id) {
            if let Some(faction) = self.factions.get_mut(general.faction.index()) {
                faction.roster.retain(|g| *g != id);
            }
            tracing::debug!("General {} of {} dismissed: no province left", general.name, general.faction);
        }
    }

    // === INTERNALS ===

    fn invalidate(&mut self) {
        self.cache.take();
    }

    fn aggregates(&self) -> &Aggregates {
        self.cache.get_or_init(|| {
            let mut agg = Aggregates {
                province_counts: vec![0; self.factions.len()],
                economy_rates: vec![0.0; self.factions.len()],
            };
            for province in &self.provinces {
                if let Some(owner) = province.owner {
                    let i = owner.index();
                    if i < self.factions.len() {
                        agg.province_counts[i] += 1;
                        agg.economy_rates[i] += province.area * self.factions[i].profile.economy_multiplier;
                    }
                }
            }
            agg
        })
    }

    /// Shrink Idle claims, newest general first, until they fit the garrison
    fn trim_claims(&mut self, province: ProvinceId) {
        let available = self.provinces[province.index()].garrison.floor() as u32;
        let mut excess = self.claimed_at(province, None).saturating_sub(available);
        if excess == 0 {
            return;
        }
        for general in self.generals.values_mut().rev().filter(|g| g.is_idle_at(province)) {
            let cut = general.assigned.min(excess);
            general.assigned -= cut;
            excess -= cut;
            if excess == 0 {
                break;
            }
        }
    }

    fn relocate_stranded(&mut self, loser: FactionId, province: ProvinceId) {
        let stranded: Vec<GeneralId> = self
            .generals
            .values()
            .filter(|g| g.faction == loser && g.is_idle_at(province))
            .map(|g| g.id)
            .collect();
        if stranded.is_empty() {
            return;
        }

        match self.home_province(loser) {
            Some(home) => {
                for id in stranded {
                    if let Some(general) = self.generals.get_mut(&id) {
                        general.station_at(home);
                        tracing::debug!("General {} falls back to {}", general.name, home);
                    }
                }
            }
            None => {
                for id in stranded {
                    self.dismiss_general(id);
                }
            }
        }
    }
}
