//! Dispatch engine - issues, advances and resolves army movements
//!
//! Orders are NOT instant. An attack spends its grain and garrison when it
//! is issued, then its units trickle toward the target and resolve one by
//! one on arrival.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::DispatchTuning;
use crate::core::error::CommandError;
use crate::core::types::{DispatchId, FactionId, GeneralId, GroupId, IdCounter, Millis, ProvinceId};
use crate::dispatch::lane::LaneParams;
use crate::dispatch::resolution::{resolve_arrival, ArrivalOutcome};
use crate::dispatch::unit::{Dispatch, DispatchGroup};
use crate::world::WorldState;

/// A single-hop attack order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOrder {
    pub faction: FactionId,
    pub general: GeneralId,
    pub from: ProvinceId,
    pub to: ProvinceId,
    pub troops: u32,
}

/// Receipt of an accepted order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedAttack {
    pub group: GroupId,
    /// When the commanding general becomes Idle again
    pub release_at: Millis,
}

/// Two opposing groups that met in flight; both were cancelled
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collision {
    pub first: GroupId,
    pub first_faction: FactionId,
    pub second: GroupId,
    pub second_faction: FactionId,
    pub at: Millis,
}

/// One unit resolved at its destination
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrivalReport {
    pub dispatch: DispatchId,
    pub group: GroupId,
    pub faction: FactionId,
    pub province: ProvinceId,
    pub arrived_at: Millis,
    pub outcome: ArrivalOutcome,
}

/// All unresolved dispatch groups of a match
#[derive(Debug, Clone, Default)]
pub struct DispatchEngine {
    groups: Vec<DispatchGroup>,
    group_ids: IdCounter,
    dispatch_ids: IdCounter,
}

impl DispatchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and launch an attack
    ///
    /// On failure the world is untouched. On success grain and garrison are
    /// debited, the general marches, and one unit per troop is created.
    pub fn issue_attack<R: Rng + ?Sized>(
        &mut self,
        world: &mut WorldState,
        order: &AttackOrder,
        now: Millis,
        tuning: &DispatchTuning,
        rng: &mut R,
    ) -> Result<IssuedAttack, CommandError> {
        let AttackOrder { faction, general, from, to, troops } = *order;

        let grain = world
            .faction(faction)
            .map(|f| f.grain())
            .ok_or(CommandError::UnknownFaction(faction))?;
        let origin = world.province(from).ok_or(CommandError::UnknownProvince(from))?;
        let target = world.province(to).ok_or(CommandError::UnknownProvince(to))?;

        if !origin.is_adjacent(to) {
            return Err(CommandError::InvalidOrder { from, to });
        }
        if !origin.is_owned_by(faction) {
            return Err(CommandError::NotOwned { faction, province: from });
        }
        if target.is_owned_by(faction) {
            return Err(CommandError::SameFaction(to));
        }

        let commander = world.general(general).ok_or(CommandError::UnknownGeneral(general))?;
        if commander.faction != faction
            || !commander.is_idle_at(from)
            || troops == 0
            || commander.assigned_troops() < troops
        {
            return Err(CommandError::NoCommander(general));
        }
        if grain < troops {
            return Err(CommandError::InsufficientGrain { needed: troops, available: grain });
        }
        let available = origin.displayed_garrison();
        if available < troops {
            return Err(CommandError::InsufficientGarrison { province: from, needed: troops, available });
        }

        let (origin_pos, target_pos) = (origin.centroid, target.centroid);

        // Commit
        if let Some(state) = world.faction_mut(faction) {
            state.grain -= troops;
        }
        if let Some(g) = world.general_mut(general) {
            g.march();
        }
        world.add_garrison(from, -(troops as f64));

        let group = GroupId(self.group_ids.next());
        let units = (0..troops)
            .map(|i| Dispatch {
                id: DispatchId(self.dispatch_ids.next()),
                group,
                faction,
                general: Some(general),
                from,
                to,
                origin: origin_pos,
                target: target_pos,
                spawn: now + i as Millis * tuning.unit_stagger_ms,
                travel_duration_ms: tuning.travel_duration_ms,
                lane: LaneParams::random(tuning.lane_width, tuning.lane_bow, rng),
            })
            .collect();
        self.groups.push(DispatchGroup {
            id: group,
            faction,
            general: Some(general),
            from,
            to,
            issued_at: now,
            units,
        });

        let last_spawn = now + (troops as Millis - 1) * tuning.unit_stagger_ms;
        let release_at = last_spawn + tuning.travel_duration_ms + tuning.release_buffer_ms;

        tracing::debug!("{} sends {} troops {} -> {} under {}", faction, troops, from, to, general);
        Ok(IssuedAttack { group, release_at })
    }

    /// Cancel every pair of opposing groups whose representatives are closer
    /// than `capture_distance`
    ///
    /// All pairs are found before anything is cancelled, so the outcome does
    /// not depend on group order. A cancelled group loses all its unresolved
    /// units.
    pub fn detect_collisions(&mut self, now: Millis, capture_distance: f64) -> Vec<Collision> {
        if capture_distance <= 0.0 {
            return Vec::new();
        }

        let flying: Vec<_> = self
            .groups
            .iter()
            .filter_map(|g| g.representative(now).map(|u| (g.id, g.faction, u.position(now))))
            .collect();

        let mut collisions = Vec::new();
        for (i, &(a, a_faction, a_pos)) in flying.iter().enumerate() {
            for &(b, b_faction, b_pos) in &flying[i + 1..] {
                if a_faction != b_faction && a_pos.distance(&b_pos) < capture_distance {
                    collisions.push(Collision {
                        first: a,
                        first_faction: a_faction,
                        second: b,
                        second_faction: b_faction,
                        at: now,
                    });
                }
            }
        }

        if !collisions.is_empty() {
            self.groups.retain(|g| {
                !collisions.iter().any(|c| c.first == g.id || c.second == g.id)
            });
            for c in &collisions {
                tracing::debug!(
                    "Groups {:?} ({}) and {:?} ({}) cancelled each other",
                    c.first, c.first_faction, c.second, c.second_faction
                );
            }
        }
        collisions
    }

    /// Resolve every unit whose arrival time has passed, in arrival order
    pub fn resolve_arrivals(&mut self, world: &mut WorldState, now: Millis) -> Vec<ArrivalReport> {
        let mut due: Vec<Dispatch> = Vec::new();
        for group in &mut self.groups {
            let (landed, flying): (Vec<_>, Vec<_>) =
                group.units.drain(..).partition(|u| u.arrival() <= now);
            group.units = flying;
            due.extend(landed);
        }
        self.groups.retain(|g| !g.is_empty());

        due.sort_by_key(|u| (u.arrival(), u.group, u.id));

        due.into_iter()
            .filter_map(|unit| {
                let outcome = resolve_arrival(world, unit.faction, unit.to)?;
                Some(ArrivalReport {
                    dispatch: unit.id,
                    group: unit.group,
                    faction: unit.faction,
                    province: unit.to,
                    arrived_at: unit.arrival(),
                    outcome,
                })
            })
            .collect()
    }

    /// Units currently between provinces
    pub fn in_flight(&self, now: Millis) -> impl Iterator<Item = &Dispatch> + '_ {
        self.groups
            .iter()
            .flat_map(|g| g.units.iter())
            .filter(move |u| u.is_in_flight(now))
    }

    /// Unresolved units, whether spawned yet or not
    pub fn unit_count(&self) -> usize {
        self.groups.iter().map(|g| g.units.len()).sum()
    }

    /// Drop every group and restart id allocation
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Return a marching general to Idle once its order has played out
///
/// The general stations at the target if its faction now owns it, else back
/// at the origin, else at the faction's home province. A faction with no
/// provinces left loses the general. Returns the new station.
pub fn release_general(
    world: &mut WorldState,
    general: GeneralId,
    from: ProvinceId,
    to: ProvinceId,
) -> Option<ProvinceId> {
    let faction = world.general(general)?.faction;
    let owns = |p: ProvinceId| world.province(p).is_some_and(|p| p.is_owned_by(faction));

    let station = if owns(to) {
        Some(to)
    } else if owns(from) {
        Some(from)
    } else {
        world.home_province(faction)
    };

    match station {
        Some(station) => {
            if let Some(g) = world.general_mut(general) {
                g.station_at(station);
            }
            Some(station)
        }
        None => {
            world.dismiss_general(general);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::MatchConfig;
    use crate::generals::{General, GeneralStats, GeneralStatus, Tier};
    use crate::territory::{TerritoryDataset, TerritoryGraph};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const QIN: FactionId = FactionId(0);
    const CHU: FactionId = FactionId(1);

    fn world() -> WorldState {
        let config = MatchConfig::default();
        let graph = TerritoryGraph::build(&TerritoryDataset::grid(9, 6, 10.0)).expect("grid builds");
        WorldState::initialize(&graph, &config).expect("world initializes")
    }

    fn id(world: &WorldState, code: &str) -> ProvinceId {
        world.province_by_code(code).map(|p| p.id).expect("code exists")
    }

    fn station_general(world: &mut WorldState, faction: FactionId, at: ProvinceId, assigned: u32) -> GeneralId {
        let gid = world.next_general_id();
        let stats = GeneralStats { command: 80, valor: 80, intellect: 80, politics: 80 };
        let mut g = General::new(gid, faction, format!("Test {}", gid.0), Tier::A, stats, 240, at);
        g.assigned = assigned;
        world.insert_general(g);
        gid
    }

    fn straight() -> DispatchTuning {
        DispatchTuning { lane_width: 0.0, lane_bow: 0.0, ..DispatchTuning::default() }
    }

    #[test]
    fn test_issue_debits_garrison_and_grain() {
        let mut world = world();
        let mut engine = DispatchEngine::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (from, to) = (id(&world, "0301"), id(&world, "0302"));
        let g = station_general(&mut world, QIN, from, 50);

        let order = AttackOrder { faction: QIN, general: g, from, to, troops: 50 };
        let issued = engine
            .issue_attack(&mut world, &order, 1000, &DispatchTuning::default(), &mut rng)
            .expect("valid order");

        assert_eq!(world.province(from).map(|p| p.garrison()), Some(40.0));
        assert_eq!(world.faction(QIN).map(|f| f.grain()), Some(250));
        assert_eq!(world.general(g).map(|g| g.status()), Some(GeneralStatus::Marching));
        assert_eq!(engine.unit_count(), 50);
        assert_eq!(issued.release_at, 1000 + 49 * 30 + 2400 + 300);
    }

    #[test]
    fn test_validation_order_and_no_partial_debit() {
        let mut world = world();
        let mut engine = DispatchEngine::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let tuning = DispatchTuning::default();
        let capital = id(&world, "0301");
        let g = station_general(&mut world, QIN, capital, 50);
        let before = world.clone();

        let far = id(&world, "0505");
        let order = AttackOrder { faction: QIN, general: g, from: capital, to: far, troops: 10 };
        assert_eq!(
            engine.issue_attack(&mut world, &order, 0, &tuning, &mut rng),
            Err(CommandError::InvalidOrder { from: capital, to: far })
        );

        let own = id(&world, "0300");
        let order = AttackOrder { faction: QIN, general: g, from: capital, to: own, troops: 10 };
        assert_eq!(
            engine.issue_attack(&mut world, &order, 0, &tuning, &mut rng),
            Err(CommandError::SameFaction(own))
        );

        let neutral = id(&world, "0302");
        let order = AttackOrder { faction: QIN, general: g, from: neutral, to: capital, troops: 10 };
        assert_eq!(
            engine.issue_attack(&mut world, &order, 0, &tuning, &mut rng),
            Err(CommandError::NotOwned { faction: QIN, province: neutral })
        );

        let order = AttackOrder { faction: QIN, general: g, from: capital, to: neutral, troops: 51 };
        assert_eq!(
            engine.issue_attack(&mut world, &order, 0, &tuning, &mut rng),
            Err(CommandError::NoCommander(g))
        );

        let order = AttackOrder { faction: QIN, general: g, from: capital, to: neutral, troops: 0 };
        assert_eq!(
            engine.issue_attack(&mut world, &order, 0, &tuning, &mut rng),
            Err(CommandError::NoCommander(g))
        );

        assert_eq!(world, before);
        assert_eq!(engine.unit_count(), 0);
    }

    #[test]
    fn test_insufficient_grain() {
        let mut world = world();
        let mut engine = DispatchEngine::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (from, to) = (id(&world, "0301"), id(&world, "0302"));
        let g = station_general(&mut world, QIN, from, 50);
        if let Some(f) = world.faction_mut(QIN) {
            f.grain = 20;
        }

        let order = AttackOrder { faction: QIN, general: g, from, to, troops: 50 };
        assert_eq!(
            engine.issue_attack(&mut world, &order, 0, &DispatchTuning::default(), &mut rng),
            Err(CommandError::InsufficientGrain { needed: 50, available: 20 })
        );
    }

    #[test]
    fn test_insufficient_garrison() {
        let mut world = world();
        let mut engine = DispatchEngine::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (from, to) = (id(&world, "0301"), id(&world, "0302"));
        let g = station_general(&mut world, QIN, from, 50);
        world.set_garrison(from, 30.0);
        // Restore the stale claim the drop trimmed
        if let Some(general) = world.general_mut(g) {
            general.assigned = 50;
        }

        let order = AttackOrder { faction: QIN, general: g, from, to, troops: 50 };
        assert_eq!(
            engine.issue_attack(&mut world, &order, 0, &DispatchTuning::default(), &mut rng),
            Err(CommandError::InsufficientGarrison { province: from, needed: 50, available: 30 })
        );
    }

    #[test]
    fn test_units_resolve_in_arrival_order() {
        let mut world = world();
        let mut engine = DispatchEngine::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (from, to) = (id(&world, "0301"), id(&world, "0302"));
        world.set_garrison(to, 3.0);
        let g = station_general(&mut world, QIN, from, 6);

        let order = AttackOrder { faction: QIN, general: g, from, to, troops: 6 };
        engine
            .issue_attack(&mut world, &order, 0, &DispatchTuning::default(), &mut rng)
            .expect("valid order");

        assert!(engine.resolve_arrivals(&mut world, 2399).is_empty());
        let reports = engine.resolve_arrivals(&mut world, 10_000);
        let outcomes: Vec<_> = reports.iter().map(|r| r.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                ArrivalOutcome::Attrited,
                ArrivalOutcome::Attrited,
                ArrivalOutcome::Captured { previous: None },
                ArrivalOutcome::Reinforced,
                ArrivalOutcome::Reinforced,
                ArrivalOutcome::Reinforced,
            ]
        );
        assert_eq!(world.province(to).map(|p| p.garrison()), Some(4.0));
        assert_eq!(engine.unit_count(), 0);
    }

    #[test]
    fn test_head_on_groups_cancel_each_other() {
        let mut world = world();
        let mut engine = DispatchEngine::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let tuning = straight();

        // Qin 0301 and a Chu-held 0302 attack each other along the same edge
        let (qin_home, chu_home) = (id(&world, "0301"), id(&world, "0302"));
        world.set_owner(chu_home, Some(CHU));
        world.set_garrison(chu_home, 40.0);
        let qin_g = station_general(&mut world, QIN, qin_home, 10);
        let chu_g = station_general(&mut world, CHU, chu_home, 10);

        let qin_order = AttackOrder { faction: QIN, general: qin_g, from: qin_home, to: chu_home, troops: 10 };
        let chu_order = AttackOrder { faction: CHU, general: chu_g, from: chu_home, to: qin_home, troops: 10 };
        engine.issue_attack(&mut world, &qin_order, 0, &tuning, &mut rng).expect("qin order");
        engine.issue_attack(&mut world, &chu_order, 0, &tuning, &mut rng).expect("chu order");
        let snapshot = world.clone();

        // Both leads sit 10 apart at spawn and meet at mid-path
        assert!(engine.detect_collisions(100, 1.5).is_empty());
        let collisions = engine.detect_collisions(1200, 1.5);
        assert_eq!(collisions.len(), 1);
        assert_eq!(engine.unit_count(), 0);
        // Cancelled units leave no trace to render
        assert_eq!(engine.in_flight(1200).count(), 0);

        assert!(engine.resolve_arrivals(&mut world, 10_000).is_empty());
        assert_eq!(world, snapshot);
    }

    #[test]
    fn test_zero_capture_distance_disables_collisions() {
        let mut world = world();
        let mut engine = DispatchEngine::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let tuning = straight();
        let (qin_home, chu_home) = (id(&world, "0301"), id(&world, "0302"));
        world.set_owner(chu_home, Some(CHU));
        let qin_g = station_general(&mut world, QIN, qin_home, 5);
        let chu_g = station_general(&mut world, CHU, chu_home, 5);

        let qin_order = AttackOrder { faction: QIN, general: qin_g, from: qin_home, to: chu_home, troops: 5 };
        let chu_order = AttackOrder { faction: CHU, general: chu_g, from: chu_home, to: qin_home, troops: 5 };
        engine.issue_attack(&mut world, &qin_order, 0, &tuning, &mut rng).expect("qin order");
        engine.issue_attack(&mut world, &chu_order, 0, &tuning, &mut rng).expect("chu order");

        assert!(engine.detect_collisions(1200, 0.0).is_empty());
        assert_eq!(engine.unit_count(), 10);
    }

    #[test]
    fn test_release_prefers_target_then_origin() {
        let mut world = world();
        let (from, to) = (id(&world, "0301"), id(&world, "0302"));
        let g = station_general(&mut world, QIN, from, 0);
        if let Some(general) = world.general_mut(g) {
            general.march();
        }

        assert_eq!(release_general(&mut world, g, from, to), Some(from));
        assert_eq!(world.general(g).and_then(|g| g.station()), Some(from));

        if let Some(general) = world.general_mut(g) {
            general.march();
        }
        world.set_owner(to, Some(QIN));
        assert_eq!(release_general(&mut world, g, from, to), Some(to));
    }

    #[test]
    fn test_release_dismisses_when_landless() {
        let mut world = world();
        let (from, to) = (id(&world, "0301"), id(&world, "0302"));
        let g = station_general(&mut world, QIN, from, 0);
        if let Some(general) = world.general_mut(g) {
            general.march();
        }
        let owned: Vec<_> = world.owned_provinces(QIN).map(|p| p.id).collect();
        for p in owned {
            world.set_owner(p, Some(CHU));
        }

        assert_eq!(release_general(&mut world, g, from, to), None);
        assert!(world.general(g).is_none());
    }
}
