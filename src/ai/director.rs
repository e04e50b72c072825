//! AI Director - periodic heuristic controller for non-player factions
//!
//! Each tick walks the factions in id order and runs four independently
//! chance-gated steps: economy, hiring, assignment, attack.

use ordered_float::OrderedFloat;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ai::FactionCommands;
use crate::core::config::{AiTuning, MatchConfig};
use crate::core::types::{FactionId, GeneralId, ProvinceId};
use crate::dispatch::AttackOrder;
use crate::generals::HireOutcome;

/// What the director did for one faction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AiAction {
    BoughtGrain { faction: FactionId, amount: u32 },
    Recruited { faction: FactionId, amount: u32 },
    Hired { faction: FactionId, outcome: HireOutcome },
    Assigned { general: GeneralId, troops: u32 },
    Attacked(AttackOrder),
}

/// A scored attack option
#[derive(Debug, Clone, Copy)]
struct Candidate {
    general: GeneralId,
    from: ProvinceId,
    to: ProvinceId,
    troops: u32,
    score: f64,
}

#[derive(Debug, Clone)]
pub struct AiDirector {
    tuning: AiTuning,
    hire_cost: f64,
    garrison_price: f64,
}

impl AiDirector {
    pub fn new(tuning: AiTuning, hire_cost: f64, garrison_price: f64) -> Self {
        Self { tuning, hire_cost, garrison_price }
    }

    pub fn from_config(config: &MatchConfig) -> Self {
        Self::new(config.ai.clone(), config.hiring.hire_cost, config.economy.garrison_price)
    }

    /// Run one decision pass for every AI faction still holding land
    pub fn run_tick<C: FactionCommands>(&self, cmds: &mut C, player: Option<FactionId>) -> Vec<AiAction> {
        let factions: Vec<FactionId> = cmds
            .world()
            .faction_ids()
            .filter(|&f| Some(f) != player)
            .collect();

        let mut actions = Vec::new();
        for faction in factions {
            if cmds.world().province_count(faction) == 0 {
                continue;
            }
            self.economic_step(cmds, faction, &mut actions);
            self.hiring_step(cmds, faction, &mut actions);
            self.assignment_step(cmds, faction, &mut actions);
            self.attack_step(cmds, faction, player, &mut actions);
        }
        actions
    }

    fn roll<C: FactionCommands>(cmds: &mut C, chance: f64) -> bool {
        cmds.rng().gen_bool(chance.clamp(0.0, 1.0))
    }

    /// Buy grain when low, otherwise maybe turn spare economy into troops
    fn economic_step<C: FactionCommands>(&self, cmds: &mut C, faction: FactionId, actions: &mut Vec<AiAction>) {
        let Some((grain, economy)) = cmds.world().faction(faction).map(|f| (f.grain(), f.economy())) else {
            return;
        };

        if grain < self.tuning.grain_low_threshold {
            if Self::roll(cmds, self.tuning.grain_buy_chance) {
                let amount = self.tuning.grain_buy_amount;
                match cmds.buy_grain(faction, amount) {
                    Ok(_) => actions.push(AiAction::BoughtGrain { faction, amount }),
                    Err(e) => tracing::debug!("{} skips grain purchase: {}", faction, e),
                }
            }
        } else if Self::roll(cmds, self.tuning.garrison_convert_chance)
            && economy >= self.tuning.garrison_convert_reserve + self.tuning.garrison_convert_budget
        {
            let amount = (self.tuning.garrison_convert_budget / self.garrison_price).floor() as u32;
            match cmds.recruit_garrison(faction, amount) {
                Ok(_) => actions.push(AiAction::Recruited { faction, amount }),
                Err(e) => tracing::debug!("{} skips recruiting: {}", faction, e),
            }
        }
    }

    fn hiring_step<C: FactionCommands>(&self, cmds: &mut C, faction: FactionId, actions: &mut Vec<AiAction>) {
        let Some(state) = cmds.world().faction(faction) else {
            return;
        };
        if state.economy() < self.hire_cost || state.pool_exhausted() {
            return;
        }
        let roster = state.roster().len();

        if roster >= self.tuning.roster_soft_cap && !Self::roll(cmds, self.tuning.roster_override_chance) {
            return;
        }
        if !Self::roll(cmds, self.tuning.hire_chance) {
            return;
        }
        match cmds.hire_general(faction) {
            Ok(outcome) => actions.push(AiAction::Hired { faction, outcome }),
            Err(e) => tracing::debug!("{} skips hiring: {}", faction, e),
        }
    }

    /// Raise under-assigned Idle generals toward a share of their station
    fn assignment_step<C: FactionCommands>(&self, cmds: &mut C, faction: FactionId, actions: &mut Vec<AiAction>) {
        if !Self::roll(cmds, self.tuning.assign_chance) {
            return;
        }
        let world = cmds.world();
        let wanted: Vec<(GeneralId, u32)> = world
            .generals_of(faction)
            .filter_map(|g| {
                let station = world.province(g.station()?)?;
                let share = (station.displayed_garrison() as f64 * self.tuning.assign_fraction).floor() as u32;
                let target = share.min(g.troop_cap);
                (g.assigned_troops() < target).then_some((g.id, target))
            })
            .collect();

        for (general, target) in wanted {
            match cmds.assign_troops(general, target) {
                Ok(troops) => actions.push(AiAction::Assigned { general, troops }),
                Err(e) => tracing::debug!("{} skips assigning {}: {}", faction, general, e),
            }
        }
    }

    /// Score every adjacent foreign target and launch the single best attack
    fn attack_step<C: FactionCommands>(
        &self,
        cmds: &mut C,
        faction: FactionId,
        player: Option<FactionId>,
        actions: &mut Vec<AiAction>,
    ) {
        if !Self::roll(cmds, self.tuning.attack_chance) {
            return;
        }
        let world = cmds.world();
        let Some(grain) = world.faction(faction).map(|f| f.grain()) else {
            return;
        };

        // (general, from, to, troops, base score) before jitter
        let mut options = Vec::new();
        for g in world.generals_of(faction) {
            let Some(station) = g.station().and_then(|s| world.province(s)) else {
                continue;
            };
            if station.garrison() < self.tuning.attack_min_station {
                continue;
            }
            let troops = g.assigned_troops().min(station.displayed_garrison());
            if troops == 0 {
                continue;
            }
            for &n in station.neighbors() {
                let Some(target) = world.province(n) else {
                    continue;
                };
                if target.is_owned_by(faction) {
                    continue;
                }
                let mut base = troops as f64 - target.garrison();
                match target.owner() {
                    None => base += self.tuning.neutral_target_bonus,
                    Some(owner) if Some(owner) == player => base += self.tuning.human_target_bonus,
                    Some(_) => {}
                }
                options.push((g.id, station.id, n, troops, base));
            }
        }

        let jitter = self.tuning.jitter;
        let best = options
            .into_iter()
            .map(|(general, from, to, troops, base)| {
                let noise = if jitter > 0.0 { cmds.rng().gen_range(-jitter..=jitter) } else { 0.0 };
                Candidate { general, from, to, troops, score: base + noise }
            })
            .max_by_key(|c| OrderedFloat(c.score));

        let Some(best) = best else {
            return;
        };
        if best.score < self.tuning.attack_floor {
            return;
        }
        if grain < best.troops {
            tracing::debug!("{} holds back: {} grain for {} troops", faction, grain, best.troops);
            return;
        }

        let order = AttackOrder {
            faction,
            general: best.general,
            from: best.from,
            to: best.to,
            troops: best.troops,
        };
        match cmds.issue_attack(order) {
            Ok(_) => {
                tracing::debug!("{} attacks {} -> {} (score {:.1})", faction, best.from, best.to, best.score);
                actions.push(AiAction::Attacked(order));
            }
            Err(e) => tracing::debug!("{} skips attack on {}: {}", faction, best.to, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::CommandError;
    use crate::core::types::Millis;
    use crate::dispatch::{DispatchEngine, IssuedAttack};
    use crate::economy;
    use crate::generals::{self, General, GeneralStats, Tier};
    use crate::territory::{TerritoryDataset, TerritoryGraph};
    use crate::world::WorldState;
    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    const QIN: FactionId = FactionId(0);
    const CHU: FactionId = FactionId(1);

    /// Minimal command surface over a bare world
    struct Sandbox {
        config: MatchConfig,
        world: WorldState,
        engine: DispatchEngine,
        rng: ChaCha8Rng,
        now: Millis,
    }

    impl FactionCommands for Sandbox {
        fn world(&self) -> &WorldState {
            &self.world
        }

        fn rng(&mut self) -> &mut dyn RngCore {
            &mut self.rng
        }

        fn hire_general(&mut self, faction: FactionId) -> Result<HireOutcome, CommandError> {
            generals::hire_general(&mut self.world, faction, &self.config.hiring, &mut self.rng)
        }

        fn assign_troops(&mut self, general: GeneralId, amount: u32) -> Result<u32, CommandError> {
            generals::assign_troops(&mut self.world, general, amount)
        }

        fn issue_attack(&mut self, order: AttackOrder) -> Result<IssuedAttack, CommandError> {
            self.engine
                .issue_attack(&mut self.world, &order, self.now, &self.config.dispatch, &mut self.rng)
        }

        fn buy_grain(&mut self, faction: FactionId, amount: u32) -> Result<u32, CommandError> {
            economy::buy_grain(&mut self.world, faction, amount, self.config.economy.grain_price)
        }

        fn recruit_garrison(&mut self, faction: FactionId, amount: u32) -> Result<ProvinceId, CommandError> {
            economy::recruit_garrison(&mut self.world, faction, amount, self.config.economy.garrison_price)
        }
    }

    /// Qin (player) and Chu only; every chance gate closed, no jitter
    fn quiet_config() -> MatchConfig {
        let mut config = MatchConfig::default();
        config.factions.truncate(2);
        config.ai = AiTuning {
            grain_buy_chance: 0.0,
            garrison_convert_chance: 0.0,
            hire_chance: 0.0,
            roster_override_chance: 0.0,
            assign_chance: 0.0,
            attack_chance: 0.0,
            jitter: 0.0,
            ..AiTuning::default()
        };
        config
    }

    /// Quiet, but generals get assigned and attacks are considered
    fn frontline_config() -> MatchConfig {
        let mut config = quiet_config();
        config.ai.assign_chance = 1.0;
        config.ai.attack_chance = 1.0;
        config
    }

    fn sandbox(config: MatchConfig) -> Sandbox {
        let graph = TerritoryGraph::build(&TerritoryDataset::grid(9, 6, 10.0)).expect("grid builds");
        let world = WorldState::initialize(&graph, &config).expect("world initializes");
        Sandbox {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            world,
            engine: DispatchEngine::new(),
            now: 0,
        }
    }

    fn id(sb: &Sandbox, code: &str) -> ProvinceId {
        sb.world.province_by_code(code).map(|p| p.id).expect("code exists")
    }

    fn chu_general_at(sb: &mut Sandbox, code: &str, garrison: f64) -> GeneralId {
        let at = id(sb, code);
        sb.world.set_garrison(at, garrison);
        let gid = sb.world.next_general_id();
        let stats = GeneralStats { command: 70, valor: 70, intellect: 70, politics: 70 };
        sb.world
            .insert_general(General::new(gid, CHU, "Jing She".into(), Tier::A, stats, 240, at));
        gid
    }

    fn director(sb: &Sandbox) -> AiDirector {
        AiDirector::from_config(&sb.config)
    }

    #[test]
    fn test_player_faction_is_never_driven() {
        let mut config = quiet_config();
        config.ai.hire_chance = 1.0;
        config.hiring.success_chance = 1.0;
        config.factions[0].starting_economy = 5000.0;
        config.factions[1].starting_economy = 5000.0;
        let mut sb = sandbox(config);
        let qin_before = sb.world.faction(QIN).cloned();

        let actions = director(&sb).run_tick(&mut sb, Some(QIN));
        assert_eq!(sb.world.faction(QIN).cloned(), qin_before);
        assert!(actions
            .iter()
            .any(|a| matches!(a, AiAction::Hired { faction, .. } if *faction == CHU)));
    }

    #[test]
    fn test_assignment_targets_share_of_station() {
        let mut sb = sandbox(frontline_config());
        let g = chu_general_at(&mut sb, "0505", 90.0);
        // Keep the attack step out of the way
        if let Some(f) = sb.world.faction_mut(CHU) {
            f.grain = 0;
        }

        director(&sb).run_tick(&mut sb, Some(QIN));
        // floor(90 * 0.38) = 34
        assert_eq!(sb.world.general(g).map(|g| g.assigned_troops()), Some(34));
    }

    #[test]
    fn test_assignment_never_lowers() {
        let mut sb = sandbox(frontline_config());
        let g = chu_general_at(&mut sb, "0505", 90.0);
        if let Some(general) = sb.world.general_mut(g) {
            general.assigned = 60;
        }
        if let Some(f) = sb.world.faction_mut(CHU) {
            f.grain = 0;
        }

        director(&sb).run_tick(&mut sb, Some(QIN));
        assert_eq!(sb.world.general(g).map(|g| g.assigned_troops()), Some(60));
    }

    #[test]
    fn test_launches_best_attack() {
        let mut sb = sandbox(frontline_config());
        let g = chu_general_at(&mut sb, "0405", 200.0);
        let from = id(&sb, "0405");

        let actions = director(&sb).run_tick(&mut sb, Some(QIN));
        let attack = actions.iter().find_map(|a| match a {
            AiAction::Attacked(order) => Some(*order),
            _ => None,
        });
        let order = attack.expect("an attack was launched");
        assert_eq!(order.general, g);
        assert_eq!(order.from, from);
        assert_eq!(order.troops, 76);
        assert_eq!(sb.world.province(from).map(|p| p.garrison()), Some(124.0));
        assert_eq!(sb.world.faction(CHU).map(|f| f.grain()), Some(224));
        assert!(!sb.world.general(g).map(|g| g.is_idle()).unwrap_or(true));
    }

    #[test]
    fn test_prefers_player_target() {
        let mut sb = sandbox(frontline_config());
        chu_general_at(&mut sb, "0405", 200.0);
        let human = id(&sb, "0305");
        sb.world.set_owner(human, Some(QIN));
        sb.world.set_garrison(human, 20.0);

        let actions = director(&sb).run_tick(&mut sb, Some(QIN));
        let target = actions.iter().find_map(|a| match a {
            AiAction::Attacked(order) => Some(order.to),
            _ => None,
        });
        // 76 - 20 + 25 beats 76 - 12 + 10
        assert_eq!(target, Some(human));
    }

    #[test]
    fn test_weak_attack_held_below_floor() {
        let mut sb = sandbox(frontline_config());
        chu_general_at(&mut sb, "0405", 100.0);

        let actions = director(&sb).run_tick(&mut sb, Some(QIN));
        // 38 - 12 + 10 = 36 < 45
        assert!(!actions.iter().any(|a| matches!(a, AiAction::Attacked(_))));
        assert_eq!(sb.engine.unit_count(), 0);
    }

    #[test]
    fn test_low_grain_triggers_purchase() {
        let mut config = quiet_config();
        config.ai.grain_buy_chance = 1.0;
        config.factions[1].starting_grain = 50;
        let mut sb = sandbox(config);

        let actions = director(&sb).run_tick(&mut sb, Some(QIN));
        assert!(actions.contains(&AiAction::BoughtGrain { faction: CHU, amount: 100 }));
        assert_eq!(sb.world.faction(CHU).map(|f| f.grain()), Some(150));
    }

    #[test]
    fn test_spare_economy_becomes_garrison() {
        let mut config = quiet_config();
        config.ai.garrison_convert_chance = 1.0;
        config.factions[1].starting_economy = 1000.0;
        let mut sb = sandbox(config);
        let capital = id(&sb, "0505");

        director(&sb).run_tick(&mut sb, Some(QIN));
        // 120 economy at 4 per troop
        assert_eq!(sb.world.province(capital).map(|p| p.garrison()), Some(120.0));
        assert_eq!(sb.world.faction(CHU).map(|f| f.economy()), Some(880.0));
    }

    #[test]
    fn test_landless_faction_is_skipped() {
        let mut config = quiet_config();
        config.ai.grain_buy_chance = 1.0;
        config.factions[1].starting_grain = 0;
        let mut sb = sandbox(config);
        let owned: Vec<_> = sb.world.owned_provinces(CHU).map(|p| p.id).collect();
        for p in owned {
            sb.world.set_owner(p, Some(QIN));
        }

        let actions = director(&sb).run_tick(&mut sb, Some(QIN));
        assert!(actions.is_empty());
    }

    #[test]
    fn test_closed_attack_gate_holds_fire() {
        for seed in 0..20 {
            let mut config = frontline_config();
            config.seed = seed;
            config.ai.attack_chance = 0.0;
            let mut sb = sandbox(config);
            let g = chu_general_at(&mut sb, "0405", 200.0);

            let actions = director(&sb).run_tick(&mut sb, Some(QIN));
            // Assignment still ran, the attack that would score 74 did not
            assert!(actions.contains(&AiAction::Assigned { general: g, troops: 76 }));
            assert!(!actions.iter().any(|a| matches!(a, AiAction::Attacked(_))));
            assert_eq!(sb.engine.unit_count(), 0);
        }
    }

    #[test]
    fn test_failed_command_does_not_end_tick() {
        let mut config = frontline_config();
        config.ai.garrison_convert_chance = 1.0;
        config.ai.attack_chance = 0.0;
        config.factions[1].starting_economy = 1000.0;
        let mut sb = sandbox(config);
        // Losing the capital makes recruiting fail with NotOwned
        let capital = id(&sb, "0505");
        sb.world.set_owner(capital, Some(QIN));
        let g = chu_general_at(&mut sb, "0405", 90.0);

        let actions = director(&sb).run_tick(&mut sb, Some(QIN));
        assert!(!actions.iter().any(|a| matches!(a, AiAction::Recruited { .. })));
        assert_eq!(sb.world.faction(CHU).map(|f| f.economy()), Some(1000.0));
        // The later assignment step still ran
        assert_eq!(actions, vec![AiAction::Assigned { general: g, troops: 34 }]);
        assert_eq!(sb.world.general(g).map(|g| g.assigned_troops()), Some(34));
    }
}
