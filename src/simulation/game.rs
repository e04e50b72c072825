//! Match - one running conquest game
//!
//! Owns the world, the dispatch engine, the scheduler and the RNG. All
//! mutation happens on the caller's thread when it advances the clock or
//! issues a command.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::ai::{AiDirector, FactionCommands};
use crate::core::config::MatchConfig;
use crate::core::error::{CommandError, Result};
use crate::core::types::{FactionId, GeneralId, Millis, ProvinceId};
use crate::dispatch::{self, ArrivalOutcome, AttackOrder, DispatchEngine, IssuedAttack};
use crate::economy;
use crate::generals::{self, HireOutcome};
use crate::scheduler::{Scheduler, TaskKind};
use crate::simulation::events::{EventLog, MatchEvent, TimedEvent};
use crate::simulation::outcome::{self, FactionStanding, MatchResult};
use crate::simulation::snapshot::{DispatchView, FactionSnapshot, ProvinceView};
use crate::territory::{TerritoryDataset, TerritoryGraph};
use crate::world::WorldState;

pub struct Match {
    config: MatchConfig,
    graph: TerritoryGraph,
    initial: WorldState,
    world: WorldState,
    engine: DispatchEngine,
    scheduler: Scheduler,
    rng: ChaCha8Rng,
    events: EventLog,
    now: Millis,
    player: Option<FactionId>,
    defeated: Vec<bool>,
    result: MatchResult,
    ended: bool,
}

impl Match {
    /// Build the territory graph from boundary geometry and start a match
    pub fn new(config: MatchConfig, dataset: &TerritoryDataset) -> Result<Self> {
        let graph = TerritoryGraph::build(dataset)?;
        Self::with_graph(config, graph)
    }

    /// Start a match on the procedural grid described by `config.map`
    pub fn with_default_map(config: MatchConfig) -> Result<Self> {
        let dataset = TerritoryDataset::grid(config.map.cols, config.map.rows, config.map.cell);
        Self::new(config, &dataset)
    }

    pub fn with_graph(config: MatchConfig, graph: TerritoryGraph) -> Result<Self> {
        config.validate()?;
        let world = WorldState::initialize(&graph, &config)?;
        let player = config.player_faction();

        let mut game = Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            defeated: vec![false; config.factions.len()],
            initial: world.clone(),
            world,
            graph,
            engine: DispatchEngine::new(),
            scheduler: Scheduler::new(),
            events: EventLog::new(),
            now: 0,
            player,
            result: MatchResult::Playing,
            ended: false,
            config,
        };
        game.arm_periodic();
        tracing::info!(
            "Match started: {} provinces, {} factions, seed {}",
            game.world.provinces().len(),
            game.world.factions().len(),
            game.config.seed
        );
        Ok(game)
    }

    fn arm_periodic(&mut self) {
        self.scheduler
            .schedule(self.now + self.config.economy.tick_period_ms, TaskKind::EconomyTick);
        if self.config.ai.enabled {
            self.scheduler
                .schedule(self.now + self.config.ai.tick_period_ms, TaskKind::AiTick);
        }
    }

    // === CLOCK ===

    /// Advance match time to `now`
    ///
    /// Due tasks run in time order. Before each task, and once more at
    /// `now`, a frame resolves collisions and then arrivals. Time never
    /// moves backwards.
    pub fn advance_to(&mut self, now: Millis) {
        if now < self.now {
            return;
        }
        while let Some(task) = self.scheduler.pop_due(now) {
            let at = task.due.max(self.now);
            self.now = at;
            self.frame(at);
            self.run_task(task.due, task.kind);
            self.evaluate();
        }
        self.now = now;
        self.frame(now);
        self.evaluate();
    }

    /// Advance in fixed frames, like a display loop would
    pub fn run_for(&mut self, duration: Millis, frame_ms: Millis) {
        let end = self.now + duration;
        let step = frame_ms.max(1);
        while self.now < end {
            let next = (self.now + step).min(end);
            self.advance_to(next);
        }
    }

    fn frame(&mut self, at: Millis) {
        let collisions = self
            .engine
            .detect_collisions(at, self.config.dispatch.capture_distance);
        for c in collisions {
            self.events.push(
                at,
                MatchEvent::GroupsCollided {
                    first: c.first,
                    first_faction: c.first_faction,
                    second: c.second,
                    second_faction: c.second_faction,
                },
            );
        }

        for report in self.engine.resolve_arrivals(&mut self.world, at) {
            if let ArrivalOutcome::Captured { previous } = report.outcome {
                tracing::info!("{} captured {} at {}ms", report.faction, report.province, report.arrived_at);
                self.events.push(
                    report.arrived_at,
                    MatchEvent::ProvinceCaptured {
                        province: report.province,
                        attacker: report.faction,
                        previous,
                    },
                );
            }
        }
    }

    fn run_task(&mut self, due: Millis, kind: TaskKind) {
        match kind {
            TaskKind::EconomyTick => {
                let period = self.config.economy.tick_period_ms;
                economy::economy_tick(&mut self.world, period, &self.config.neutral);
                self.scheduler.schedule(due + period, TaskKind::EconomyTick);
            }
            TaskKind::AiTick => {
                let director = AiDirector::from_config(&self.config);
                let player = self.player;
                let actions = director.run_tick(self, player);
                tracing::debug!("AI tick at {}ms: {} actions", due, actions.len());
                self.scheduler
                    .schedule(due + self.config.ai.tick_period_ms, TaskKind::AiTick);
            }
            TaskKind::ReleaseGeneral { general, faction, from, to } => {
                let station = dispatch::release_general(&mut self.world, general, from, to);
                self.events
                    .push(due, MatchEvent::GeneralReturned { faction, general, station });
            }
        }
    }

    fn evaluate(&mut self) {
        for faction in self.world.faction_ids().collect::<Vec<_>>() {
            let lost = self.world.province_count(faction) == 0;
            let Some(flag) = self.defeated.get_mut(faction.index()) else {
                continue;
            };
            if lost && !*flag {
                *flag = true;
                tracing::info!("{} has been defeated", faction);
                self.events.push(self.now, MatchEvent::FactionDefeated { faction });
            }
        }

        self.result = outcome::evaluate(&self.world, self.player);
        let winner = outcome::winner(&self.world);
        if !self.ended && (self.result != MatchResult::Playing || winner.is_some()) {
            self.ended = true;
            tracing::info!("Match ended at {}ms: {:?}, winner {:?}", self.now, self.result, winner);
            self.events
                .push(self.now, MatchEvent::MatchEnded { result: self.result, winner });
        }
    }

    /// Return to the initial state, cancelling everything pending
    pub fn reset_match(&mut self) {
        self.scheduler.clear();
        self.engine.clear();
        self.events = EventLog::new();
        self.world = self.initial.clone();
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.now = 0;
        self.defeated = vec![false; self.config.factions.len()];
        self.result = MatchResult::Playing;
        self.ended = false;
        self.arm_periodic();
        tracing::info!("Match reset");
    }

    // === COMMANDS ===

    pub fn hire_general(&mut self, faction: FactionId) -> std::result::Result<HireOutcome, CommandError> {
        let outcome = generals::hire_general(&mut self.world, faction, &self.config.hiring, &mut self.rng)?;
        let event = match outcome {
            HireOutcome::Hired(general) => {
                let Some(g) = self.world.general(general) else {
                    return Ok(outcome);
                };
                MatchEvent::GeneralHired { faction, general, name: g.name.clone(), tier: g.tier }
            }
            HireOutcome::Declined { refund } => MatchEvent::HireDeclined { faction, refund },
        };
        self.events.push(self.now, event);
        Ok(outcome)
    }

    pub fn assign_troops(&mut self, general: GeneralId, amount: u32) -> std::result::Result<u32, CommandError> {
        generals::assign_troops(&mut self.world, general, amount)
    }

    /// Launch an attack now and schedule its general's release
    pub fn issue_attack(&mut self, order: AttackOrder) -> std::result::Result<IssuedAttack, CommandError> {
        let issued = self
            .engine
            .issue_attack(&mut self.world, &order, self.now, &self.config.dispatch, &mut self.rng)?;
        self.scheduler.schedule(
            issued.release_at,
            TaskKind::ReleaseGeneral {
                general: order.general,
                faction: order.faction,
                from: order.from,
                to: order.to,
            },
        );
        self.events.push(
            self.now,
            MatchEvent::AttackIssued {
                faction: order.faction,
                general: order.general,
                from: order.from,
                to: order.to,
                troops: order.troops,
                group: issued.group,
            },
        );
        Ok(issued)
    }

    pub fn buy_grain(&mut self, faction: FactionId, amount: u32) -> std::result::Result<u32, CommandError> {
        economy::buy_grain(&mut self.world, faction, amount, self.config.economy.grain_price)
    }

    pub fn recruit_garrison(&mut self, faction: FactionId, amount: u32) -> std::result::Result<ProvinceId, CommandError> {
        economy::recruit_garrison(&mut self.world, faction, amount, self.config.economy.garrison_price)
    }

    // === QUERIES ===

    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn graph(&self) -> &TerritoryGraph {
        &self.graph
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn player(&self) -> Option<FactionId> {
        self.player
    }

    pub fn provinces(&self) -> Vec<ProvinceView> {
        self.world.provinces().iter().map(ProvinceView::from).collect()
    }

    pub fn faction_snapshot(&self, faction: FactionId) -> Option<FactionSnapshot> {
        FactionSnapshot::capture(&self.world, faction)
    }

    pub fn faction_snapshots(&self) -> Vec<FactionSnapshot> {
        self.world
            .faction_ids()
            .filter_map(|f| FactionSnapshot::capture(&self.world, f))
            .collect()
    }

    /// Units currently between provinces, positioned at the match clock
    pub fn in_flight(&self) -> Vec<DispatchView> {
        self.engine
            .in_flight(self.now)
            .map(|u| DispatchView::at(u, self.now))
            .collect()
    }

    pub fn result(&self) -> MatchResult {
        self.result
    }

    pub fn winner(&self) -> Option<FactionId> {
        outcome::winner(&self.world)
    }

    pub fn standing(&self, faction: FactionId) -> FactionStanding {
        outcome::standing(&self.world, faction)
    }

    /// One-shot general releases still waiting to fire
    pub fn pending_callbacks(&self) -> usize {
        self.scheduler.pending_callbacks()
    }

    /// Units issued but not yet resolved or cancelled
    pub fn unresolved_units(&self) -> usize {
        self.engine.unit_count()
    }

    pub fn events(&self) -> &[TimedEvent] {
        self.events.events()
    }

    /// Take every buffered event; callers must drain or the log keeps growing
    pub fn drain_events(&mut self) -> Vec<TimedEvent> {
        self.events.drain()
    }
}

impl FactionCommands for Match {
    fn world(&self) -> &WorldState {
        &self.world
    }

    fn rng(&mut self) -> &mut dyn RngCore {
        &mut self.rng
    }

    fn hire_general(&mut self, faction: FactionId) -> std::result::Result<HireOutcome, CommandError> {
        Match::hire_general(self, faction)
    }

    fn assign_troops(&mut self, general: GeneralId, amount: u32) -> std::result::Result<u32, CommandError> {
        Match::assign_troops(self, general, amount)
    }

    fn issue_attack(&mut self, order: AttackOrder) -> std::result::Result<IssuedAttack, CommandError> {
        Match::issue_attack(self, order)
    }

    fn buy_grain(&mut self, faction: FactionId, amount: u32) -> std::result::Result<u32, CommandError> {
        Match::buy_grain(self, faction, amount)
    }

    fn recruit_garrison(&mut self, faction: FactionId, amount: u32) -> std::result::Result<ProvinceId, CommandError> {
        Match::recruit_garrison(self, faction, amount)
    }
}
