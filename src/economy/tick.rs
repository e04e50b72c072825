//! Periodic passive income

use crate::core::config::NeutralTuning;
use crate::core::types::Millis;
use crate::world::WorldState;

/// Credit every faction its income for one period, then regenerate neutrals
pub fn economy_tick(world: &mut WorldState, period_ms: Millis, neutral: &NeutralTuning) {
    let dt_secs = period_ms as f64 / 1000.0;

    let incomes: Vec<_> = world
        .faction_ids()
        .map(|id| (id, world.economy_rate(id) * dt_secs))
        .collect();
    for (id, income) in incomes {
        if income > 0.0 {
            if let Some(faction) = world.faction_mut(id) {
                faction.credit(income);
            }
        }
    }

    world.regenerate_neutral(dt_secs, neutral.recover_rate);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::MatchConfig;
    use crate::core::types::FactionId;
    use crate::territory::{TerritoryDataset, TerritoryGraph};

    fn world() -> WorldState {
        let config = MatchConfig::default();
        let graph = TerritoryGraph::build(&TerritoryDataset::grid(9, 6, 10.0)).expect("grid builds");
        WorldState::initialize(&graph, &config).expect("world initializes")
    }

    #[test]
    fn test_income_proportional_to_area() {
        let mut world = world();
        let qin = FactionId(0);
        // Four 10x10 cells at 0.02 per unit area
        assert!((world.economy_rate(qin) - 8.0).abs() < 1e-9);

        let before = world.faction(qin).map(|f| f.economy()).unwrap_or(0.0);
        economy_tick(&mut world, 200, &NeutralTuning::default());
        let after = world.faction(qin).map(|f| f.economy()).unwrap_or(0.0);
        assert!((after - before - 1.6).abs() < 1e-9);
    }

    #[test]
    fn test_tick_regenerates_neutrals() {
        let mut world = world();
        let neutral = world.province_by_code("0000").map(|p| p.id).expect("exists");
        world.set_garrison(neutral, 0.0);

        economy_tick(&mut world, 1000, &NeutralTuning::default());
        assert_eq!(world.province(neutral).map(|p| p.garrison()), Some(0.4));
    }

    #[test]
    fn test_landless_faction_earns_nothing() {
        let mut world = world();
        let yan = FactionId(3);
        let owned: Vec<_> = world.owned_provinces(yan).map(|p| p.id).collect();
        for id in owned {
            world.set_owner(id, None);
        }
        let before = world.faction(yan).map(|f| f.economy());
        economy_tick(&mut world, 200, &NeutralTuning::default());
        assert_eq!(world.faction(yan).map(|f| f.economy()), before);
    }
}
