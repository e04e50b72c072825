//! Win/loss evaluation from province counts

use serde::{Deserialize, Serialize};

use crate::core::types::FactionId;
use crate::world::WorldState;

/// Match state from the human player's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchResult {
    #[default]
    Playing,
    Victory,
    Defeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactionStanding {
    Playing,
    /// Holds no provinces
    Defeated,
    /// Holds every province
    Winner,
}

pub fn standing(world: &WorldState, faction: FactionId) -> FactionStanding {
    match world.province_count(faction) {
        0 => FactionStanding::Defeated,
        n if n == world.provinces().len() => FactionStanding::Winner,
        _ => FactionStanding::Playing,
    }
}

/// Result for the player; without a player the match stays Playing
pub fn evaluate(world: &WorldState, player: Option<FactionId>) -> MatchResult {
    match player.map(|p| standing(world, p)) {
        Some(FactionStanding::Winner) => MatchResult::Victory,
        Some(FactionStanding::Defeated) => MatchResult::Defeat,
        _ => MatchResult::Playing,
    }
}

/// The faction holding every province, if any
pub fn winner(world: &WorldState) -> Option<FactionId> {
    world
        .faction_ids()
        .find(|&f| standing(world, f) == FactionStanding::Winner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::MatchConfig;
    use crate::territory::{TerritoryDataset, TerritoryGraph};

    fn world() -> WorldState {
        let config = MatchConfig::from_toml_str(
            r##"
            player = "Qin"

            [[factions]]
            name = "Qin"
            color = "#000000"
            capital = "0000"
            territory = ["0000"]

            [[factions]]
            name = "Zhao"
            color = "#ffffff"
            capital = "0001"
            territory = ["0001"]
            "##,
        )
        .expect("config parses");
        let graph = TerritoryGraph::build(&TerritoryDataset::grid(2, 1, 10.0)).expect("grid builds");
        WorldState::initialize(&graph, &config).expect("world initializes")
    }

    const QIN: FactionId = FactionId(0);
    const ZHAO: FactionId = FactionId(1);

    #[test]
    fn test_contested_map_is_playing() {
        let world = world();
        assert_eq!(evaluate(&world, Some(QIN)), MatchResult::Playing);
        assert_eq!(winner(&world), None);
    }

    #[test]
    fn test_taking_everything_wins() {
        let mut world = world();
        world.set_owner(world.province_by_code("0001").map(|p| p.id).expect("exists"), Some(QIN));
        assert_eq!(evaluate(&world, Some(QIN)), MatchResult::Victory);
        assert_eq!(standing(&world, ZHAO), FactionStanding::Defeated);
        assert_eq!(winner(&world), Some(QIN));
    }

    #[test]
    fn test_losing_everything_is_defeat() {
        let mut world = world();
        world.set_owner(world.province_by_code("0000").map(|p| p.id).expect("exists"), Some(ZHAO));
        assert_eq!(evaluate(&world, Some(QIN)), MatchResult::Defeat);
        assert_eq!(evaluate(&world, None), MatchResult::Playing);
    }
}
