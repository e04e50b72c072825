//! Arrival resolution: reinforcement, attrition, or capture

use serde::{Deserialize, Serialize};

use crate::core::types::{FactionId, ProvinceId};
use crate::world::WorldState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrivalOutcome {
    /// Destination already belonged to the attacker
    Reinforced,
    /// Defender lost one troop
    Attrited,
    /// Ownership flipped to the attacker
    Captured { previous: Option<FactionId> },
}

/// Apply one arriving unit to its destination
pub fn resolve_arrival(world: &mut WorldState, attacker: FactionId, province: ProvinceId) -> Option<ArrivalOutcome> {
    let target = world.province(province)?;

    if target.is_owned_by(attacker) {
        world.add_garrison(province, 1.0);
        return Some(ArrivalOutcome::Reinforced);
    }

    if target.garrison() > 1.0 {
        world.add_garrison(province, -1.0);
        return Some(ArrivalOutcome::Attrited);
    }

    let previous = world.set_owner(province, Some(attacker));
    world.set_garrison(province, 1.0);
    Some(ArrivalOutcome::Captured { previous })
}
