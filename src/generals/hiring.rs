//! Hiring generals and assigning them troops
//!
//! Both operations are parameterized by faction; the per-faction name pool
//! and treasury live in `WorldState`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::HiringTuning;
use crate::core::error::CommandError;
use crate::core::types::{FactionId, GeneralId};
use crate::generals::general::{General, GeneralStats};
use crate::generals::pool::draw_name;
use crate::world::WorldState;

/// Result of a paid hire attempt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HireOutcome {
    Hired(GeneralId),
    /// The candidate declined; part of the cost came back
    Declined { refund: f64 },
}

/// Hire a general for a faction
///
/// Draws an unhired name weighted by tier, then rolls for success. The cost
/// is always paid; a failed roll refunds part of it.
pub fn hire_general<R: Rng + ?Sized>(
    world: &mut WorldState,
    faction: FactionId,
    tuning: &HiringTuning,
    rng: &mut R,
) -> Result<HireOutcome, CommandError> {
    let state = world.faction(faction).ok_or(CommandError::UnknownFaction(faction))?;

    if state.economy() < tuning.hire_cost {
        return Err(CommandError::InsufficientFunds {
            needed: tuning.hire_cost.ceil() as u64,
            available: state.economy().floor() as u64,
        });
    }
    if state.pool_exhausted() {
        return Err(CommandError::PoolExhausted);
    }
    let station = world
        .home_province(faction)
        .ok_or(CommandError::FactionDefeated(faction))?;

    let entry = draw_name(&state.profile.name_pool, state.hired_names(), &tuning.tier_weights, rng)
        .ok_or(CommandError::PoolExhausted)?
        .clone();
    let success = rng.gen_bool(tuning.success_chance.clamp(0.0, 1.0));

    if !success {
        let refund = tuning.hire_cost * tuning.refund_fraction;
        if let Some(state) = world.faction_mut(faction) {
            state.debit(tuning.hire_cost);
            state.credit(refund);
        }
        tracing::debug!("{} failed to recruit {} ({:?}), refunded {:.0}", faction, entry.name, entry.tier, refund);
        return Ok(HireOutcome::Declined { refund });
    }

    let stats = GeneralStats::roll(entry.tier, rng);
    let id = world.next_general_id();
    let general = General::new(
        id,
        faction,
        entry.name.clone(),
        entry.tier,
        stats,
        tuning.troop_caps.get(entry.tier),
        station,
    );
    if let Some(state) = world.faction_mut(faction) {
        state.debit(tuning.hire_cost);
    }
    world.insert_general(general);

    tracing::debug!("{} hired {} ({:?}) at {}", faction, entry.name, entry.tier, station);
    Ok(HireOutcome::Hired(id))
}

/// Set how many of its station's troops an Idle general may lead out
///
/// The request is clamped to the troop cap and to what the station's
/// garrison has left after other Idle generals' claims. Returns the amount
/// actually assigned.
pub fn assign_troops(world: &mut WorldState, general: GeneralId, amount: u32) -> Result<u32, CommandError> {
    let g = world.general(general).ok_or(CommandError::UnknownGeneral(general))?;
    let station = g.station().ok_or(CommandError::GeneralNotIdle(general))?;
    let garrison = world
        .province(station)
        .map(|p| p.displayed_garrison())
        .ok_or(CommandError::UnknownProvince(station))?;

    let available = garrison.saturating_sub(world.claimed_at(station, Some(general)));
    let assigned = amount.min(g.troop_cap).min(available);

    if let Some(g) = world.general_mut(general) {
        g.assigned = assigned;
    }
    Ok(assigned)
}
