//! Converting economy into grain or capital garrison

use crate::core::error::CommandError;
use crate::core::types::{FactionId, ProvinceId};
use crate::world::WorldState;

fn charge(world: &WorldState, faction: FactionId, amount: u32, price: f64) -> Result<f64, CommandError> {
    let state = world.faction(faction).ok_or(CommandError::UnknownFaction(faction))?;
    if amount == 0 {
        return Err(CommandError::InvalidAmount);
    }
    let cost = amount as f64 * price;
    if state.economy() < cost {
        return Err(CommandError::InsufficientFunds {
            needed: cost.ceil() as u64,
            available: state.economy().floor() as u64,
        });
    }
    Ok(cost)
}

/// Buy grain at a fixed price; returns the new grain stock
pub fn buy_grain(world: &mut WorldState, faction: FactionId, amount: u32, price: f64) -> Result<u32, CommandError> {
    let cost = charge(world, faction, amount, price)?;
    let state = world
        .faction_mut(faction)
        .ok_or(CommandError::UnknownFaction(faction))?;
    state.debit(cost);
    state.grain = state.grain.saturating_add(amount);
    Ok(state.grain)
}

/// Raise troops at the capital; returns the capital's id
pub fn recruit_garrison(
    world: &mut WorldState,
    faction: FactionId,
    amount: u32,
    price: f64,
) -> Result<ProvinceId, CommandError> {
    let capital = world
        .faction(faction)
        .map(|f| f.profile.capital)
        .ok_or(CommandError::UnknownFaction(faction))?;
    if !world.province(capital).is_some_and(|p| p.is_owned_by(faction)) {
        return Err(CommandError::NotOwned { faction, province: capital });
    }
    let cost = charge(world, faction, amount, price)?;

    if let Some(state) = world.faction_mut(faction) {
        state.debit(cost);
    }
    world.add_garrison(capital, amount as f64);
    Ok(capital)
}
