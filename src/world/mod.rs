//! World state: provinces, factions and their generals
//!
//! One `WorldState` value is threaded through every operation and rebuilt
//! from the match config on reset.

pub mod faction;
pub mod province;
pub mod state;

pub use faction::{Faction, FactionProfile};
pub use province::Province;
pub use state::WorldState;
