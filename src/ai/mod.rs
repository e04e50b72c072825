//! Autonomous opponents
//!
//! Architecture: Trait + Data hybrid
//! - FactionCommands is the command surface shared with the human player
//! - AiTuning holds the TOML-loaded heuristic constants
//! - AiDirector runs the periodic per-faction decision loop

mod director;

pub use director::{AiAction, AiDirector};

use rand::RngCore;

use crate::core::error::CommandError;
use crate::core::types::{FactionId, GeneralId, ProvinceId};
use crate::dispatch::{AttackOrder, IssuedAttack};
use crate::generals::HireOutcome;
use crate::world::WorldState;

/// Commands a faction controller may issue
///
/// Every call is validated exactly as it would be for the human player.
pub trait FactionCommands {
    fn world(&self) -> &WorldState;

    /// Match RNG used for the controller's chance gates
    fn rng(&mut self) -> &mut dyn RngCore;

    fn hire_general(&mut self, faction: FactionId) -> Result<HireOutcome, CommandError>;

    fn assign_troops(&mut self, general: GeneralId, amount: u32) -> Result<u32, CommandError>;

    fn issue_attack(&mut self, order: AttackOrder) -> Result<IssuedAttack, CommandError>;

    fn buy_grain(&mut self, faction: FactionId, amount: u32) -> Result<u32, CommandError>;

    fn recruit_garrison(&mut self, faction: FactionId, amount: u32) -> Result<ProvinceId, CommandError>;
}
