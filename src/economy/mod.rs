//! Faction economy: passive income and market purchases

pub mod market;
pub mod tick;

pub use market::{buy_grain, recruit_garrison};
pub use tick::economy_tick;
