//! General roster and hiring
//!
//! Generals are drawn once from a faction-specific name pool, carry a tier
//! fixed at hire, and cycle between Idle at a station and Marching.

pub mod general;
pub mod hiring;
pub mod pool;

pub use general::{General, GeneralStats, GeneralStatus, Tier, TierTable};
pub use hiring::{assign_troops, hire_general, HireOutcome};
pub use pool::draw_name;
