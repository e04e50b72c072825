//! Warring States - real-time territory conquest on a province graph
//!
//! Factions expand across provinces derived from boundary geometry, hiring
//! generals, spending grain to dispatch armies, and resolving captures unit
//! by unit. One `Match` owns the whole state and is advanced by its caller.

pub mod ai;
pub mod core;
pub mod dispatch;
pub mod economy;
pub mod generals;
pub mod scheduler;
pub mod simulation;
pub mod territory;
pub mod world;

pub use crate::core::{ConquestError, MatchConfig};
pub use crate::simulation::{Match, MatchEvent, MatchResult};
