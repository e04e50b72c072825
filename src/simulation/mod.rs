//! Match orchestration: clock, scheduled tasks, commands and queries

pub mod events;
pub mod game;
pub mod outcome;
pub mod snapshot;

pub use events::{EventLog, MatchEvent, TimedEvent};
pub use game::Match;
pub use outcome::{FactionStanding, MatchResult};
pub use snapshot::{DispatchView, FactionSnapshot, GeneralView, ProvinceView};
