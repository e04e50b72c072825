//! Army dispatch: units in transit, collisions, arrival resolution

pub mod engine;
pub mod lane;
pub mod resolution;
pub mod unit;

pub use engine::{release_general, ArrivalReport, AttackOrder, Collision, DispatchEngine, IssuedAttack};
pub use lane::{position_at, LaneParams};
pub use resolution::{resolve_arrival, ArrivalOutcome};
pub use unit::{Dispatch, DispatchGroup, DispatchState};
