//! Units in transit and the groups one order creates

use serde::{Deserialize, Serialize};

use crate::core::types::{DispatchId, FactionId, GeneralId, GroupId, Millis, ProvinceId, Vec2};
use crate::dispatch::lane::{position_at, LaneParams};

/// Lifecycle of a single unit
///
/// A collision drops the whole group from the engine, so cancelled units
/// are never observed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchState {
    /// Created, not yet left the origin
    Pending,
    InFlight,
    /// Due for resolution at the destination
    Arrived,
}

/// One unit traveling between adjacent provinces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispatch {
    pub id: DispatchId,
    pub group: GroupId,
    pub faction: FactionId,
    pub general: Option<GeneralId>,
    pub from: ProvinceId,
    pub to: ProvinceId,
    pub origin: Vec2,
    pub target: Vec2,
    pub spawn: Millis,
    pub travel_duration_ms: Millis,
    pub lane: LaneParams,
}

impl Dispatch {
    pub fn arrival(&self) -> Millis {
        self.spawn + self.travel_duration_ms
    }

    /// State of a unit that is still tracked by the engine
    pub fn state(&self, now: Millis) -> DispatchState {
        if now < self.spawn {
            DispatchState::Pending
        } else if now < self.arrival() {
            DispatchState::InFlight
        } else {
            DispatchState::Arrived
        }
    }

    pub fn is_in_flight(&self, now: Millis) -> bool {
        self.state(now) == DispatchState::InFlight
    }

    pub fn position(&self, now: Millis) -> Vec2 {
        position_at(self.origin, self.target, self.spawn, self.travel_duration_ms, now, &self.lane)
    }
}

/// Units created together by one attack order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchGroup {
    pub id: GroupId,
    pub faction: FactionId,
    pub general: Option<GeneralId>,
    pub from: ProvinceId,
    pub to: ProvinceId,
    pub issued_at: Millis,
    /// Unresolved units, ordered by spawn time
    pub units: Vec<Dispatch>,
}

impl DispatchGroup {
    /// Earliest-spawned unit currently in flight
    pub fn representative(&self, now: Millis) -> Option<&Dispatch> {
        self.units.iter().find(|u| u.is_in_flight(now))
    }

    pub fn is_in_flight(&self, now: Millis) -> bool {
        self.representative(now).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(id: u32, spawn: Millis) -> Dispatch {
        Dispatch {
            id: DispatchId(id),
            group: GroupId(0),
            faction: FactionId(0),
            general: None,
            from: ProvinceId(0),
            to: ProvinceId(1),
            origin: Vec2::new(0.0, 0.0),
            target: Vec2::new(10.0, 0.0),
            spawn,
            travel_duration_ms: 1000,
            lane: LaneParams::default(),
        }
    }

    #[test]
    fn test_state_transitions() {
        let u = unit(0, 100);
        assert_eq!(u.state(50), DispatchState::Pending);
        assert_eq!(u.state(100), DispatchState::InFlight);
        assert_eq!(u.state(1099), DispatchState::InFlight);
        assert_eq!(u.state(1100), DispatchState::Arrived);
    }

    #[test]
    fn test_representative_skips_landed_and_pending() {
        let group = DispatchGroup {
            id: GroupId(0),
            faction: FactionId(0),
            general: None,
            from: ProvinceId(0),
            to: ProvinceId(1),
            issued_at: 0,
            units: vec![unit(0, 0), unit(1, 500), unit(2, 5000)],
        };
        // Unit 0 is due, unit 1 flying, unit 2 not spawned
        assert_eq!(group.representative(1200).map(|u| u.id), Some(DispatchId(1)));
        assert!(group.representative(1600).is_none());
        assert!(!group.is_in_flight(4000));
    }
}
