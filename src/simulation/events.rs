//! Match event log

use serde::{Deserialize, Serialize};

use crate::core::types::{FactionId, GeneralId, GroupId, Millis, ProvinceId};
use crate::generals::Tier;
use crate::simulation::outcome::MatchResult;

/// Something the presentation layer may want to show
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MatchEvent {
    // Roster
    GeneralHired { faction: FactionId, general: GeneralId, name: String, tier: Tier },
    HireDeclined { faction: FactionId, refund: f64 },
    /// `station` is `None` when the faction had nowhere left to send it
    GeneralReturned { faction: FactionId, general: GeneralId, station: Option<ProvinceId> },

    // Armies
    AttackIssued {
        faction: FactionId,
        general: GeneralId,
        from: ProvinceId,
        to: ProvinceId,
        troops: u32,
        group: GroupId,
    },
    GroupsCollided { first: GroupId, first_faction: FactionId, second: GroupId, second_faction: FactionId },

    // Territory
    ProvinceCaptured { province: ProvinceId, attacker: FactionId, previous: Option<FactionId> },
    FactionDefeated { faction: FactionId },
    MatchEnded { result: MatchResult, winner: Option<FactionId> },
}

impl MatchEvent {
    /// Factions the event concerns
    pub fn involves(&self, faction: FactionId) -> bool {
        match self {
            MatchEvent::GeneralHired { faction: f, .. }
            | MatchEvent::HireDeclined { faction: f, .. }
            | MatchEvent::GeneralReturned { faction: f, .. }
            | MatchEvent::AttackIssued { faction: f, .. }
            | MatchEvent::FactionDefeated { faction: f } => *f == faction,
            MatchEvent::GroupsCollided { first_faction, second_faction, .. } => {
                *first_faction == faction || *second_faction == faction
            }
            MatchEvent::ProvinceCaptured { attacker, previous, .. } => {
                *attacker == faction || *previous == Some(faction)
            }
            MatchEvent::MatchEnded { winner, .. } => *winner == Some(faction),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub id: u32,
    pub at: Millis,
    pub event: MatchEvent,
}

/// Events not yet drained by the presentation layer
///
/// The log is unbounded. A long-running caller must `drain` it regularly,
/// the way `conquest_sim` does once per simulated minute.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<TimedEvent>,
    next_event_id: u32,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, at: Millis, event: MatchEvent) -> u32 {
        let id = self.next_event_id;
        self.next_event_id += 1;
        self.events.push(TimedEvent { id, at, event });
        id
    }

    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    pub fn events_for_faction(&self, faction: FactionId) -> impl Iterator<Item = &TimedEvent> {
        self.events.iter().filter(move |e| e.event.involves(faction))
    }

    /// Hand over every buffered event; ids keep counting
    pub fn drain(&mut self) -> Vec<TimedEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
