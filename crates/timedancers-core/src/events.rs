use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{PhaseKey, TimerStatus};

/// Every state change in a session produces an Event.
/// The CLI prints them; the controller returns them from each operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        phase_count: usize,
        total_ms: u64,
        at: DateTime<Utc>,
    },
    SessionPaused {
        total_remaining_ms: u64,
        at: DateTime<Utc>,
    },
    SessionResumed {
        /// Length of the pause that just ended.
        paused_ms: u64,
        total_remaining_ms: u64,
        at: DateTime<Utc>,
    },
    SessionReset {
        at: DateTime<Utc>,
    },
    PhasesConfigured {
        seconds: Vec<u64>,
        at: DateTime<Utc>,
    },
    PhaseChanged {
        from_index: usize,
        to_index: usize,
        phase: Option<PhaseKey>,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        status: TimerStatus,
        current_index: usize,
        current_key: Option<PhaseKey>,
        phase_remaining_ms: u64,
        total_remaining_ms: u64,
        total_ms: u64,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::to_utc;

    #[test]
    fn events_are_tagged_by_type() {
        let event = Event::PhaseChanged {
            from_index: 0,
            to_index: 1,
            phase: Some(PhaseKey::Heart),
            at: to_utc(0),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "phase_changed");
        assert_eq!(json["phase"], "heart");
    }
}
