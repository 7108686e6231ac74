//! Change detection for the polling loop.
//!
//! The UI polls [`TimerState::compute_now`](super::TimerState::compute_now)
//! several times a second but only needs to redraw when the displayed
//! second, the phase, or the done flag changes. [`TickWatcher`] tracks that
//! triple and reports the edges that drive in-app alerts.

use super::display::get_remaining_seconds;
use super::engine::Progress;

/// What changed between two observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Same phase, different displayed second.
    Second { remaining_secs: u64 },
    /// The session moved into another phase.
    PhaseChanged { from: usize, to: usize },
    /// The session reached its end.
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Seen {
    index: usize,
    seconds: u64,
    done: bool,
}

impl Seen {
    fn of(progress: &Progress) -> Self {
        Self {
            index: progress.current_index,
            seconds: get_remaining_seconds(progress.phase_remaining_ms),
            done: progress.done,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TickWatcher {
    last: Option<Seen>,
}

impl TickWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `progress` as already displayed without reporting an edge.
    ///
    /// Call after every command so a user action is never mistaken for a
    /// transition.
    pub fn prime(&mut self, progress: &Progress) {
        self.last = Some(Seen::of(progress));
    }

    /// Compare against the previous observation. `None` means nothing
    /// display-relevant changed.
    pub fn observe(&mut self, progress: &Progress) -> Option<Tick> {
        let seen = Seen::of(progress);
        let previous = self.last.replace(seen);
        match previous {
            Some(prev) if prev == seen => None,
            Some(prev) if seen.done && !prev.done => Some(Tick::Completed),
            Some(prev) if seen.index != prev.index && !seen.done => Some(Tick::PhaseChanged {
                from: prev.index,
                to: seen.index,
            }),
            None if seen.done => Some(Tick::Completed),
            _ => Some(Tick::Second {
                remaining_secs: seen.seconds,
            }),
        }
    }
}
