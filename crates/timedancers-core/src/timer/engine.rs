//! Phased session timer.
//!
//! The timer is a wall-clock-based state machine. It stores no countdown:
//! every query re-derives the position from `(now, start_at, paused_total)`,
//! so it stays exact across suspension, throttled polling, or a single query
//! after a long background gap.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!            \-> Completed (derived: elapsed >= total)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = TimerState::new(create_phases_from_minutes(9.0));
//! timer.start(clock.now_ms());
//! // In the UI's polling loop:
//! let progress = timer.compute_now(clock.now_ms());
//! ```

use serde::{Deserialize, Serialize};

use super::phase::{default_phases, total_duration_ms, Phase, PhaseKey};
use crate::clock::to_utc;
use crate::events::Event;

/// Derived session status. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Position of a session at one clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub done: bool,
    pub current_index: usize,
    /// `None` once the session is done, or when there are no phases.
    pub current_key: Option<PhaseKey>,
    pub phase_remaining_ms: u64,
    pub total_remaining_ms: u64,
}

/// Authoritative session record.
///
/// `pause_at` is set only while paused after a start; `paused_total` grows
/// only on resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    phases: Vec<Phase>,
    /// Epoch ms of session start.
    #[serde(default)]
    start_at: Option<u64>,
    /// Epoch ms of the most recent pause.
    #[serde(default)]
    pause_at: Option<u64>,
    /// Cumulative paused milliseconds.
    #[serde(default)]
    paused_total: u64,
    #[serde(default)]
    running: bool,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(default_phases())
    }
}

impl TimerState {
    /// Fresh, never-started state over the given phases.
    pub fn new(phases: Vec<Phase>) -> Self {
        Self {
            phases,
            start_at: None,
            pause_at: None,
            paused_total: 0,
            running: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn start_at(&self) -> Option<u64> {
        self.start_at
    }

    pub fn pause_at(&self) -> Option<u64> {
        self.pause_at
    }

    pub fn paused_total(&self) -> u64 {
        self.paused_total
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_started(&self) -> bool {
        self.start_at.is_some()
    }

    pub fn total_ms(&self) -> u64 {
        total_duration_ms(&self.phases)
    }

    /// Milliseconds of session time consumed at `now_ms`, excluding pauses.
    ///
    /// A paused session is frozen at its pause instant. Zero when not started.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        let Some(start_at) = self.start_at else {
            return 0;
        };
        let effective_now = if self.running {
            now_ms
        } else {
            self.pause_at.unwrap_or(now_ms)
        };
        effective_now
            .saturating_sub(start_at)
            .saturating_sub(self.paused_total)
    }

    /// Where the session stands at `now_ms`.
    ///
    /// Pure: the same state and reading always give the same answer.
    pub fn compute_now(&self, now_ms: u64) -> Progress {
        let total = self.total_ms();

        if self.start_at.is_none() {
            let first = self.phases.first();
            return Progress {
                done: false,
                current_index: 0,
                current_key: first.map(|p| p.key),
                phase_remaining_ms: first.map(Phase::duration_ms).unwrap_or(0),
                total_remaining_ms: total,
            };
        }

        let elapsed = self.elapsed_ms(now_ms);
        if elapsed >= total {
            return self.finished();
        }

        let mut cumulative = 0u64;
        for (index, phase) in self.phases.iter().enumerate() {
            let end = cumulative.saturating_add(phase.duration_ms());
            if elapsed < end {
                return Progress {
                    done: false,
                    current_index: index,
                    current_key: Some(phase.key),
                    phase_remaining_ms: end - elapsed,
                    total_remaining_ms: total - elapsed,
                };
            }
            cumulative = end;
        }

        self.finished()
    }

    /// Derived status at `now_ms`.
    pub fn status(&self, now_ms: u64) -> TimerStatus {
        if self.start_at.is_none() {
            TimerStatus::Idle
        } else if self.elapsed_ms(now_ms) >= self.total_ms() {
            TimerStatus::Completed
        } else if self.running {
            TimerStatus::Running
        } else {
            TimerStatus::Paused
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, now_ms: u64) -> Event {
        let progress = self.compute_now(now_ms);
        Event::StateSnapshot {
            status: self.status(now_ms),
            current_index: progress.current_index,
            current_key: progress.current_key,
            phase_remaining_ms: progress.phase_remaining_ms,
            total_remaining_ms: progress.total_remaining_ms,
            total_ms: self.total_ms(),
            at: to_utc(now_ms),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a session at `now_ms`.
    ///
    /// Always starts from scratch: calling this on a running or paused
    /// session discards its progress and pause bookkeeping.
    pub fn start(&mut self, now_ms: u64) -> Option<Event> {
        self.start_at = Some(now_ms);
        self.pause_at = None;
        self.paused_total = 0;
        self.running = true;
        Some(Event::SessionStarted {
            phase_count: self.phases.len(),
            total_ms: self.total_ms(),
            at: to_utc(now_ms),
        })
    }

    pub fn pause(&mut self, now_ms: u64) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.running = false;
        self.pause_at = Some(now_ms);
        Some(Event::SessionPaused {
            total_remaining_ms: self.compute_now(now_ms).total_remaining_ms,
            at: to_utc(now_ms),
        })
    }

    pub fn resume(&mut self, now_ms: u64) -> Option<Event> {
        if self.running || self.start_at.is_none() {
            return None;
        }
        let pause_at = self.pause_at?;
        let paused_ms = now_ms.saturating_sub(pause_at);
        self.paused_total = self.paused_total.saturating_add(paused_ms);
        self.pause_at = None;
        self.running = true;
        Some(Event::SessionResumed {
            paused_ms,
            total_remaining_ms: self.compute_now(now_ms).total_remaining_ms,
            at: to_utc(now_ms),
        })
    }

    /// Return to idle, keeping the phase configuration.
    pub fn reset(&mut self, now_ms: u64) -> Option<Event> {
        *self = Self::new(std::mem::take(&mut self.phases));
        Some(Event::SessionReset { at: to_utc(now_ms) })
    }

    /// Replace the phase configuration. Ignored while a session is in
    /// progress (running, paused, or completed but not yet reset).
    pub fn set_phases(&mut self, phases: Vec<Phase>, now_ms: u64) -> Option<Event> {
        if self.running || self.start_at.is_some() {
            return None;
        }
        let seconds = phases.iter().map(|p| p.seconds).collect();
        *self = Self::new(phases);
        Some(Event::PhasesConfigured {
            seconds,
            at: to_utc(now_ms),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn finished(&self) -> Progress {
        Progress {
            done: true,
            current_index: self.phases.len().saturating_sub(1),
            current_key: None,
            phase_remaining_ms: 0,
            total_remaining_ms: 0,
        }
    }
}
