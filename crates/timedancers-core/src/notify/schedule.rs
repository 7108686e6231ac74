//! Background alert scheduling.
//!
//! Turns a timer snapshot into the absolute-time alerts still owed for the
//! rest of the session. Boundaries are anchored to `start_at` shifted by the
//! accumulated pause time, so for a given snapshot the result does not depend
//! on when the caller gets around to dispatching it.

use serde::{Deserialize, Serialize};

use super::alerts::AlertMode;
use crate::timer::TimerState;

pub const COMPLETION_TITLE: &str = "Meditation complete";
pub const COMPLETION_BODY: &str = "Session finished";

/// One alert to hand to the OS notification service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub when_epoch_ms: u64,
    pub title: String,
    pub body: String,
    pub with_sound: bool,
}

/// Alerts for every phase boundary strictly after the current position.
///
/// Boundaries already passed are dropped, never caught up. The final
/// boundary is the completion alert; earlier ones announce the phase that
/// begins there. Empty when the session is not started or already over.
pub fn compute_schedule_items(
    timer: &TimerState,
    alert_mode: AlertMode,
    now_ms: u64,
) -> Vec<ScheduleItem> {
    let Some(start_at) = timer.start_at() else {
        return Vec::new();
    };
    let phases = timer.phases();
    let total_ms = phases
        .iter()
        .fold(0u64, |acc, p| acc.saturating_add(p.duration_ms()));
    if total_ms == 0 {
        return Vec::new();
    }

    // Same derivation as the timer, read from the snapshot's fields only.
    let effective_now = if timer.is_running() {
        now_ms
    } else {
        timer.pause_at().unwrap_or(now_ms)
    };
    let elapsed_ms = effective_now
        .saturating_sub(start_at)
        .saturating_sub(timer.paused_total());
    if elapsed_ms >= total_ms {
        return Vec::new();
    }

    // Session time zero in wall-clock terms once completed pauses are counted.
    let anchor_ms = start_at.saturating_add(timer.paused_total());
    let with_sound = alert_mode.with_sound();
    let last = phases.len() - 1;
    let mut items = Vec::new();
    let mut boundary_ms = 0u64;

    for (index, phase) in phases.iter().enumerate() {
        boundary_ms = boundary_ms.saturating_add(phase.duration_ms());
        if boundary_ms <= elapsed_ms {
            continue;
        }
        let (title, body) = if index == last {
            (COMPLETION_TITLE.to_string(), COMPLETION_BODY.to_string())
        } else {
            let next = phases[index + 1].key.label();
            (format!("{next} phase"), format!("Time for {next}"))
        };
        items.push(ScheduleItem {
            when_epoch_ms: anchor_ms.saturating_add(boundary_ms),
            title,
            body,
            with_sound,
        });
    }

    items
}
