mod display;
mod engine;
mod phase;
mod watcher;

pub use display::{display_time, get_remaining_seconds};
pub use engine::{Progress, TimerState, TimerStatus};
pub use phase::{
    create_phases_from_minutes, default_phases, parse_minutes_input, resolve_phases,
    total_duration_ms, Phase, PhaseKey, PhaseSeconds, FALLBACK_MINUTES,
};
pub use watcher::{Tick, TickWatcher};
