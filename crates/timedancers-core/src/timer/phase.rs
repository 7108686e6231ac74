use std::fmt;

use serde::{Deserialize, Serialize};

/// Fallback session length when the minutes input is empty or zero.
pub const FALLBACK_MINUTES: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKey {
    Power,
    Heart,
    Wisdom,
}

impl PhaseKey {
    /// All keys in session order.
    pub const ALL: [PhaseKey; 3] = [PhaseKey::Power, PhaseKey::Heart, PhaseKey::Wisdom];

    /// Capitalized display name.
    pub fn label(self) -> &'static str {
        match self {
            PhaseKey::Power => "Power",
            PhaseKey::Heart => "Heart",
            PhaseKey::Wisdom => "Wisdom",
        }
    }
}

impl fmt::Display for PhaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub key: PhaseKey,
    /// Duration in whole seconds.
    pub seconds: u64,
}

impl Phase {
    pub fn new(key: PhaseKey, seconds: u64) -> Self {
        Self { key, seconds }
    }

    /// Get phase duration in milliseconds.
    ///
    /// Uses saturating arithmetic to prevent overflow with large values.
    pub fn duration_ms(&self) -> u64 {
        self.seconds.saturating_mul(1000)
    }
}

/// The out-of-the-box configuration: 5 / 3 / 7 minutes.
pub fn default_phases() -> Vec<Phase> {
    vec![
        Phase::new(PhaseKey::Power, 5 * 60),
        Phase::new(PhaseKey::Heart, 3 * 60),
        Phase::new(PhaseKey::Wisdom, 7 * 60),
    ]
}

/// Total session duration in milliseconds.
pub fn total_duration_ms(phases: &[Phase]) -> u64 {
    phases
        .iter()
        .fold(0u64, |acc, p| acc.saturating_add(p.duration_ms()))
}

/// Split a duration given in minutes into three phases whose seconds sum to
/// exactly `round(minutes * 60)`.
///
/// Negative and non-finite input is treated as zero. Leftover seconds
/// (at most two) go to the leading phases.
pub fn create_phases_from_minutes(minutes: f64) -> Vec<Phase> {
    let total_seconds = if minutes.is_finite() && minutes > 0.0 {
        (minutes * 60.0).round() as u64
    } else {
        0
    };
    let base = total_seconds / 3;
    let remainder = (total_seconds - base * 3) as usize;

    PhaseKey::ALL
        .iter()
        .enumerate()
        .map(|(i, &key)| Phase::new(key, if i < remainder { base + 1 } else { base }))
        .collect()
}

/// Per-phase duration overrides in seconds, as stored by the settings screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSeconds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wisdom: Option<u64>,
}

impl PhaseSeconds {
    pub fn get(&self, key: PhaseKey) -> Option<u64> {
        match key {
            PhaseKey::Power => self.power,
            PhaseKey::Heart => self.heart,
            PhaseKey::Wisdom => self.wisdom,
        }
    }

    /// True when at least one override carries a non-zero duration.
    pub fn is_active(&self) -> bool {
        PhaseKey::ALL
            .iter()
            .any(|&k| self.get(k).is_some_and(|s| s > 0))
    }
}

/// Parse the leading integer of a minutes text field, falling back to
/// [`FALLBACK_MINUTES`] for empty, zero, or unparseable input.
pub fn parse_minutes_input(input: &str) -> u64 {
    let digits: String = input
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    match digits.parse::<u64>() {
        Ok(0) | Err(_) => FALLBACK_MINUTES,
        Ok(n) => n,
    }
}

/// Build the idle phase configuration from the minutes input and any stored
/// overrides. Missing overrides are filled from the equal split.
pub fn resolve_phases(minutes_input: &str, overrides: &PhaseSeconds) -> Vec<Phase> {
    let minutes = parse_minutes_input(minutes_input);
    let split = create_phases_from_minutes(minutes as f64);
    if !overrides.is_active() {
        return split;
    }

    split
        .into_iter()
        .map(|phase| match overrides.get(phase.key) {
            Some(seconds) if seconds > 0 => Phase::new(phase.key, seconds),
            _ => phase,
        })
        .collect()
}
