//! Alert modes and the foreground alert plan.
//!
//! The scheduler only decides whether a background notification carries
//! sound. In the foreground the app plays its own chimes and haptics; this
//! module decides which ones for each alert.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DeliveryError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertMode {
    #[default]
    Chime,
    ChimeHaptic,
    Haptic,
    Silent,
}

impl AlertMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertMode::Chime => "chime",
            AlertMode::ChimeHaptic => "chime_haptic",
            AlertMode::Haptic => "haptic",
            AlertMode::Silent => "silent",
        }
    }

    pub fn plays_chime(self) -> bool {
        matches!(self, AlertMode::Chime | AlertMode::ChimeHaptic)
    }

    pub fn vibrates(self) -> bool {
        matches!(self, AlertMode::Haptic | AlertMode::ChimeHaptic)
    }

    /// Whether scheduled background notifications request sound.
    ///
    /// Haptic-only and silent modes never ask the OS for audio.
    pub fn with_sound(self) -> bool {
        self.plays_chime()
    }
}

impl fmt::Display for AlertMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "chime" => Ok(AlertMode::Chime),
            "chime_haptic" => Ok(AlertMode::ChimeHaptic),
            "haptic" => Ok(AlertMode::Haptic),
            "silent" => Ok(AlertMode::Silent),
            other => Err(ValidationError::UnknownAlertMode(other.to_string())),
        }
    }
}

/// Which bundled chime to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chime {
    /// Session start.
    Opening,
    /// Session completion.
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HapticFeedback {
    ImpactLight,
    ImpactMedium,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Start,
    PhaseChange,
    Completion,
}

/// Foreground feedback for one alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlertPlan {
    pub chime: Option<Chime>,
    pub haptic: Option<HapticFeedback>,
}

impl AlertPlan {
    pub fn is_empty(&self) -> bool {
        self.chime.is_none() && self.haptic.is_none()
    }
}

pub fn alert_plan(mode: AlertMode, kind: AlertKind) -> AlertPlan {
    let (chime, haptic) = match kind {
        AlertKind::Start => (Some(Chime::Opening), HapticFeedback::ImpactMedium),
        AlertKind::Completion => (Some(Chime::Closing), HapticFeedback::Success),
        AlertKind::PhaseChange => (None, HapticFeedback::ImpactLight),
    };
    AlertPlan {
        chime: chime.filter(|_| mode.plays_chime()),
        haptic: Some(haptic).filter(|_| mode.vibrates()),
    }
}

/// Audio and vibration output, implemented by the host platform.
pub trait AlertPlayer {
    /// Play a chime at `volume` (0-100).
    fn play_chime(&mut self, chime: Chime, volume: u8) -> Result<(), DeliveryError>;

    fn haptic(&mut self, feedback: HapticFeedback) -> Result<(), DeliveryError>;
}

/// Play every part of `plan`, logging failures instead of returning them.
pub fn play_plan<P: AlertPlayer + ?Sized>(player: &mut P, plan: AlertPlan, volume: u8) {
    if let Some(chime) = plan.chime {
        if let Err(err) = player.play_chime(chime, volume) {
            log::warn!("event=chime module=alerts status=error chime={chime:?} error={err}");
        }
    }
    if let Some(feedback) = plan.haptic {
        if let Err(err) = player.haptic(feedback) {
            log::warn!("event=haptic module=alerts status=error feedback={feedback:?} error={err}");
        }
    }
}

/// Records every request; used in tests and headless embedding.
#[derive(Debug, Clone, Default)]
pub struct RecordingPlayer {
    pub chimes: Vec<(Chime, u8)>,
    pub haptics: Vec<HapticFeedback>,
}

impl AlertPlayer for RecordingPlayer {
    fn play_chime(&mut self, chime: Chime, volume: u8) -> Result<(), DeliveryError> {
        self.chimes.push((chime, volume));
        Ok(())
    }

    fn haptic(&mut self, feedback: HapticFeedback) -> Result<(), DeliveryError> {
        self.haptics.push(feedback);
        Ok(())
    }
}
