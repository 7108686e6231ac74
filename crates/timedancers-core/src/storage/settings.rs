//! Small persisted settings kept in the key-value store.
//!
//! Values are stored as plain strings under fixed keys so they stay
//! readable by any host sharing the store.

use serde::{Deserialize, Serialize};

use super::KvStore;
use crate::error::Result;
use crate::notify::{NotificationDispatcher, ReminderTime, REMINDER_BODY, REMINDER_TITLE};
use crate::timer::{PhaseKey, PhaseSeconds, TimerState};

pub const KEY_LAST_DURATION_MINUTES: &str = "lastDurationMinutes";
pub const KEY_REMINDER_ENABLED: &str = "dailyReminderEnabled";
pub const KEY_REMINDER_TIME: &str = "dailyReminderTime";
pub const KEY_REMINDER_ID: &str = "dailyReminderId";
/// Expected end of the running session, epoch ms.
pub const KEY_SESSION_END: &str = "activeSessionEndAtMs";
pub const KEY_TIMER_STATE: &str = "timerState";

/// Reminder time offered when none has been stored yet.
pub const DEFAULT_REMINDER_TIME: ReminderTime = ReminderTime::EIGHT_AM;

fn phase_key(key: PhaseKey) -> &'static str {
    match key {
        PhaseKey::Power => "phaseSeconds.power",
        PhaseKey::Heart => "phaseSeconds.heart",
        PhaseKey::Wisdom => "phaseSeconds.wisdom",
    }
}

/// Read per-phase overrides. Unparseable entries are treated as absent.
pub fn get_phase_seconds<S: KvStore + ?Sized>(store: &S) -> Result<PhaseSeconds> {
    let read = |key: PhaseKey| -> Result<Option<u64>> {
        Ok(store
            .get(phase_key(key))?
            .and_then(|raw| raw.trim().parse::<u64>().ok()))
    };
    Ok(PhaseSeconds {
        power: read(PhaseKey::Power)?,
        heart: read(PhaseKey::Heart)?,
        wisdom: read(PhaseKey::Wisdom)?,
    })
}

/// Store overrides; `None` fields are removed.
pub fn set_phase_seconds<S: KvStore + ?Sized>(store: &S, seconds: &PhaseSeconds) -> Result<()> {
    for key in PhaseKey::ALL {
        match seconds.get(key) {
            Some(value) => store.set(phase_key(key), &value.to_string())?,
            None => store.remove(phase_key(key))?,
        }
    }
    Ok(())
}

pub fn clear_phase_seconds<S: KvStore + ?Sized>(store: &S) -> Result<()> {
    set_phase_seconds(store, &PhaseSeconds::default())
}

/// Raw text last entered in the minutes field.
pub fn get_last_duration_minutes<S: KvStore + ?Sized>(store: &S) -> Result<Option<String>> {
    store.get(KEY_LAST_DURATION_MINUTES)
}

pub fn set_last_duration_minutes<S: KvStore + ?Sized>(store: &S, input: &str) -> Result<()> {
    store.set(KEY_LAST_DURATION_MINUTES, input)
}

pub fn get_session_end<S: KvStore + ?Sized>(store: &S) -> Result<Option<u64>> {
    Ok(store
        .get(KEY_SESSION_END)?
        .and_then(|raw| raw.trim().parse::<u64>().ok()))
}

pub fn set_session_end<S: KvStore + ?Sized>(store: &S, end_at_ms: u64) -> Result<()> {
    store.set(KEY_SESSION_END, &end_at_ms.to_string())
}

pub fn clear_session_end<S: KvStore + ?Sized>(store: &S) -> Result<()> {
    store.remove(KEY_SESSION_END)
}

/// Last saved timer record. A record that no longer parses is dropped with a
/// warning.
pub fn load_timer_state<S: KvStore + ?Sized>(store: &S) -> Result<Option<TimerState>> {
    let Some(raw) = store.get(KEY_TIMER_STATE)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(timer) => Ok(Some(timer)),
        Err(err) => {
            log::warn!("event=timer_state_invalid module=settings error={err}");
            Ok(None)
        }
    }
}

pub fn save_timer_state<S: KvStore + ?Sized>(store: &S, timer: &TimerState) -> Result<()> {
    store.set(KEY_TIMER_STATE, &serde_json::to_string(timer)?)
}

/// Persisted daily reminder state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReminder {
    pub enabled: bool,
    pub time: Option<ReminderTime>,
    pub id: Option<String>,
}

pub fn get_daily_reminder<S: KvStore + ?Sized>(store: &S) -> Result<DailyReminder> {
    let enabled = store.get(KEY_REMINDER_ENABLED)?.as_deref() == Some("true");
    let time = match store.get(KEY_REMINDER_TIME)? {
        Some(raw) => match raw.parse::<ReminderTime>() {
            Ok(time) => Some(time),
            Err(err) => {
                log::warn!("event=reminder_time_invalid module=settings value={raw} error={err}");
                None
            }
        },
        None => None,
    };
    let id = store.get(KEY_REMINDER_ID)?.filter(|id| !id.is_empty());
    Ok(DailyReminder { enabled, time, id })
}

/// Turn the daily reminder on or off.
///
/// Any previously scheduled reminder is cancelled first, so at most one is
/// ever pending. Disabling keeps the stored time for the next enable.
///
/// # Errors
/// Returns store errors, and the dispatcher's error when scheduling the new
/// reminder fails.
pub fn set_daily_reminder_enabled<S, D>(
    store: &S,
    dispatcher: &mut D,
    enabled: bool,
    time: ReminderTime,
) -> Result<DailyReminder>
where
    S: KvStore + ?Sized,
    D: NotificationDispatcher + ?Sized,
{
    if let Some(existing) = store.get(KEY_REMINDER_ID)? {
        if let Err(err) = dispatcher.cancel(&existing) {
            log::warn!("event=reminder_cancel module=settings status=error id={existing} error={err}");
        }
        store.remove(KEY_REMINDER_ID)?;
    }

    if !enabled {
        store.set(KEY_REMINDER_ENABLED, "false")?;
        log::info!("event=reminder_disabled module=settings");
        return Ok(DailyReminder {
            enabled: false,
            time: None,
            id: None,
        });
    }

    let id = dispatcher.schedule_daily(time, REMINDER_TITLE, REMINDER_BODY)?;
    store.set(KEY_REMINDER_ENABLED, "true")?;
    store.set(KEY_REMINDER_TIME, &time.to_string())?;
    store.set(KEY_REMINDER_ID, &id)?;
    log::info!("event=reminder_enabled module=settings time={time} id={id}");
    Ok(DailyReminder {
        enabled: true,
        time: Some(time),
        id: Some(id),
    })
}
