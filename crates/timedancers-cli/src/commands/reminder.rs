use chrono::{DateTime, Local};
use clap::Subcommand;
use serde::Serialize;
use timedancers_core::notify::{Outbox, ReminderTime};
use timedancers_core::storage::settings::{self, DailyReminder, DEFAULT_REMINDER_TIME};
use timedancers_core::Database;

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum ReminderAction {
    /// Show the daily reminder
    Show,
    /// Enable the daily reminder (24h time, e.g. 07:30)
    On {
        /// Defaults to the last time used, or 08:00
        time: Option<String>,
    },
    /// Disable the daily reminder
    Off,
}

#[derive(Serialize)]
struct ReminderReport {
    #[serde(flatten)]
    reminder: DailyReminder,
    next: Option<DateTime<Local>>,
}

fn report(reminder: DailyReminder) -> ReminderReport {
    let next = match (reminder.enabled, reminder.time) {
        (true, Some(time)) => time.next_occurrence_after(&Local::now()),
        _ => None,
    };
    ReminderReport { reminder, next }
}

pub fn run(action: ReminderAction) -> CliResult {
    let db = Database::open()?;

    let reminder = match action {
        ReminderAction::Show => settings::get_daily_reminder(&db)?,
        ReminderAction::On { time } => {
            let time = match time {
                Some(raw) => raw.parse::<ReminderTime>()?,
                None => settings::get_daily_reminder(&db)?
                    .time
                    .unwrap_or(DEFAULT_REMINDER_TIME),
            };
            let mut outbox = Outbox::open()?;
            settings::set_daily_reminder_enabled(&db, &mut outbox, true, time)?
        }
        ReminderAction::Off => {
            let mut outbox = Outbox::open()?;
            settings::set_daily_reminder_enabled(&db, &mut outbox, false, DEFAULT_REMINDER_TIME)?
        }
    };

    print_json(&report(reminder))
}
