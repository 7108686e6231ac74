//! Daily meditation reminder time.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const REMINDER_TITLE: &str = "Timedancers";
pub const REMINDER_BODY: &str = "Time to meditate";

/// Local wall-clock time of day, 24-hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReminderTime {
    hour: u8,
    minute: u8,
}

impl ReminderTime {
    pub const EIGHT_AM: ReminderTime = ReminderTime { hour: 8, minute: 0 };

    pub fn new(hour: u8, minute: u8) -> Result<Self, ValidationError> {
        if hour > 23 || minute > 59 {
            return Err(ValidationError::InvalidReminderTime(format!("{hour}:{minute}")));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Next instant strictly after `now` at this local time of day.
    ///
    /// Days where the time falls into a DST gap are skipped; in a DST fold the
    /// earlier instant wins.
    pub fn next_occurrence_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let time = NaiveTime::from_hms_opt(self.hour.into(), self.minute.into(), 0)?;
        let today = now.date_naive();
        (0..=2u64).find_map(|offset| {
            let day = today.checked_add_days(Days::new(offset))?;
            now.timezone()
                .from_local_datetime(&day.and_time(time))
                .earliest()
                .filter(|candidate| candidate > now)
        })
    }
}

impl FromStr for ReminderTime {
    type Err = ValidationError;

    /// Accepts `H:MM` or `HH:MM`: hour `0-23` (one or two digits), minute
    /// exactly two digits `00-59`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidReminderTime(s.to_string());
        let (h, m) = s.split_once(':').ok_or_else(invalid)?;
        let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(h) || h.len() > 2 || !all_digits(m) || m.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = h.parse().map_err(|_| invalid())?;
        let minute: u8 = m.parse().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for ReminderTime {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReminderTime> for String {
    fn from(value: ReminderTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ReminderTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn parses_valid_times() {
        assert_eq!("8:05".parse::<ReminderTime>().unwrap(), ReminderTime::new(8, 5).unwrap());
        assert_eq!("08:05".parse::<ReminderTime>().unwrap().to_string(), "08:05");
        assert_eq!("23:59".parse::<ReminderTime>().unwrap().hour(), 23);
        assert_eq!("0:00".parse::<ReminderTime>().unwrap().minute(), 0);
    }

    #[test]
    fn rejects_invalid_times() {
        for bad in ["24:00", "7:5", "12:60", "", "1200", "ab:cd", "123:00", "-1:00", "12:00:00"] {
            assert_eq!(
                bad.parse::<ReminderTime>(),
                Err(ValidationError::InvalidReminderTime(bad.to_string())),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn next_occurrence_later_today() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2026, 3, 1, 6, 30, 0).unwrap();
        let next = ReminderTime::new(8, 0).unwrap().next_occurrence_after(&now).unwrap();
        assert_eq!(next, tz.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn next_occurrence_rolls_to_tomorrow() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let next = ReminderTime::new(8, 0).unwrap().next_occurrence_after(&now).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap());
    }

    #[test]
    fn serializes_as_text() {
        let time = ReminderTime::new(7, 15).unwrap();
        assert_eq!(serde_json::to_string(&time).unwrap(), "\"07:15\"");
        let back: ReminderTime = serde_json::from_str("\"7:15\"").unwrap();
        assert_eq!(back, time);
        assert!(serde_json::from_str::<ReminderTime>("\"25:00\"").is_err());
    }
}
