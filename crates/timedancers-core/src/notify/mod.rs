//! Everything that turns timer state into alerts: the background schedule,
//! foreground chime/haptic plans, the daily reminder, and the dispatcher
//! seam to the host's notification service.

mod alerts;
mod dispatcher;
mod outbox;
mod reminder;
mod schedule;

pub use alerts::{
    alert_plan, play_plan, AlertKind, AlertMode, AlertPlan, AlertPlayer, Chime, HapticFeedback,
    RecordingPlayer,
};
pub use dispatcher::{DailyEntry, MemoryDispatcher, NotificationDispatcher, PendingAlert, ScheduledId};
pub use outbox::Outbox;
pub use reminder::{ReminderTime, REMINDER_BODY, REMINDER_TITLE};
pub use schedule::{compute_schedule_items, ScheduleItem, COMPLETION_BODY, COMPLETION_TITLE};
