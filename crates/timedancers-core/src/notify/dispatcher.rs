use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::reminder::ReminderTime;
use super::schedule::ScheduleItem;
use crate::error::DeliveryError;

/// Identifier handed back by a dispatcher for later cancellation.
pub type ScheduledId = String;

/// Local notification service of the host platform.
///
/// One-shot session alerts and the repeating daily reminder are tracked
/// separately: cancelling session alerts leaves the reminder in place.
pub trait NotificationDispatcher {
    /// Schedule `item` for its absolute time. Returns `Ok(None)` when the
    /// time is not in the future relative to `now_ms`.
    fn schedule_at(
        &mut self,
        item: &ScheduleItem,
        now_ms: u64,
    ) -> Result<Option<ScheduledId>, DeliveryError>;

    /// Schedule a notification repeating every day at `time`.
    fn schedule_daily(
        &mut self,
        time: ReminderTime,
        title: &str,
        body: &str,
    ) -> Result<ScheduledId, DeliveryError>;

    fn cancel(&mut self, id: &str) -> Result<(), DeliveryError>;

    /// Cancel every pending one-shot session alert.
    fn cancel_all_scheduled(&mut self) -> Result<(), DeliveryError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingAlert {
    pub id: ScheduledId,
    #[serde(flatten)]
    pub item: ScheduleItem,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEntry {
    pub id: ScheduledId,
    pub time: ReminderTime,
    pub title: String,
    pub body: String,
}

/// Pending notifications kept in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryDispatcher {
    #[serde(default)]
    pub(crate) pending: Vec<PendingAlert>,
    #[serde(default)]
    pub(crate) daily: Vec<DailyEntry>,
}

impl MemoryDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending one-shot alerts, earliest first.
    pub fn pending(&self) -> &[PendingAlert] {
        &self.pending
    }

    pub fn daily(&self) -> &[DailyEntry] {
        &self.daily
    }

    /// Remove and return alerts whose time has come.
    pub fn take_due(&mut self, now_ms: u64) -> Vec<PendingAlert> {
        let (due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.item.when_epoch_ms <= now_ms);
        self.pending = rest;
        due
    }
}

impl NotificationDispatcher for MemoryDispatcher {
    fn schedule_at(
        &mut self,
        item: &ScheduleItem,
        now_ms: u64,
    ) -> Result<Option<ScheduledId>, DeliveryError> {
        if item.when_epoch_ms <= now_ms {
            return Ok(None);
        }
        let id = Uuid::new_v4().to_string();
        let at = self
            .pending
            .partition_point(|p| p.item.when_epoch_ms <= item.when_epoch_ms);
        self.pending.insert(
            at,
            PendingAlert {
                id: id.clone(),
                item: item.clone(),
            },
        );
        Ok(Some(id))
    }

    fn schedule_daily(
        &mut self,
        time: ReminderTime,
        title: &str,
        body: &str,
    ) -> Result<ScheduledId, DeliveryError> {
        let id = Uuid::new_v4().to_string();
        self.daily.push(DailyEntry {
            id: id.clone(),
            time,
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(id)
    }

    fn cancel(&mut self, id: &str) -> Result<(), DeliveryError> {
        self.pending.retain(|p| p.id != id);
        self.daily.retain(|d| d.id != id);
        Ok(())
    }

    fn cancel_all_scheduled(&mut self) -> Result<(), DeliveryError> {
        self.pending.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(when: u64) -> ScheduleItem {
        ScheduleItem {
            when_epoch_ms: when,
            title: "t".into(),
            body: "b".into(),
            with_sound: true,
        }
    }

    #[test]
    fn past_items_are_not_scheduled() {
        let mut dispatcher = MemoryDispatcher::new();
        assert_eq!(dispatcher.schedule_at(&item(1_000), 1_000).unwrap(), None);
        assert!(dispatcher.pending().is_empty());
    }

    #[test]
    fn pending_stays_sorted_and_drains_when_due() {
        let mut dispatcher = MemoryDispatcher::new();
        dispatcher.schedule_at(&item(3_000), 0).unwrap();
        dispatcher.schedule_at(&item(1_000), 0).unwrap();
        dispatcher.schedule_at(&item(2_000), 0).unwrap();
        let whens: Vec<_> = dispatcher.pending().iter().map(|p| p.item.when_epoch_ms).collect();
        assert_eq!(whens, vec![1_000, 2_000, 3_000]);

        let due = dispatcher.take_due(2_000);
        assert_eq!(due.len(), 2);
        assert_eq!(dispatcher.pending().len(), 1);
    }

    #[test]
    fn cancel_all_keeps_daily_reminder() {
        let mut dispatcher = MemoryDispatcher::new();
        dispatcher.schedule_at(&item(5_000), 0).unwrap();
        let daily = dispatcher
            .schedule_daily(ReminderTime::new(8, 0).unwrap(), "Timedancers", "Time to meditate")
            .unwrap();
        dispatcher.cancel_all_scheduled().unwrap();
        assert!(dispatcher.pending().is_empty());
        assert_eq!(dispatcher.daily().len(), 1);

        dispatcher.cancel(&daily).unwrap();
        assert!(dispatcher.daily().is_empty());
    }
}
