//! Integration tests for background alert scheduling and dispatch.

use timedancers_core::notify::{
    compute_schedule_items, AlertMode, MemoryDispatcher, NotificationDispatcher, Outbox,
    COMPLETION_TITLE,
};
use timedancers_core::timer::{create_phases_from_minutes, Phase, PhaseKey, TimerState};

const T: u64 = 1_700_000_000_000;

fn three_minute_session() -> TimerState {
    TimerState::new(create_phases_from_minutes(3.0))
}

fn whens(timer: &TimerState, now: u64) -> Vec<u64> {
    compute_schedule_items(timer, AlertMode::Chime, now)
        .iter()
        .map(|i| i.when_epoch_ms)
        .collect()
}

#[test]
fn skips_boundaries_already_passed() {
    let mut timer = three_minute_session();
    timer.start(T);

    assert_eq!(whens(&timer, T + 30_000), vec![T + 60_000, T + 120_000, T + 180_000]);
    assert_eq!(whens(&timer, T + 90_000), vec![T + 120_000, T + 180_000]);
    assert_eq!(whens(&timer, T + 150_000), vec![T + 180_000]);
    assert!(whens(&timer, T + 180_000).is_empty());
    assert!(whens(&timer, T + 500_000).is_empty());
}

#[test]
fn only_completion_remains_late_in_wisdom() {
    let mut timer = three_minute_session();
    timer.start(T);

    let now = T + 125_000;
    let items = compute_schedule_items(&timer, AlertMode::Chime, now);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].when_epoch_ms, now + 55_000);
    assert_eq!(items[0].title, COMPLETION_TITLE);
    assert!(items[0].with_sound);
}

#[test]
fn sound_flag_follows_alert_mode() {
    let mut timer = three_minute_session();
    timer.start(T);

    for (mode, sound) in [
        (AlertMode::Chime, true),
        (AlertMode::ChimeHaptic, true),
        (AlertMode::Haptic, false),
        (AlertMode::Silent, false),
    ] {
        let items = compute_schedule_items(&timer, mode, T);
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| i.with_sound == sound), "{mode}");
    }
}

#[test]
fn pause_bookkeeping_controls_which_boundaries_remain() {
    let mut timer = three_minute_session();
    timer.start(T);
    timer.pause(T + 70_000);
    timer.resume(T + 90_000);

    // 100 s of session time consumed at T + 120 s: the first boundary is gone.
    let items = compute_schedule_items(&timer, AlertMode::Chime, T + 120_000);
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "Wisdom phase");
    assert_eq!(items[1].title, COMPLETION_TITLE);
    // The 20 s pause pushes every remaining boundary back.
    assert_eq!(items[0].when_epoch_ms, T + 140_000);
    assert_eq!(items[1].when_epoch_ms, T + 200_000);
    let progress = timer.compute_now(T + 120_000);
    assert_eq!(items[1].when_epoch_ms, T + 120_000 + progress.total_remaining_ms);
}

#[test]
fn uneven_phases_get_their_own_boundaries() {
    let mut timer = TimerState::new(vec![
        Phase::new(PhaseKey::Power, 10),
        Phase::new(PhaseKey::Heart, 0),
        Phase::new(PhaseKey::Wisdom, 5),
    ]);
    timer.start(T);

    let items = compute_schedule_items(&timer, AlertMode::Silent, T);
    let whens: Vec<_> = items.iter().map(|i| i.when_epoch_ms).collect();
    assert_eq!(whens, vec![T + 10_000, T + 10_000, T + 15_000]);
    assert_eq!(items[0].title, "Heart phase");
    assert_eq!(items[1].title, "Wisdom phase");
}

#[test]
fn dispatching_a_background_session() {
    let mut timer = three_minute_session();
    timer.start(T);
    let now = T + 30_000;

    let mut dispatcher = MemoryDispatcher::new();
    for item in compute_schedule_items(&timer, AlertMode::Chime, now) {
        dispatcher.schedule_at(&item, now).unwrap();
    }
    assert_eq!(dispatcher.pending().len(), 3);

    let due = dispatcher.take_due(T + 125_000);
    let titles: Vec<_> = due.iter().map(|p| p.item.title.as_str()).collect();
    assert_eq!(titles, vec!["Heart phase", "Wisdom phase"]);
    assert_eq!(dispatcher.pending()[0].item.title, COMPLETION_TITLE);
}

#[test]
fn outbox_survives_process_restart() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("outbox.json");

    let mut timer = three_minute_session();
    timer.start(T);
    {
        let mut outbox = Outbox::new_with_path(path.clone());
        for item in compute_schedule_items(&timer, AlertMode::Haptic, T) {
            outbox.schedule_at(&item, T).unwrap();
        }
    }

    let mut outbox = Outbox::new_with_path(path);
    outbox.load().unwrap();
    assert_eq!(outbox.pending().len(), 3);
    assert!(outbox.pending().iter().all(|p| !p.item.with_sound));

    outbox.cancel_all_scheduled().unwrap();
    outbox.load().unwrap();
    assert!(outbox.pending().is_empty());
}
