//! Integration tests for the phased timer.
//!
//! Exercises the public API only: phase construction, wall-clock progress
//! derivation, pause accounting and the polling watcher.

use proptest::prelude::*;
use timedancers_core::timer::{
    create_phases_from_minutes, display_time, get_remaining_seconds, total_duration_ms, Phase,
    PhaseKey, Tick, TickWatcher, TimerState, TimerStatus,
};

const T: u64 = 1_700_000_000_000;

fn triad(power: u64, heart: u64, wisdom: u64) -> Vec<Phase> {
    vec![
        Phase::new(PhaseKey::Power, power),
        Phase::new(PhaseKey::Heart, heart),
        Phase::new(PhaseKey::Wisdom, wisdom),
    ]
}

proptest! {
    #[test]
    fn minutes_split_sums_to_rounded_seconds(minutes in 0.0f64..600.0) {
        let phases = create_phases_from_minutes(minutes);
        let sum: u64 = phases.iter().map(|p| p.seconds).sum();
        prop_assert_eq!(sum, (minutes * 60.0).round() as u64);

        let max = phases.iter().map(|p| p.seconds).max().unwrap();
        let min = phases.iter().map(|p| p.seconds).min().unwrap();
        prop_assert!(max - min <= 1);
        prop_assert!(phases[0].seconds >= phases[1].seconds);
        prop_assert!(phases[1].seconds >= phases[2].seconds);
    }

    #[test]
    fn paused_progress_is_frozen(
        run_ms in 0u64..200_000,
        later_a in 0u64..10_000_000,
        later_b in 0u64..10_000_000,
    ) {
        let mut timer = TimerState::new(triad(60, 60, 60));
        timer.start(T);
        timer.pause(T + run_ms);

        let at_pause = timer.compute_now(T + run_ms);
        prop_assert_eq!(timer.compute_now(T + run_ms + later_a), at_pause);
        prop_assert_eq!(timer.compute_now(T + run_ms + later_b), at_pause);
    }

    #[test]
    fn pauses_do_not_consume_session_time(
        pauses in proptest::collection::vec((1u64..30_000, 1u64..600_000), 0..5),
    ) {
        let mut timer = TimerState::new(triad(300, 180, 420));
        timer.start(T);

        let mut now = T;
        let mut running_ms = 0u64;
        let mut paused_ms = 0u64;
        for (run, pause) in pauses {
            now += run;
            running_ms += run;
            timer.pause(now);
            now += pause;
            paused_ms += pause;
            timer.resume(now);
        }

        prop_assert_eq!(timer.paused_total(), paused_ms);
        let expected = timer.total_ms().saturating_sub(running_ms);
        prop_assert_eq!(timer.compute_now(now).total_remaining_ms, expected);
    }

    #[test]
    fn remaining_time_never_grows(steps in proptest::collection::vec(0u64..5_000, 1..50)) {
        let mut timer = TimerState::new(triad(10, 20, 30));
        timer.start(T);

        let mut now = T;
        let mut last = timer.compute_now(now).total_remaining_ms;
        for step in steps {
            now += step;
            let remaining = timer.compute_now(now).total_remaining_ms;
            prop_assert!(remaining <= last);
            last = remaining;
        }
    }
}

#[test]
fn single_late_query_lands_on_the_right_phase() {
    let mut timer = TimerState::new(triad(300, 180, 420));
    timer.start(T);

    // Nothing polled for 7 minutes; Heart ends at 8 minutes.
    let progress = timer.compute_now(T + 7 * 60_000);
    assert_eq!(progress.current_key, Some(PhaseKey::Heart));
    assert_eq!(progress.phase_remaining_ms, 60_000);
    assert_eq!(progress.total_remaining_ms, 8 * 60_000);
}

#[test]
fn short_phases_queried_mid_wisdom() {
    let mut timer = TimerState::new(triad(2, 2, 2));
    timer.start(10_000);

    let progress = timer.compute_now(15_000);
    assert!(!progress.done);
    assert_eq!(progress.current_index, 2);
    assert_eq!(progress.current_key, Some(PhaseKey::Wisdom));
    assert_eq!(progress.phase_remaining_ms, 1_000);
    assert_eq!(progress.total_remaining_ms, 1_000);
}

#[test]
fn resume_shifts_boundaries_by_pause_length() {
    let mut timer = TimerState::new(triad(60, 60, 60));
    timer.start(T);
    timer.pause(T + 30_000);
    timer.resume(T + 50_000);

    assert_eq!(timer.paused_total(), 20_000);
    assert_eq!(timer.compute_now(T + 79_999).current_index, 0);
    assert_eq!(timer.compute_now(T + 80_000).current_index, 1);
    assert_eq!(timer.status(T + 80_000), TimerStatus::Running);
}

#[test]
fn completion_boundary_is_exact() {
    let mut timer = TimerState::new(triad(60, 60, 60));
    timer.start(T);

    let before = timer.compute_now(T + 179_999);
    assert!(!before.done);
    assert_eq!(before.current_index, 2);
    assert_eq!(get_remaining_seconds(before.phase_remaining_ms), 1);

    let at = timer.compute_now(T + 180_000);
    assert!(at.done);
    assert_eq!(at.current_index, 2);
    assert_eq!(at.current_key, None);
    assert_eq!(at.total_remaining_ms, 0);
    assert_eq!(timer.status(T + 180_000), TimerStatus::Completed);
}

#[test]
fn watcher_reports_each_transition_once() {
    let mut timer = TimerState::new(triad(1, 1, 1));
    timer.start(T);

    let mut watcher = TickWatcher::new();
    watcher.prime(&timer.compute_now(T));

    let mut phase_changes = Vec::new();
    let mut completions = 0;
    // 250 ms polling, like the display loop.
    for step in 1..=16u64 {
        match watcher.observe(&timer.compute_now(T + step * 250)) {
            Some(Tick::PhaseChanged { from, to }) => phase_changes.push((from, to)),
            Some(Tick::Completed) => completions += 1,
            _ => {}
        }
    }

    assert_eq!(phase_changes, vec![(0, 1), (1, 2)]);
    assert_eq!(completions, 1);
}

#[test]
fn countdown_display_for_default_session() {
    let timer = TimerState::default();
    assert_eq!(total_duration_ms(timer.phases()), 900_000);
    let progress = timer.compute_now(T);
    assert_eq!(
        display_time(get_remaining_seconds(progress.phase_remaining_ms)),
        "05:00"
    );
    assert_eq!(
        display_time(get_remaining_seconds(progress.total_remaining_ms)),
        "15:00"
    );
}

#[test]
fn timer_record_survives_json() {
    let mut timer = TimerState::new(triad(60, 60, 60));
    timer.start(T);
    timer.pause(T + 12_345);

    let json = serde_json::to_string(&timer).unwrap();
    let restored: TimerState = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.compute_now(T + 99_999), timer.compute_now(T + 12_345));
}
