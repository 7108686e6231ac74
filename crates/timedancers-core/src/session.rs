//! Session orchestration.
//!
//! [`SessionController`] ties the timer to its surroundings: the user's
//! controls, the host's foreground/background transitions, the polling loop,
//! and the collaborators that make noise (alert player, notification
//! dispatcher). The timer itself stays a pure value; this is the only place
//! that decides *when* alerts fire and *when* background notifications are
//! scheduled or withdrawn.
//!
//! Every mutating call saves the timer record to the key-value store, so a
//! host may drop the controller at any time and rebuild it later.

use crate::clock::{to_utc, Clock};
use crate::error::Result;
use crate::events::Event;
use crate::notify::{
    alert_plan, compute_schedule_items, play_plan, AlertKind, AlertMode, AlertPlayer,
    NotificationDispatcher,
};
use crate::storage::{settings, AlertsConfig, Config, KvStore};
use crate::timer::{resolve_phases, Progress, Tick, TickWatcher, TimerState, TimerStatus};

/// A start alert is still played by [`SessionController::poll`] if the
/// session is at most this far into its first phase.
pub const START_CHIME_WINDOW_MS: u64 = 500;

/// How long the completed state stays visible before the session resets.
pub const COMPLETION_RESET_DELAY_MS: u64 = 2_000;

/// Host application visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Active,
    Background,
}

pub struct SessionController<C, S, D, A> {
    clock: C,
    store: S,
    dispatcher: D,
    player: A,
    timer: TimerState,
    alerts: AlertsConfig,
    minutes_input: String,
    watcher: TickWatcher,
    app_active: bool,
    start_chime_done: bool,
    completion_done: bool,
    completed_at: Option<u64>,
}

impl<C, S, D, A> SessionController<C, S, D, A>
where
    C: Clock,
    S: KvStore,
    D: NotificationDispatcher,
    A: AlertPlayer,
{
    /// Build a controller, restoring the saved timer if the store has one.
    ///
    /// Without a saved timer the idle phases come from the last minutes
    /// input (or `session.default_minutes`) and any stored phase overrides.
    pub fn new(clock: C, store: S, dispatcher: D, player: A, config: &Config) -> Result<Self> {
        let minutes_input = settings::get_last_duration_minutes(&store)?
            .unwrap_or_else(|| config.session.default_minutes.to_string());
        let timer = match settings::load_timer_state(&store)? {
            Some(timer) => timer,
            None => {
                let overrides = settings::get_phase_seconds(&store)?;
                TimerState::new(resolve_phases(&minutes_input, &overrides))
            }
        };

        let now_ms = clock.now_ms();
        let mut watcher = TickWatcher::new();
        watcher.prime(&timer.compute_now(now_ms));
        log::debug!(
            "event=session_restore module=session status={:?} phases={}",
            timer.status(now_ms),
            timer.phases().len()
        );

        Ok(Self {
            clock,
            store,
            dispatcher,
            player,
            // A restored session has already been announced.
            start_chime_done: timer.is_started(),
            timer,
            alerts: config.alerts.clone(),
            minutes_input,
            watcher,
            app_active: true,
            completion_done: false,
            completed_at: None,
        })
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn timer(&self) -> &TimerState {
        &self.timer
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut D {
        &mut self.dispatcher
    }

    pub fn player(&self) -> &A {
        &self.player
    }

    pub fn alerts(&self) -> &AlertsConfig {
        &self.alerts
    }

    pub fn minutes_input(&self) -> &str {
        &self.minutes_input
    }

    pub fn progress(&self) -> Progress {
        self.timer.compute_now(self.clock.now_ms())
    }

    pub fn status(&self) -> TimerStatus {
        self.timer.status(self.clock.now_ms())
    }

    pub fn snapshot(&self) -> Event {
        self.timer.snapshot(self.clock.now_ms())
    }

    // ── User controls ────────────────────────────────────────────────

    /// Start a new session. Ignored unless idle.
    pub fn press_start(&mut self) -> Result<Option<Event>> {
        let now_ms = self.clock.now_ms();
        if self.timer.is_started() {
            return Ok(None);
        }
        let event = self.timer.start(now_ms);

        self.schedule_remaining(now_ms)?;
        settings::set_session_end(&self.store, now_ms.saturating_add(self.timer.total_ms()))?;
        if self.app_active {
            self.play(AlertKind::Start);
        }
        self.start_chime_done = true;
        self.completion_done = false;
        self.completed_at = None;

        log::info!(
            "event=session_start module=session total_ms={} background={}",
            self.timer.total_ms(),
            self.alerts.allow_background
        );
        self.settle(now_ms)?;
        Ok(event)
    }

    /// Continue a paused session. Ignored unless paused.
    pub fn press_resume(&mut self) -> Result<Option<Event>> {
        let now_ms = self.clock.now_ms();
        if self.timer.status(now_ms) != TimerStatus::Paused {
            return Ok(None);
        }
        let event = self.timer.resume(now_ms);
        self.schedule_remaining(now_ms)?;
        self.start_chime_done = true;
        self.completion_done = false;

        log::info!("event=session_resume module=session paused_total_ms={}", self.timer.paused_total());
        self.settle(now_ms)?;
        Ok(event)
    }

    /// Pause a running session and withdraw its background alerts.
    pub fn pause(&mut self) -> Result<Option<Event>> {
        let now_ms = self.clock.now_ms();
        let event = self.timer.pause(now_ms);
        self.cancel_scheduled();
        if event.is_some() {
            log::info!("event=session_pause module=session");
        }
        self.settle(now_ms)?;
        Ok(event)
    }

    /// Abandon the session: back to idle phases, no pending alerts, no
    /// session-end token.
    pub fn cancel(&mut self) -> Result<Option<Event>> {
        let now_ms = self.clock.now_ms();
        let event = self.reset_to_idle(now_ms)?;
        self.cancel_scheduled();
        settings::clear_session_end(&self.store)?;
        log::info!("event=session_cancel module=session");
        Ok(event)
    }

    /// Recompute the idle phase configuration from `minutes_input` and the
    /// stored overrides. Ignored once a session has started.
    pub fn apply_idle_phases(&mut self, minutes_input: &str) -> Result<Option<Event>> {
        if self.timer.is_started() {
            return Ok(None);
        }
        self.minutes_input = minutes_input.to_string();
        settings::set_last_duration_minutes(&self.store, minutes_input)?;

        let overrides = settings::get_phase_seconds(&self.store)?;
        let next = resolve_phases(minutes_input, &overrides);
        if next.as_slice() == self.timer.phases() {
            return Ok(None);
        }

        let now_ms = self.clock.now_ms();
        let seconds: Vec<u64> = next.iter().map(|p| p.seconds).collect();
        let event = self.timer.set_phases(next, now_ms);
        log::debug!("event=phases_applied module=session seconds={seconds:?}");
        self.settle(now_ms)?;
        Ok(event)
    }

    pub fn set_alert_mode(&mut self, mode: AlertMode) {
        self.alerts.mode = mode;
    }

    /// Toggle background notifications. A running session is rescheduled
    /// or has its alerts withdrawn immediately.
    pub fn set_allow_background_alerts(&mut self, allow: bool) -> Result<()> {
        self.alerts.allow_background = allow;
        if !self.timer.is_running() {
            return Ok(());
        }
        if allow {
            self.schedule_remaining(self.clock.now_ms())
        } else {
            self.cancel_scheduled();
            Ok(())
        }
    }

    // ── Host lifecycle ───────────────────────────────────────────────

    /// React to the host moving between foreground and background.
    ///
    /// In the foreground the controller plays alerts itself, so scheduled
    /// notifications are withdrawn. Going to the background hands the rest
    /// of a running session to the dispatcher.
    pub fn on_app_state(&mut self, state: AppState) -> Result<()> {
        match state {
            AppState::Active => {
                self.app_active = true;
                self.cancel_scheduled();
            }
            AppState::Background => {
                self.app_active = false;
                if self.timer.is_running() {
                    self.schedule_remaining(self.clock.now_ms())?;
                }
            }
        }
        log::debug!("event=app_state module=session state={state:?}");
        Ok(())
    }

    /// Drop notifications left behind by a session that no longer exists.
    ///
    /// Runs only when no session is in progress and the session-end token is
    /// missing or already in the past. Returns whether cleanup happened.
    pub fn cold_start_cleanup(&mut self) -> Result<bool> {
        let now_ms = self.clock.now_ms();
        if self.timer.is_started() {
            return Ok(false);
        }
        let stale = match settings::get_session_end(&self.store)? {
            Some(end_at_ms) => now_ms > end_at_ms,
            None => true,
        };
        if !stale {
            return Ok(false);
        }
        self.cancel_scheduled();
        settings::clear_session_end(&self.store)?;
        log::info!("event=cold_start_cleanup module=session");
        Ok(true)
    }

    // ── Polling ──────────────────────────────────────────────────────

    /// Advance the alert logic to the current clock reading.
    ///
    /// Call from the host's display loop. Returns the session events
    /// observed since the previous poll.
    pub fn poll(&mut self) -> Result<Vec<Event>> {
        let now_ms = self.clock.now_ms();
        let mut events = Vec::new();

        if let Some(done_at) = self.completed_at {
            if now_ms.saturating_sub(done_at) >= COMPLETION_RESET_DELAY_MS {
                events.extend(self.reset_to_idle(now_ms)?);
            }
            return Ok(events);
        }

        let progress = self.timer.compute_now(now_ms);
        let tick = self.watcher.observe(&progress);

        if self.timer.is_running() && !self.start_chime_done && !progress.done && progress.current_index == 0 {
            let first_ms = self.timer.phases().first().map_or(0, |p| p.duration_ms());
            if first_ms > 0
                && first_ms.saturating_sub(progress.phase_remaining_ms) <= START_CHIME_WINDOW_MS
            {
                log::debug!("event=start_chime module=session source=poll");
                self.play(AlertKind::Start);
                self.start_chime_done = true;
            }
        }

        if let Some(Tick::PhaseChanged { from, to }) = tick {
            self.play(AlertKind::PhaseChange);
            log::info!("event=phase_change module=session from={from} to={to}");
            events.push(Event::PhaseChanged {
                from_index: from,
                to_index: to,
                phase: progress.current_key,
                at: to_utc(now_ms),
            });
        }

        if progress.done && self.timer.is_started() && !self.completion_done {
            self.play(AlertKind::Completion);
            self.completion_done = true;
            self.completed_at = Some(now_ms);
            self.cancel_scheduled();
            settings::clear_session_end(&self.store)?;
            log::info!("event=session_complete module=session");
            events.push(Event::SessionCompleted { at: to_utc(now_ms) });
        }

        Ok(events)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Hand every alert still owed to the dispatcher, replacing whatever it
    /// had pending, and move the session-end token to the final alert.
    fn schedule_remaining(&mut self, now_ms: u64) -> Result<()> {
        if !self.alerts.allow_background {
            return Ok(());
        }
        let items = compute_schedule_items(&self.timer, self.alerts.mode, now_ms);
        let Some(last) = items.last() else {
            return Ok(());
        };

        self.cancel_scheduled();
        let mut scheduled = 0usize;
        for item in &items {
            match self.dispatcher.schedule_at(item, now_ms) {
                Ok(Some(_)) => scheduled += 1,
                Ok(None) => {}
                Err(err) => log::warn!(
                    "event=schedule module=session status=error when={} error={err}",
                    item.when_epoch_ms
                ),
            }
        }
        log::debug!("event=schedule module=session count={scheduled}");
        settings::set_session_end(&self.store, last.when_epoch_ms)
    }

    fn cancel_scheduled(&mut self) {
        if let Err(err) = self.dispatcher.cancel_all_scheduled() {
            log::warn!("event=cancel_scheduled module=session status=error error={err}");
        }
    }

    fn play(&mut self, kind: AlertKind) {
        let plan = alert_plan(self.alerts.mode, kind);
        play_plan(&mut self.player, plan, self.alerts.volume);
    }

    fn reset_to_idle(&mut self, now_ms: u64) -> Result<Option<Event>> {
        let event = self.timer.reset(now_ms);
        let overrides = settings::get_phase_seconds(&self.store)?;
        self.timer
            .set_phases(resolve_phases(&self.minutes_input, &overrides), now_ms);
        self.start_chime_done = false;
        self.completion_done = false;
        self.completed_at = None;
        self.settle(now_ms)?;
        Ok(event)
    }

    /// Save the timer and mark its current position as seen.
    fn settle(&mut self, now_ms: u64) -> Result<()> {
        self.watcher.prime(&self.timer.compute_now(now_ms));
        settings::save_timer_state(&self.store, &self.timer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::notify::{Chime, MemoryDispatcher, RecordingPlayer};
    use crate::storage::MemoryStore;

    const T: u64 = 1_700_000_000_000;

    type Controller = SessionController<ManualClock, MemoryStore, MemoryDispatcher, RecordingPlayer>;

    fn controller(clock: &ManualClock) -> Controller {
        SessionController::new(
            clock.clone(),
            MemoryStore::new(),
            MemoryDispatcher::new(),
            RecordingPlayer::default(),
            &Config::default(),
        )
        .unwrap()
    }

    #[test]
    fn idle_phases_follow_default_minutes() {
        let clock = ManualClock::new(T);
        let session = controller(&clock);
        let seconds: Vec<u64> = session.timer().phases().iter().map(|p| p.seconds).collect();
        assert_eq!(seconds, vec![60, 60, 60]);
        assert_eq!(session.status(), TimerStatus::Idle);
    }

    #[test]
    fn start_is_ignored_while_running() {
        let clock = ManualClock::new(T);
        let mut session = controller(&clock);
        assert!(session.press_start().unwrap().is_some());
        clock.advance(10_000);
        assert!(session.press_start().unwrap().is_none());
        assert_eq!(session.timer().start_at(), Some(T));
    }

    #[test]
    fn resume_only_from_pause() {
        let clock = ManualClock::new(T);
        let mut session = controller(&clock);
        assert!(session.press_resume().unwrap().is_none());
        session.press_start().unwrap();
        assert!(session.press_resume().unwrap().is_none());
        session.pause().unwrap();
        clock.advance(5_000);
        assert!(session.press_resume().unwrap().is_some());
        assert_eq!(session.timer().paused_total(), 5_000);
    }

    #[test]
    fn start_alert_plays_once_at_volume() {
        let clock = ManualClock::new(T);
        let mut session = controller(&clock);
        session.press_start().unwrap();
        clock.advance(100);
        session.poll().unwrap();
        assert_eq!(session.player().chimes, vec![(Chime::Opening, 50)]);
    }

    #[test]
    fn apply_idle_phases_is_ignored_once_started() {
        let clock = ManualClock::new(T);
        let mut session = controller(&clock);
        assert!(session.apply_idle_phases("6").unwrap().is_some());
        assert!(session.apply_idle_phases("6").unwrap().is_none());
        session.press_start().unwrap();
        assert!(session.apply_idle_phases("9").unwrap().is_none());
        assert_eq!(session.minutes_input(), "6");
    }
}
