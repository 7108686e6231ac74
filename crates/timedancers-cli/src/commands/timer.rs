use std::io::Write;
use std::time::Duration;

use clap::Subcommand;
use serde::Serialize;
use timedancers_core::timer::{display_time, get_remaining_seconds};
use timedancers_core::{AppState, Clock, Config, Event, TimerStatus};

use super::{open_session, print_json, CliResult, CliSession};

/// Display refresh period of `timer watch`.
const WATCH_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a session
    Start {
        /// Session length in minutes, split across the three phases
        #[arg(long)]
        minutes: Option<String>,
    },
    /// Pause the running session
    Pause,
    /// Resume a paused session
    Resume,
    /// Cancel the session and return to idle
    Reset,
    /// Print current timer state as JSON
    Status,
    /// Follow the session live, playing alerts in the terminal
    Watch,
    /// Hand the rest of the session to background notifications
    Background,
    /// Withdraw background notifications
    Foreground,
}

#[derive(Serialize)]
struct StatusReport {
    #[serde(flatten)]
    snapshot: Event,
    phase_display: String,
    total_display: String,
}

fn status_report(session: &CliSession) -> StatusReport {
    let progress = session.progress();
    StatusReport {
        snapshot: session.snapshot(),
        phase_display: display_time(get_remaining_seconds(progress.phase_remaining_ms)),
        total_display: display_time(get_remaining_seconds(progress.total_remaining_ms)),
    }
}

/// Print the command's event, or the current state when it was a no-op.
fn print_outcome(session: &CliSession, event: Option<Event>) -> CliResult {
    match event {
        Some(event) => print_json(&event),
        None => print_json(&status_report(session)),
    }
}

pub fn run(action: TimerAction, config: &Config) -> CliResult {
    let mut session = open_session(config)?;
    session.cold_start_cleanup()?;

    match action {
        TimerAction::Start { minutes } => {
            if let Some(minutes) = minutes {
                session.apply_idle_phases(&minutes)?;
            }
            let event = session.press_start()?;
            print_outcome(&session, event)?;
        }
        TimerAction::Pause => {
            let event = session.pause()?;
            print_outcome(&session, event)?;
        }
        TimerAction::Resume => {
            let event = session.press_resume()?;
            print_outcome(&session, event)?;
        }
        TimerAction::Reset => {
            let event = session.cancel()?;
            print_outcome(&session, event)?;
        }
        TimerAction::Status => {
            print_json(&status_report(&session))?;
        }
        TimerAction::Watch => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(watch(&mut session))?;
        }
        TimerAction::Background => {
            session.on_app_state(AppState::Background)?;
            print_json(&session.dispatcher().pending())?;
        }
        TimerAction::Foreground => {
            session.on_app_state(AppState::Active)?;
            print_json(&status_report(&session))?;
        }
    }
    Ok(())
}

/// Poll the session until it resets after completion, or until Ctrl-C.
///
/// While watching, alerts play in the terminal, so background notifications
/// are withdrawn on entry and handed back on interrupt.
async fn watch(session: &mut CliSession) -> CliResult {
    if session.status() == TimerStatus::Idle {
        print_json(&status_report(session))?;
        return Ok(());
    }

    session.on_app_state(AppState::Active)?;
    let mut interval = tokio::time::interval(WATCH_INTERVAL);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut last_line = String::new();

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                eprintln!();
                session.on_app_state(AppState::Background)?;
                log::info!("event=watch_interrupted module=cli");
                return Ok(());
            }
            _ = interval.tick() => {
                for event in session.poll()? {
                    eprintln!();
                    println!("{}", serde_json::to_string(&event)?);
                }

                let now_ms = session.clock().now_ms();
                for alert in session.dispatcher_mut().take_due(now_ms)? {
                    log::info!("event=outbox_delivered module=cli id={}", alert.id);
                }

                if session.status() == TimerStatus::Idle {
                    eprintln!();
                    return Ok(());
                }

                let line = render_line(session);
                if line != last_line {
                    let mut stderr = std::io::stderr();
                    write!(stderr, "\r{line}")?;
                    stderr.flush()?;
                    last_line = line;
                }
            }
        }
    }
}

fn render_line(session: &CliSession) -> String {
    let progress = session.progress();
    let phase = progress
        .current_key
        .map_or("Done", |key| key.label());
    let state = match session.status() {
        TimerStatus::Paused => " (paused)",
        _ => "",
    };
    format!(
        "{phase:<6} {}  total {}{state}   ",
        display_time(get_remaining_seconds(progress.phase_remaining_ms)),
        display_time(get_remaining_seconds(progress.total_remaining_ms)),
    )
}
