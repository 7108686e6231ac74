use clap::Subcommand;
use serde::Serialize;
use timedancers_core::storage::settings;
use timedancers_core::timer::{Phase, PhaseSeconds};
use timedancers_core::Config;

use super::{open_session, print_json, CliResult, CliSession};

#[derive(Subcommand)]
pub enum PhasesAction {
    /// Show stored overrides and the phases the next session will use
    Show,
    /// Override phase durations in seconds; omitted phases follow the minutes split
    Set {
        #[arg(long)]
        power: Option<u64>,
        #[arg(long)]
        heart: Option<u64>,
        #[arg(long)]
        wisdom: Option<u64>,
    },
    /// Remove all overrides
    Clear,
}

#[derive(Serialize)]
struct PhasesReport<'a> {
    minutes_input: &'a str,
    overrides: PhaseSeconds,
    phases: &'a [Phase],
    total_ms: u64,
}

fn print_report(session: &CliSession) -> CliResult {
    let overrides = settings::get_phase_seconds(session.store())?;
    print_json(&PhasesReport {
        minutes_input: session.minutes_input(),
        overrides,
        phases: session.timer().phases(),
        total_ms: session.timer().total_ms(),
    })
}

pub fn run(action: PhasesAction, config: &Config) -> CliResult {
    let mut session = open_session(config)?;

    match action {
        PhasesAction::Show => {}
        PhasesAction::Set {
            power,
            heart,
            wisdom,
        } => {
            let overrides = PhaseSeconds {
                power,
                heart,
                wisdom,
            };
            if !overrides.is_active() {
                return Err("at least one of --power, --heart, --wisdom must be above zero".into());
            }
            settings::set_phase_seconds(session.store(), &overrides)?;
            refresh_idle(&mut session)?;
        }
        PhasesAction::Clear => {
            settings::clear_phase_seconds(session.store())?;
            refresh_idle(&mut session)?;
        }
    }

    print_report(&session)
}

fn refresh_idle(session: &mut CliSession) -> CliResult {
    let minutes = session.minutes_input().to_string();
    if session.apply_idle_phases(&minutes)?.is_none() && session.timer().is_started() {
        log::info!("event=phases_deferred module=cli reason=session_in_progress");
    }
    Ok(())
}
