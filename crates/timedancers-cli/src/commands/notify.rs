use clap::Subcommand;
use serde::Serialize;
use timedancers_core::notify::{compute_schedule_items, DailyEntry, PendingAlert};
use timedancers_core::{Clock, Config};

use super::{open_session, print_json, CliResult};

#[derive(Subcommand)]
pub enum NotifyAction {
    /// Alerts the current session would schedule if backgrounded now
    Plan,
    /// Alerts waiting in the outbox
    Pending,
    /// Remove and print alerts that are due
    Deliver,
}

#[derive(Serialize)]
struct PendingReport<'a> {
    pending: &'a [PendingAlert],
    daily: &'a [DailyEntry],
}

pub fn run(action: NotifyAction, config: &Config) -> CliResult {
    let mut session = open_session(config)?;

    match action {
        NotifyAction::Plan => {
            let now_ms = session.clock().now_ms();
            let items = compute_schedule_items(session.timer(), session.alerts().mode, now_ms);
            print_json(&items)?;
        }
        NotifyAction::Pending => {
            let outbox = session.dispatcher();
            print_json(&PendingReport {
                pending: outbox.pending(),
                daily: outbox.daily(),
            })?;
        }
        NotifyAction::Deliver => {
            let now_ms = session.clock().now_ms();
            let due = session.dispatcher_mut().take_due(now_ms)?;
            log::info!("event=outbox_deliver module=cli count={}", due.len());
            print_json(&due)?;
        }
    }
    Ok(())
}
