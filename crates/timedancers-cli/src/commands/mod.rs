pub mod config;
pub mod notify;
pub mod phases;
pub mod reminder;
pub mod timer;

use std::io::Write;

use timedancers_core::error::DeliveryError;
use timedancers_core::notify::{AlertPlayer, Chime, HapticFeedback, Outbox};
use timedancers_core::{Config, Database, SessionController, SystemClock};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Controller wired to the data directory: SQLite store, file outbox and
/// terminal alerts.
pub type CliSession = SessionController<SystemClock, Database, Outbox, TerminalAlerts>;

pub fn open_session(config: &Config) -> Result<CliSession, Box<dyn std::error::Error>> {
    let session = SessionController::new(
        SystemClock,
        Database::open()?,
        Outbox::open()?,
        TerminalAlerts,
        config,
    )?;
    Ok(session)
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Rings the terminal bell for chimes. A terminal cannot vibrate, so haptics
/// are only logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalAlerts;

impl AlertPlayer for TerminalAlerts {
    fn play_chime(&mut self, chime: Chime, volume: u8) -> Result<(), DeliveryError> {
        if volume == 0 {
            return Ok(());
        }
        let mut stderr = std::io::stderr();
        write!(stderr, "\x07")
            .and_then(|_| stderr.flush())
            .map_err(|e| DeliveryError::Unavailable(e.to_string()))?;
        log::debug!("event=chime module=cli chime={chime:?} volume={volume}");
        Ok(())
    }

    fn haptic(&mut self, feedback: HapticFeedback) -> Result<(), DeliveryError> {
        log::debug!("event=haptic module=cli feedback={feedback:?}");
        Ok(())
    }
}
