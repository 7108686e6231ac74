//! # Timedancers Core Library
//!
//! Core logic for the Timedancers guided meditation timer. A session is three
//! consecutive phases (Power, Heart, Wisdom); the timer derives its position
//! from the wall clock on every query, and the notification layer turns that
//! position into absolute-time alerts for when the host is in the background.
//! The CLI binary is a thin shell over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: Wall-clock-derived phase timer. Pure; every operation takes
//!   the current epoch milliseconds
//! - **Notify**: Background alert schedule, chime/haptic plans, daily
//!   reminder and the dispatcher seam to the OS notification service
//! - **Session**: Orchestration of the timer, alerts and app lifecycle
//! - **Storage**: SQLite key-value store and TOML configuration
//!
//! ## Key Components
//!
//! - [`TimerState`]: Session record and progress derivation
//! - [`compute_schedule_items`]: Remaining phase-boundary alerts
//! - [`SessionController`]: User controls, polling and lifecycle hooks
//! - [`Database`]: Persistent key-value store
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod notify;
pub mod session;
pub mod storage;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, DeliveryError, ValidationError};
pub use events::Event;
pub use notify::{compute_schedule_items, AlertMode, NotificationDispatcher, ScheduleItem};
pub use session::{AppState, SessionController};
pub use storage::{Config, Database, KvStore, MemoryStore};
pub use timer::{Phase, PhaseKey, Progress, TimerState, TimerStatus};
