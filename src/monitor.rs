//! Liveness monitor.
//!
//! - [`Monitor`]: failure-accumulation state machine with overlap protection,
//!   watchdog recovery and pulse alerting
//! - [`MonitorEvent`] / [`EventSink`]: typed diagnostic events

mod events;
mod machine;

pub use events::{EventSink, LogEventSink, MonitorEvent};
pub use machine::{Monitor, WATCHDOG_TIMEOUT_FACTOR};
