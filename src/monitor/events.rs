//! Monitor observability events.
//!
//! Typed, human-diagnostic events emitted by the state machine for the
//! conditions an operator cares about. There is no wire format; the default
//! sink renders them through `tracing`.

use std::net::IpAddr;
use std::time::Duration;

/// Diagnostic event emitted by the monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// The transport could not start a probe this cycle; the cycle was
    /// skipped and will be retried on the next tick.
    DispatchFailed { reason: String },

    /// No reply arrived within the watchdog bound; the in-flight flag was
    /// force-cleared. Indicates a transport-layer defect, never fatal.
    WatchdogReset { in_flight_for: Duration },

    /// Consecutive failures reached the threshold; a pulse alert was raised.
    ThresholdCrossed { target: IpAddr, failures: u32 },

    /// A probe succeeded after one or more failures.
    Recovered { failures: u32 },
}

/// Consumer of monitor events.
pub trait EventSink {
    fn emit(&mut self, event: MonitorEvent);
}

/// Event sink that renders events through `tracing`.
///
/// Severity mapping: dispatch failures and watchdog resets are warnings,
/// threshold crossings are errors, recoveries are informational.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&mut self, event: MonitorEvent) {
        match event {
            MonitorEvent::DispatchFailed { reason } => {
                tracing::warn!(reason = %reason, "Failed to dispatch probe");
            }
            MonitorEvent::WatchdogReset { in_flight_for } => {
                tracing::warn!(
                    in_flight_for = ?in_flight_for,
                    "Watchdog: probe reply never arrived, resetting"
                );
            }
            MonitorEvent::ThresholdCrossed { target, failures } => {
                tracing::error!(target = %target, failures, "Failure threshold hit");
            }
            MonitorEvent::Recovered { failures } => {
                tracing::info!(failures, "Recovered after failures");
            }
        }
    }
}
