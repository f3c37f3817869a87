//! Alert sink abstraction.
//!
//! The monitor publishes a single boolean alert state through an
//! [`AlertSink`]. Sinks must be idempotent: re-publishing the current value
//! has no downstream side effect, so the monitor may publish defensively
//! without double-triggering host automations.

/// Boolean alert-state publisher.
pub trait AlertSink {
    /// Publish the alert state. Publishing the currently-published value
    /// must be side-effect-free.
    fn publish(&mut self, active: bool);

    /// Currently-published alert state.
    fn is_active(&self) -> bool;
}

/// Log-backed alert sink.
///
/// Tracks the published state and emits a log line on transitions only,
/// swallowing redundant publishes.
#[derive(Debug, Default)]
pub struct LogAlertSink {
    active: bool,
}

impl LogAlertSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlertSink for LogAlertSink {
    fn publish(&mut self, active: bool) {
        if self.active == active {
            return;
        }
        self.active = active;
        if active {
            tracing::warn!("Alert raised");
        } else {
            tracing::info!("Alert cleared");
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
