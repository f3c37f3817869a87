//! Failure-accumulation state machine.
//!
//! Counts consecutive probe failures against a fixed target and raises a
//! pulse alert when a threshold is crossed. Tolerates delayed, dropped and
//! stale probe replies while guaranteeing that at most one probe is ever in
//! flight.
//!
//! The monitor is not thread-safe: `tick()` and `on_probe_result()` must only
//! ever run on the single owning task (see [`crate::driver`], which marshals
//! transport replies back onto that task).

use std::net::IpAddr;
use std::time::{Duration, Instant};

use crate::alert::AlertSink;
use crate::config::{ConfigError, MonitorConfig};
use crate::link::LinkDownPolicy;
use crate::monitor::events::{EventSink, MonitorEvent};
use crate::probe::ProbeTransport;

/// Watchdog bound as a multiple of the probe timeout. A probe with no reply
/// after this many timeouts is considered lost by the transport.
pub const WATCHDOG_TIMEOUT_FACTOR: u32 = 5;

/// Probe phase. A second in-flight probe is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Probing { started_at: Instant, seq: u64 },
}

/// Connectivity-liveness monitor for a single target.
///
/// Driven externally: `tick()` once per fixed interval, `on_probe_result()`
/// once per completed probe. Alerts are pulses: `true` on the tick whose
/// result crosses the threshold, `false` again on the following tick.
pub struct Monitor<S, E> {
    target: IpAddr,
    threshold: u32,
    probe_timeout: Duration,
    watchdog_bound: Duration,
    link_down_policy: LinkDownPolicy,
    phase: Phase,
    pulse_pending: bool,
    consecutive_failures: u32,
    seq: u64,
    sink: S,
    events: E,
}

impl<S, E> std::fmt::Debug for Monitor<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("target", &self.target)
            .field("threshold", &self.threshold)
            .field("phase", &self.phase)
            .field("pulse_pending", &self.pulse_pending)
            .field("consecutive_failures", &self.consecutive_failures)
            .finish_non_exhaustive()
    }
}

impl<S: AlertSink, E: EventSink> Monitor<S, E> {
    /// Create a monitor from already-validated parts.
    ///
    /// The alert sink is initialized to `false` so the host observes a known
    /// state before the first probe.
    pub fn new(
        target: IpAddr,
        threshold: u32,
        probe_timeout: Duration,
        link_down_policy: LinkDownPolicy,
        mut sink: S,
        events: E,
    ) -> Self {
        sink.publish(false);
        Self {
            target,
            threshold: threshold.max(1),
            probe_timeout,
            watchdog_bound: probe_timeout * WATCHDOG_TIMEOUT_FACTOR,
            link_down_policy,
            phase: Phase::Idle,
            pulse_pending: false,
            consecutive_failures: 0,
            seq: 0,
            sink,
            events,
        }
    }

    /// Create a monitor from validated configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the configuration fails validation, in
    /// particular when the target is not a literal IP address.
    pub fn from_config(config: &MonitorConfig, sink: S, events: E) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            config.target_addr()?,
            config.threshold,
            config.timeout,
            config.link_down_policy,
            sink,
            events,
        ))
    }

    /// Run one monitoring cycle.
    ///
    /// `link_up` is the host's link-layer state this tick; `now` is the tick
    /// timestamp (injected so the watchdog is testable).
    pub fn tick<T: ProbeTransport>(&mut self, transport: &mut T, link_up: bool, now: Instant) {
        if !link_up {
            match self.link_down_policy {
                LinkDownPolicy::Ignore => {
                    tracing::trace!("Link down, skipping cycle");
                    return;
                }
                LinkDownPolicy::CountAsFailure => {
                    self.clear_pending_pulse();
                    if matches!(self.phase, Phase::Probing { .. }) {
                        // The outstanding reply is meaningless now.
                        tracing::debug!("Link down, abandoning in-flight probe");
                        self.phase = Phase::Idle;
                    }
                    self.record_failure();
                    return;
                }
            }
        }

        // Trailing edge of the alert pulse, always before a new dispatch so a
        // pulse never straddles a new probe's result.
        self.clear_pending_pulse();

        if let Phase::Probing { started_at, .. } = self.phase {
            let elapsed = now.saturating_duration_since(started_at);
            if elapsed < self.watchdog_bound {
                // Probe still in flight, skip this cycle.
                return;
            }
            self.phase = Phase::Idle;
            self.events.emit(MonitorEvent::WatchdogReset {
                in_flight_for: elapsed,
            });
        }

        self.seq = self.seq.wrapping_add(1);
        match transport.dispatch(self.target, self.seq, self.probe_timeout) {
            Ok(()) => {
                self.phase = Phase::Probing {
                    started_at: now,
                    seq: self.seq,
                };
            }
            Err(e) => {
                // No reply will ever arrive for a dispatch that failed here;
                // the cycle is skipped and retried on the next tick.
                self.events.emit(MonitorEvent::DispatchFailed {
                    reason: e.to_string(),
                });
            }
        }
    }

    /// Handle the reply for a dispatched probe.
    ///
    /// Replies whose sequence number does not match the in-flight probe are
    /// stale (the watchdog abandoned that probe, or the link-down policy
    /// did) and are discarded without touching any accounting.
    pub fn on_probe_result(&mut self, seq: u64, success: bool) {
        match self.phase {
            Phase::Probing { seq: in_flight, .. } if in_flight == seq => {
                self.phase = Phase::Idle;
            }
            _ => {
                tracing::debug!(seq, "Discarding stale probe reply");
                return;
            }
        }

        if success {
            if self.consecutive_failures > 0 {
                self.events.emit(MonitorEvent::Recovered {
                    failures: self.consecutive_failures,
                });
            }
            self.consecutive_failures = 0;
            // The sink should never be active on a healthy target outside
            // the pulse flow; clear it if the host left it latched.
            if self.sink.is_active() && !self.pulse_pending {
                self.sink.publish(false);
            }
        } else {
            self.record_failure();
        }
    }

    fn record_failure(&mut self) {
        self.consecutive_failures += 1;
        tracing::debug!(
            missed = self.consecutive_failures,
            threshold = self.threshold,
            "Probe missed"
        );
        if self.consecutive_failures >= self.threshold {
            self.events.emit(MonitorEvent::ThresholdCrossed {
                target: self.target,
                failures: self.consecutive_failures,
            });
            self.sink.publish(true);
            self.pulse_pending = true;
            // The alert is an edge, not a level: accumulation restarts after
            // every pulse instead of staying saturated.
            self.consecutive_failures = 0;
        }
    }

    fn clear_pending_pulse(&mut self) {
        if self.pulse_pending {
            self.pulse_pending = false;
            self.sink.publish(false);
        }
    }

    /// Monitored target address.
    pub fn target(&self) -> IpAddr {
        self.target
    }

    /// Current consecutive-failure count. Always below the threshold.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Whether a probe is currently in flight.
    pub fn in_flight(&self) -> bool {
        matches!(self.phase, Phase::Probing { .. })
    }

    /// Whether an alert pulse is waiting for its trailing edge.
    pub fn pulse_pending(&self) -> bool {
        self.pulse_pending
    }

    /// The alert sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The event sink.
    pub fn events(&self) -> &E {
        &self.events
    }
}
