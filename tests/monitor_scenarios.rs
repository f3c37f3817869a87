//! End-to-end scenarios for the liveness monitor.
//!
//! Drives the public API with a scriptable transport and recording sinks,
//! covering the alert pulse law, overlap protection, watchdog recovery and
//! stale-reply handling.

use std::net::IpAddr;
use std::time::{Duration, Instant};

use linkpulse::{
    AlertSink, EventSink, LinkDownPolicy, Monitor, MonitorConfig, MonitorDriver, MonitorEvent,
    ProbeError, ProbeReply, ProbeTransport, SharedLink, REPLY_CHANNEL_CAPACITY,
};
use tokio::sync::{mpsc, watch};

const INTERVAL: Duration = Duration::from_secs(10);
const TIMEOUT: Duration = Duration::from_secs(1);

// =============================================================================
// Test Collaborators
// =============================================================================

/// Sink recording the full publish history.
#[derive(Default)]
struct RecordingSink {
    history: Vec<bool>,
    active: bool,
}

impl AlertSink for RecordingSink {
    fn publish(&mut self, active: bool) {
        self.history.push(active);
        self.active = active;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Default)]
struct RecordingEvents(Vec<MonitorEvent>);

impl EventSink for RecordingEvents {
    fn emit(&mut self, event: MonitorEvent) {
        self.0.push(event);
    }
}

/// Transport recording dispatched sequence numbers.
#[derive(Default)]
struct RecordingTransport {
    dispatched: Vec<u64>,
}

impl ProbeTransport for RecordingTransport {
    fn dispatch(&mut self, _target: IpAddr, seq: u64, _timeout: Duration) -> Result<(), ProbeError> {
        self.dispatched.push(seq);
        Ok(())
    }
}

impl RecordingTransport {
    fn last_seq(&self) -> u64 {
        *self.dispatched.last().expect("no probe dispatched")
    }
}

fn new_monitor(threshold: u32) -> Monitor<RecordingSink, RecordingEvents> {
    Monitor::new(
        "192.0.2.1".parse().unwrap(),
        threshold,
        TIMEOUT,
        LinkDownPolicy::Ignore,
        RecordingSink::default(),
        RecordingEvents::default(),
    )
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn three_failures_pulse_then_quiet_fourth_tick() {
    let mut monitor = new_monitor(3);
    let mut transport = RecordingTransport::default();
    let t0 = Instant::now();

    for i in 0..3u32 {
        monitor.tick(&mut transport, true, t0 + INTERVAL * i);
        monitor.on_probe_result(transport.last_seq(), false);
    }

    // Alert pulse raised on the third failure, counter already reset.
    assert_eq!(monitor.sink().history, vec![false, true]);
    assert_eq!(monitor.consecutive_failures(), 0);
    assert!(monitor.pulse_pending());

    // Fourth tick with link up: trailing edge, then a normal dispatch.
    monitor.tick(&mut transport, true, t0 + INTERVAL * 3);
    assert_eq!(monitor.sink().history, vec![false, true, false]);
    assert!(!monitor.pulse_pending());
    assert_eq!(monitor.consecutive_failures(), 0);
    assert_eq!(transport.dispatched.len(), 4);
}

#[test]
fn two_failures_then_success_recovers_without_alert() {
    let mut monitor = new_monitor(3);
    let mut transport = RecordingTransport::default();
    let t0 = Instant::now();

    for (i, success) in [false, false, true].into_iter().enumerate() {
        monitor.tick(&mut transport, true, t0 + INTERVAL * i as u32);
        monitor.on_probe_result(transport.last_seq(), success);
    }

    assert_eq!(monitor.consecutive_failures(), 0);
    assert_eq!(monitor.sink().history, vec![false]);
    assert_eq!(
        monitor.events().0,
        vec![MonitorEvent::Recovered { failures: 2 }]
    );
}

#[test]
fn in_flight_probe_blocks_further_dispatch() {
    let mut monitor = new_monitor(3);
    let mut transport = RecordingTransport::default();
    let t0 = Instant::now();

    monitor.tick(&mut transport, true, t0);
    // Two more ticks inside the watchdog bound (5x timeout = 5s).
    monitor.tick(&mut transport, true, t0 + Duration::from_secs(2));
    monitor.tick(&mut transport, true, t0 + Duration::from_secs(4));

    assert_eq!(transport.dispatched.len(), 1);
}

#[test]
fn watchdog_unsticks_a_probe_that_never_answers() {
    let mut monitor = new_monitor(3);
    let mut transport = RecordingTransport::default();
    let t0 = Instant::now();

    monitor.tick(&mut transport, true, t0);
    let lost = transport.last_seq();

    // No reply ever arrives; past the bound the next tick probes afresh.
    monitor.tick(&mut transport, true, t0 + Duration::from_secs(6));
    assert_eq!(transport.dispatched.len(), 2);
    assert!(monitor.in_flight());
    assert!(matches!(
        monitor.events().0.as_slice(),
        [MonitorEvent::WatchdogReset { .. }]
    ));

    // The lost probe's reply finally arriving must change nothing.
    monitor.on_probe_result(lost, false);
    assert_eq!(monitor.consecutive_failures(), 0);
    assert!(monitor.in_flight());
}

#[test]
fn alert_pulses_never_overlap() {
    let mut monitor = new_monitor(2);
    let mut transport = RecordingTransport::default();
    let t0 = Instant::now();

    // Eight consecutive failures with threshold 2: two full pulses.
    for i in 0..8u32 {
        monitor.tick(&mut transport, true, t0 + INTERVAL * i);
        monitor.on_probe_result(transport.last_seq(), false);
    }
    monitor.tick(&mut transport, true, t0 + INTERVAL * 8);

    // Every true is followed by a false before the next true.
    let history = &monitor.sink().history;
    for pair in history.windows(2) {
        assert_ne!(pair[0], pair[1], "publish history {history:?} repeats a value");
    }
    assert_eq!(history.iter().filter(|&&v| v).count(), 4);
}

#[test]
fn link_down_ticks_do_not_count_by_default() {
    let mut monitor = new_monitor(2);
    let mut transport = RecordingTransport::default();
    let t0 = Instant::now();

    for i in 0..5u32 {
        monitor.tick(&mut transport, false, t0 + INTERVAL * i);
    }

    assert!(transport.dispatched.is_empty());
    assert_eq!(monitor.consecutive_failures(), 0);
    assert_eq!(monitor.sink().history, vec![false]);
}

#[test]
fn link_down_policy_can_count_outages() {
    let mut monitor = Monitor::new(
        "192.0.2.1".parse().unwrap(),
        2,
        TIMEOUT,
        LinkDownPolicy::CountAsFailure,
        RecordingSink::default(),
        RecordingEvents::default(),
    );
    let mut transport = RecordingTransport::default();
    let t0 = Instant::now();

    monitor.tick(&mut transport, false, t0);
    monitor.tick(&mut transport, false, t0 + INTERVAL);

    assert!(transport.dispatched.is_empty());
    assert!(monitor.pulse_pending());
    assert_eq!(monitor.sink().history, vec![false, true]);
}

// =============================================================================
// Driver Integration
// =============================================================================

/// Transport answering each dispatch from a scripted list of outcomes.
struct ScriptedTransport {
    tx: mpsc::Sender<ProbeReply>,
    script: Vec<bool>,
    next: usize,
}

impl ProbeTransport for ScriptedTransport {
    fn dispatch(&mut self, _target: IpAddr, seq: u64, _timeout: Duration) -> Result<(), ProbeError> {
        let success = self.script.get(self.next).copied().unwrap_or(true);
        self.next += 1;
        self.tx
            .try_send(ProbeReply { seq, success })
            .map_err(|_| ProbeError::ChannelClosed)
    }
}

#[tokio::test(start_paused = true)]
async fn driver_raises_and_clears_pulse_through_full_stack() {
    let (tx, rx) = mpsc::channel(REPLY_CHANNEL_CAPACITY);
    let config = MonitorConfig::new("192.0.2.1")
        .with_threshold(3)
        .with_interval(INTERVAL)
        .with_timeout(TIMEOUT);

    let link = SharedLink::new(true);
    let monitor = Monitor::new(
        "192.0.2.1".parse().unwrap(),
        3,
        TIMEOUT,
        LinkDownPolicy::Ignore,
        RecordingSink::default(),
        RecordingEvents::default(),
    );
    let transport = ScriptedTransport {
        tx,
        script: vec![false, false, false, true],
        next: 0,
    };
    let driver = MonitorDriver::new(monitor, transport, link, rx, &config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(driver.run(shutdown_rx));

    // Five cycles: three failures (pulse), trailing edge + success.
    for _ in 0..5 {
        tokio::time::sleep(INTERVAL).await;
    }

    shutdown_tx.send(true).unwrap();
    let monitor = handle.await.unwrap();

    let history = &monitor.sink().history;
    assert!(
        history.starts_with(&[false, true, false]),
        "unexpected publish history {history:?}"
    );
    assert!(!monitor.pulse_pending());
    assert_eq!(monitor.consecutive_failures(), 0);
    assert!(monitor
        .events()
        .0
        .iter()
        .any(|e| matches!(e, MonitorEvent::ThresholdCrossed { failures: 3, .. })));
}
