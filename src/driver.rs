//! Monitor driver: the single owning event loop.
//!
//! Ticks the monitor on a fixed cadence and marshals probe replies from the
//! transport's tasks back onto this one task over a single-consumer channel,
//! so the state machine is only ever touched from one logical thread. Ticks
//! are strictly serialized; missed ticks are skipped, never bursted.

use std::time::Instant;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use crate::alert::AlertSink;
use crate::config::MonitorConfig;
use crate::link::LinkStatus;
use crate::monitor::{EventSink, Monitor};
use crate::probe::{ProbeReply, ProbeTransport};

/// Capacity of the probe reply channel. One probe is in flight at a time;
/// the slack only absorbs stale replies from abandoned probes.
pub const REPLY_CHANNEL_CAPACITY: usize = 8;

/// Owns the monitor and drives it to completion.
pub struct MonitorDriver<S, E, T, L> {
    monitor: Monitor<S, E>,
    transport: T,
    link: L,
    replies: mpsc::Receiver<ProbeReply>,
    interval: std::time::Duration,
}

impl<S, E, T, L> MonitorDriver<S, E, T, L>
where
    S: AlertSink,
    E: EventSink,
    T: ProbeTransport,
    L: LinkStatus,
{
    /// Create a driver around an already-constructed monitor.
    ///
    /// `replies` must be the receiving half of the channel the transport
    /// sends to; `config` supplies the polling cadence.
    pub fn new(
        monitor: Monitor<S, E>,
        transport: T,
        link: L,
        replies: mpsc::Receiver<ProbeReply>,
        config: &MonitorConfig,
    ) -> Self {
        Self {
            monitor,
            transport,
            link,
            replies,
            interval: config.effective_interval(),
        }
    }

    /// Run until the shutdown signal fires.
    ///
    /// Returns the monitor so a host can inspect or rebuild it after a
    /// graceful stop.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Monitor<S, E> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            target = %self.monitor.target(),
            interval = ?self.interval,
            "Monitor started"
        );

        let mut replies_open = true;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let link_up = self.link.is_up();
                    self.monitor.tick(&mut self.transport, link_up, Instant::now());
                }
                reply = self.replies.recv(), if replies_open => {
                    match reply {
                        Some(ProbeReply { seq, success }) => {
                            self.monitor.on_probe_result(seq, success);
                        }
                        // All transport senders dropped; keep ticking, the
                        // watchdog covers probes that can no longer answer.
                        None => replies_open = false,
                    }
                }
                _ = shutdown.changed() => {
                    tracing::info!("Monitor shutting down");
                    break;
                }
            }
        }

        self.monitor
    }
}
