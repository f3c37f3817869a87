//! ICMP echo transport backed by `surge-ping`.

use std::net::IpAddr;
use std::time::Duration;

use surge_ping::{Client, Config, ICMP, PingIdentifier, PingSequence};
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::probe::{ProbeError, ProbeReply, ProbeTransport};

/// ICMP echo-request transport.
///
/// Each dispatch opens a fresh ICMP client for the target's address family
/// and spawns a task that performs one ping with a bounded timeout, then
/// delivers exactly one [`ProbeReply`] on the channel. Socket creation
/// happens synchronously so resource exhaustion surfaces as a dispatch
/// error, not a lost probe.
///
/// Must be used from within a Tokio runtime.
#[derive(Debug, Clone)]
pub struct IcmpTransport {
    replies: mpsc::Sender<ProbeReply>,
}

impl IcmpTransport {
    /// Create a transport delivering replies to the given channel.
    pub fn new(replies: mpsc::Sender<ProbeReply>) -> Self {
        Self { replies }
    }
}

impl ProbeTransport for IcmpTransport {
    fn dispatch(
        &mut self,
        target: IpAddr,
        seq: u64,
        probe_timeout: Duration,
    ) -> Result<(), ProbeError> {
        if self.replies.is_closed() {
            return Err(ProbeError::ChannelClosed);
        }

        let client = match target {
            IpAddr::V4(_) => Client::new(&Config::default()),
            IpAddr::V6(_) => Client::new(&Config::builder().kind(ICMP::V6).build()),
        }?;

        let replies = self.replies.clone();
        tokio::spawn(async move {
            let mut pinger = client.pinger(target, PingIdentifier(rand::random())).await;
            pinger.timeout(probe_timeout);

            let result = timeout(probe_timeout, pinger.ping(PingSequence(seq as u16), &[])).await;
            let success = match result {
                Ok(Ok((_, rtt))) => {
                    tracing::debug!(target = %target, rtt_ms = rtt.as_secs_f64() * 1000.0, "Probe answered");
                    true
                }
                Ok(Err(e)) => {
                    tracing::debug!(target = %target, error = %e, "Probe failed");
                    false
                }
                Err(_) => {
                    tracing::debug!(target = %target, timeout_ms = probe_timeout.as_millis(), "Probe timed out");
                    false
                }
            };

            if replies.send(ProbeReply { seq, success }).await.is_err() {
                tracing::debug!("Monitor gone, dropping probe reply");
            }
        });

        Ok(())
    }
}
