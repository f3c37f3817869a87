//! Probe transports.
//!
//! A transport performs exactly one echo request per dispatch, with a bounded
//! timeout, and reports the outcome exactly once as a [`ProbeReply`] on the
//! reply channel — or never, which the monitor's watchdog covers.
//!
//! - [`IcmpTransport`]: ICMP echo via `surge-ping`

mod icmp;

use std::net::IpAddr;
use std::time::Duration;

use thiserror::Error;

pub use icmp::IcmpTransport;

/// Outcome of one dispatched probe.
///
/// `seq` echoes the sequence number the probe was dispatched with, so the
/// monitor can discard replies for probes it has already abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeReply {
    pub seq: u64,
    pub success: bool,
}

/// Errors that can occur when dispatching a probe.
///
/// These are synchronous dispatch failures only; a probe that was dispatched
/// but did not get an answer is reported as an unsuccessful [`ProbeReply`],
/// not an error.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Could not open the ICMP socket (resource exhaustion, missing
    /// privileges).
    #[error("failed to open icmp socket: {0}")]
    Socket(#[from] std::io::Error),

    /// The reply channel is closed; the monitor side is gone.
    #[error("probe reply channel closed")]
    ChannelClosed,
}

/// Fire-and-forget echo-request transport.
///
/// Contract: for every `Ok(())` dispatch, exactly one [`ProbeReply`] carrying
/// the same `seq` is eventually delivered. For an `Err`, no reply is ever
/// delivered. The transport owns any session resources between dispatch and
/// reply.
pub trait ProbeTransport {
    fn dispatch(&mut self, target: IpAddr, seq: u64, timeout: Duration) -> Result<(), ProbeError>;
}
