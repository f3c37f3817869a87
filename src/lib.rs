//! linkpulse - Connectivity-Liveness Monitor
//!
//! Periodically probes a fixed target address with an ICMP echo request,
//! counts consecutive failures, and raises a short pulse alert when a
//! failure threshold is crossed. Built to tolerate delayed, dropped or
//! stale probe replies: at most one probe is ever in flight, a watchdog
//! recovers from transport callbacks that never arrive, and the alert is
//! an edge pulse rather than a sticky flag.
//!
//! # Architecture
//!
//! - **Monitor**: the failure-accumulation state machine ([`Monitor`])
//! - **Probe transport**: fire-and-forget ICMP echo ([`IcmpTransport`])
//! - **Driver**: the single owning event loop that serializes ticks and
//!   probe replies ([`MonitorDriver`])
//! - **Alert sink / link status**: host integration seams ([`AlertSink`],
//!   [`LinkStatus`])
//!
//! # Example
//!
//! ```rust,no_run
//! use linkpulse::{
//!     AlwaysUp, AppConfig, IcmpTransport, LogAlertSink, LogEventSink, Monitor, MonitorDriver,
//!     REPLY_CHANNEL_CAPACITY,
//! };
//! use tokio::sync::{mpsc, watch};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load("config.yaml")?;
//!     config.validate()?;
//!
//!     let (reply_tx, reply_rx) = mpsc::channel(REPLY_CHANNEL_CAPACITY);
//!     let monitor = Monitor::from_config(&config.monitor, LogAlertSink::new(), LogEventSink)?;
//!     let driver = MonitorDriver::new(
//!         monitor,
//!         IcmpTransport::new(reply_tx),
//!         AlwaysUp,
//!         reply_rx,
//!         &config.monitor,
//!     );
//!
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!     driver.run(shutdown_rx).await;
//!     Ok(())
//! }
//! ```

pub mod alert;
pub mod config;
pub mod driver;
pub mod link;
pub mod monitor;
pub mod probe;

pub use alert::{AlertSink, LogAlertSink};
pub use config::{AppConfig, ConfigError, MonitorConfig};
pub use driver::{MonitorDriver, REPLY_CHANNEL_CAPACITY};
pub use link::{AlwaysUp, LinkDownPolicy, LinkStatus, SharedLink};
pub use monitor::{EventSink, LogEventSink, Monitor, MonitorEvent};
pub use probe::{IcmpTransport, ProbeError, ProbeReply, ProbeTransport};
