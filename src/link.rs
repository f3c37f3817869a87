//! Host link-layer connectivity signal.
//!
//! The monitor consults [`LinkStatus`] at the start of every tick so that a
//! link-layer outage on the host is not misread as the target being down.
//! What a link-down tick does is a policy point, see [`LinkDownPolicy`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

/// Source of the host's link-layer connectivity state, polled each tick.
pub trait LinkStatus {
    fn is_up(&self) -> bool;
}

/// Link source that always reports up.
///
/// For hosts without a usable link signal; the probe itself then carries the
/// full burden of detecting outages.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysUp;

impl LinkStatus for AlwaysUp {
    fn is_up(&self) -> bool {
        true
    }
}

/// Shared link flag an embedding host can flip from its own network stack.
#[derive(Debug, Clone)]
pub struct SharedLink {
    up: Arc<AtomicBool>,
}

impl SharedLink {
    /// Create a link flag with the given initial state.
    pub fn new(up: bool) -> Self {
        Self {
            up: Arc::new(AtomicBool::new(up)),
        }
    }

    pub fn set_up(&self, up: bool) {
        self.up.store(up, Ordering::Relaxed);
    }
}

impl LinkStatus for SharedLink {
    fn is_up(&self) -> bool {
        self.up.load(Ordering::Relaxed)
    }
}

/// What a tick does while the host link is down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkDownPolicy {
    /// Skip the tick entirely. The target is unreachable for reasons
    /// unrelated to the target, so nothing is counted.
    #[default]
    Ignore,
    /// Treat the tick as a probe failure without dispatching. An in-flight
    /// probe is abandoned; its late reply is discarded.
    CountAsFailure,
}
