//! Poll spacing
//!
//! The interval doubles after every poll that makes no progress towards the
//! target and stays put while target confirmations are being collected. A
//! usable fixed poll interval replaces the computed value outright; otherwise
//! the value is capped at [`MAX_BACKOFF`] and then raised to the configured
//! minimum, so a minimum above the cap wins.

use crate::config::{INITIAL_BACKOFF, MAX_BACKOFF, WaitConfig};
use std::time::Duration;

#[derive(Debug, Clone)]
pub(crate) struct Backoff {
    current: Duration,
    min: Duration,
    fixed: Option<Duration>,
}

impl Backoff {
    pub(crate) fn new(config: &WaitConfig) -> Self {
        Self {
            current: Duration::ZERO,
            min: config.min_timeout,
            fixed: config.effective_poll_interval(),
        }
    }

    /// Interval to sleep before the next poll.
    ///
    /// `converging` is true while the occurrence streak is non-zero.
    pub(crate) fn next(&mut self, converging: bool) -> Duration {
        let base = self.current.max(INITIAL_BACKOFF);
        let grown = if converging {
            base
        } else {
            base.saturating_mul(2)
        };

        self.current = match self.fixed {
            Some(interval) => interval,
            None => grown.min(MAX_BACKOFF).max(self.min),
        };
        self.current
    }
}
