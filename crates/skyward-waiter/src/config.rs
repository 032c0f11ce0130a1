//! Waiter configuration

use std::time::Duration;

/// Absent polls tolerated before giving up when a target is expected
pub const DEFAULT_NOT_FOUND_CHECKS: u32 = 20;

/// Consecutive target polls required by default
pub const DEFAULT_CONTINUOUS_TARGET_OCCURRENCE: u32 = 1;

/// How long an in-flight poll may still finish after the timeout fires
pub const REFRESH_GRACE_PERIOD: Duration = Duration::from_secs(30);

/// Poll intervals at or above this are ignored in favour of backoff
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(180);

/// Ceiling applied to the backoff interval
pub const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Starting point for backoff growth
pub const INITIAL_BACKOFF: Duration = Duration::from_millis(100);

/// Parameters of a single wait
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// States that keep the wait going
    pub pending: Vec<String>,

    /// States that satisfy the wait. Empty means "wait until the resource is gone".
    pub target: Vec<String>,

    /// Maximum time to wait before the grace period starts
    pub timeout: Duration,

    /// Quiet period before the first poll
    pub delay: Duration,

    /// Smallest spacing between polls
    pub min_timeout: Duration,

    /// Fixed spacing overriding backoff. Only honoured when positive and below
    /// [`MAX_POLL_INTERVAL`].
    pub poll_interval: Option<Duration>,

    /// Number of absent polls to tolerate while a target is expected. Zero
    /// means [`DEFAULT_NOT_FOUND_CHECKS`].
    pub not_found_checks: u32,

    /// Number of consecutive target polls required
    pub continuous_target_occurrence: u32,

    /// Extra time granted to an in-flight poll after `timeout`
    pub grace_period: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            target: Vec::new(),
            timeout: Duration::from_secs(60),
            delay: Duration::ZERO,
            min_timeout: Duration::ZERO,
            poll_interval: None,
            not_found_checks: DEFAULT_NOT_FOUND_CHECKS,
            continuous_target_occurrence: DEFAULT_CONTINUOUS_TARGET_OCCURRENCE,
            grace_period: REFRESH_GRACE_PERIOD,
        }
    }
}

impl WaitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pending<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pending = states.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_target<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target = states.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_min_timeout(mut self, min_timeout: Duration) -> Self {
        self.min_timeout = min_timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn with_not_found_checks(mut self, checks: u32) -> Self {
        self.not_found_checks = checks;
        self
    }

    pub fn with_continuous_target_occurrence(mut self, occurrence: u32) -> Self {
        self.continuous_target_occurrence = occurrence;
        self
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// The poll interval, if it is usable as a fixed override
    pub fn effective_poll_interval(&self) -> Option<Duration> {
        self.poll_interval
            .filter(|interval| !interval.is_zero() && *interval < MAX_POLL_INTERVAL)
    }

    /// Target occurrences required, never less than one
    pub fn required_occurrences(&self) -> u32 {
        self.continuous_target_occurrence.max(1)
    }

    /// Absent polls tolerated, with zero falling back to the default
    pub fn not_found_limit(&self) -> u32 {
        if self.not_found_checks == 0 {
            DEFAULT_NOT_FOUND_CHECKS
        } else {
            self.not_found_checks
        }
    }

    /// Whether this wait is satisfied by the resource disappearing
    pub fn waits_for_absence(&self) -> bool {
        self.target.is_empty()
    }
}
