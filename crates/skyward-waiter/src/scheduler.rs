//! Background polling task
//!
//! Calls the refresh callback one poll at a time, classifies each
//! observation and hands every result to the coordinator over a single-slot
//! channel before sleeping again.

use crate::backoff::Backoff;
use crate::config::WaitConfig;
use crate::error::WaitError;
use crate::refresh::{Observation, Refresh};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Classification of one poll
#[derive(Debug)]
pub(crate) enum PollStatus {
    /// Not there yet
    InProgress,
    /// Target reached (or resource gone, for absence waits)
    Converged,
    /// The refresh callback failed
    Errored(anyhow::Error),
    /// Classified failure, no further polling
    Rejected(WaitError),
}

/// Snapshot of one poll, handed from the scheduler to the coordinator by value
#[derive(Debug)]
pub(crate) struct PollResult<T> {
    pub payload: Option<T>,
    pub state: String,
    pub status: PollStatus,
}

impl<T> PollResult<T> {
    pub(crate) fn is_terminal(&self) -> bool {
        !matches!(self.status, PollStatus::InProgress)
    }
}

/// Streak and not-found bookkeeping for one wait
#[derive(Debug)]
pub(crate) struct Tracker {
    pending: Vec<String>,
    target: Vec<String>,
    not_found_checks: u32,
    required: u32,
    not_found: u32,
    streak: u32,
    streak_state: Option<String>,
}

impl Tracker {
    pub(crate) fn new(config: &WaitConfig) -> Self {
        Self {
            pending: config.pending.clone(),
            target: config.target.clone(),
            not_found_checks: config.not_found_limit(),
            required: config.required_occurrences(),
            not_found: 0,
            streak: 0,
            streak_state: None,
        }
    }

    /// True while consecutive target confirmations are being collected
    pub(crate) fn converging(&self) -> bool {
        self.streak > 0
    }

    fn reset_streak(&mut self) {
        self.streak = 0;
        self.streak_state = None;
    }

    fn extend_streak(&mut self, state: &str) -> bool {
        if self.streak_state.as_deref() == Some(state) {
            self.streak += 1;
        } else {
            self.streak = 1;
            self.streak_state = Some(state.to_string());
        }
        self.streak >= self.required
    }

    pub(crate) fn classify<T>(&mut self, observation: Observation<T>) -> PollResult<T> {
        let Observation { payload, state } = observation;

        let status = match payload {
            None if self.target.is_empty() => {
                self.streak += 1;
                if self.streak >= self.required {
                    PollStatus::Converged
                } else {
                    PollStatus::InProgress
                }
            }
            None => {
                self.reset_streak();
                self.not_found += 1;
                if self.not_found > self.not_found_checks {
                    PollStatus::Rejected(WaitError::NotFound {
                        last_error: None,
                        retries: self.not_found,
                    })
                } else {
                    PollStatus::InProgress
                }
            }
            Some(_) => {
                self.not_found = 0;
                if self.target.iter().any(|t| *t == state) {
                    if self.extend_streak(&state) {
                        PollStatus::Converged
                    } else {
                        PollStatus::InProgress
                    }
                } else {
                    self.reset_streak();
                    if !self.pending.is_empty() && !self.pending.iter().any(|p| *p == state) {
                        PollStatus::Rejected(WaitError::UnexpectedState {
                            last_error: None,
                            state: state.clone(),
                            expected: self.target.clone(),
                        })
                    } else {
                        PollStatus::InProgress
                    }
                }
            }
        };

        PollResult {
            payload,
            state,
            status,
        }
    }
}

/// The polling side of a wait
pub(crate) struct Scheduler<T, R> {
    refresh: R,
    tracker: Tracker,
    backoff: Backoff,
    delay: Duration,
    results: mpsc::Sender<PollResult<T>>,
    stop: CancellationToken,
}

impl<T, R> Scheduler<T, R>
where
    T: Send + 'static,
    R: Refresh<T> + 'static,
{
    pub(crate) fn new(
        config: &WaitConfig,
        refresh: R,
        results: mpsc::Sender<PollResult<T>>,
        stop: CancellationToken,
    ) -> Self {
        Self {
            refresh,
            tracker: Tracker::new(config),
            backoff: Backoff::new(config),
            delay: config.delay,
            results,
            stop,
        }
    }

    pub(crate) async fn run(mut self) {
        if !pause(&self.stop, self.delay).await {
            return;
        }

        loop {
            let result = match self.refresh.refresh().await {
                Ok(observation) => self.tracker.classify(observation),
                Err(err) => PollResult {
                    payload: None,
                    state: String::new(),
                    status: PollStatus::Errored(err),
                },
            };

            // Sent even after a stop request: the coordinator may be inside
            // its grace period waiting for exactly this result.
            let terminal = result.is_terminal();
            if self.results.send(result).await.is_err() || terminal {
                return;
            }

            let wait = self.backoff.next(self.tracker.converging());
            tracing::trace!("Waiting {:?} before next refresh", wait);

            if !pause(&self.stop, wait).await {
                return;
            }
        }
    }
}

/// Sleeps for `duration`. Returns false if a stop was requested before or
/// during the sleep.
async fn pause(stop: &CancellationToken, duration: Duration) -> bool {
    if stop.is_cancelled() {
        return false;
    }

    tokio::select! {
        biased;
        _ = stop.cancelled() => false,
        _ = sleep(duration) => !stop.is_cancelled(),
    }
}
