//! Coordinator side of a wait
//!
//! [`Waiter::wait`] spawns the polling task, then races three events: a new
//! poll result, the caller's cancellation token and the configured timeout.
//! A timeout does not abandon the wait straight away. The polling task is
//! told to stop and one in-flight poll gets [`WaitConfig::grace_period`] to
//! deliver its result, since that result may already prove success.

use crate::config::WaitConfig;
use crate::error::{Result, WaitError};
use crate::refresh::Refresh;
use crate::scheduler::{PollResult, PollStatus, Scheduler};
use std::marker::PhantomData;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Polls a remote resource until it converges on a target state
pub struct Waiter<T, R> {
    config: WaitConfig,
    refresh: R,
    _payload: PhantomData<fn() -> T>,
}

impl<T, R> Waiter<T, R>
where
    T: Send + 'static,
    R: Refresh<T> + 'static,
{
    pub fn new(config: WaitConfig, refresh: R) -> Self {
        Self {
            config,
            refresh,
            _payload: PhantomData,
        }
    }

    /// Wait for the resource to reach a target state, or to disappear when no
    /// target is configured.
    ///
    /// # Returns
    /// * `Ok(Some(payload))` - the payload of the poll that completed the wait
    /// * `Ok(None)` - the resource is gone (absence waits)
    /// * `Err(WaitError)` - classified failure, refresh error or cancellation
    pub async fn wait(self, cancel: &CancellationToken) -> Result<Option<T>> {
        let Waiter {
            config, refresh, ..
        } = self;

        tracing::debug!("Waiting for state to become: {:?}", config.target);

        // Only the coordinator stops the polling task, so a closed channel
        // never races the caller's cancellation.
        let (tx, mut rx) = mpsc::channel(1);
        let stop = CancellationToken::new();
        let _stop_on_drop = stop.clone().drop_guard();
        tokio::spawn(Scheduler::new(&config, refresh, tx, stop.clone()).run());

        let mut last_state = String::new();
        let timeout = sleep(config.timeout);
        tokio::pin!(timeout);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    stop.cancel();
                    return Err(WaitError::Cancelled);
                }
                received = rx.recv() => match received {
                    Some(PollResult { payload, status: PollStatus::Converged, .. }) => {
                        return Ok(payload);
                    }
                    Some(PollResult { status: PollStatus::Errored(err), .. }) => {
                        return Err(WaitError::Refresh(err));
                    }
                    Some(PollResult { status: PollStatus::Rejected(err), .. }) => {
                        return Err(err);
                    }
                    Some(PollResult { state, .. }) => last_state = state,
                    None => {
                        return Err(WaitError::SchedulerAborted { last_state });
                    }
                },
                _ = &mut timeout => break,
            }
        }

        tracing::warn!("Wait timed out after {:?}", config.timeout);
        tracing::warn!("Starting {:?} refresh grace period", config.grace_period);
        stop.cancel();

        let mut last_error = None;
        let grace = sleep(config.grace_period);
        tokio::pin!(grace);

        loop {
            tokio::select! {
                received = rx.recv() => match received {
                    Some(PollResult { payload, status: PollStatus::Converged, .. }) => {
                        return Ok(payload);
                    }
                    Some(PollResult { status: PollStatus::Rejected(err), .. }) => {
                        return Err(err);
                    }
                    Some(PollResult { status: PollStatus::Errored(err), .. }) => {
                        last_error = Some(err);
                    }
                    Some(PollResult { state, .. }) => last_state = state,
                    None => break,
                },
                _ = cancel.cancelled() => {
                    tracing::error!("Cancellation detected, abandoning grace period");
                    break;
                }
                _ = &mut grace => {
                    tracing::error!("Refresh grace period exceeded");
                    break;
                }
            }
        }

        Err(WaitError::Timeout {
            last_error,
            last_state,
            timeout: config.timeout,
            expected: config.target,
        })
    }
}

/// Shorthand for `Waiter::new(config, refresh).wait(cancel)`
pub async fn wait_for_state<T, R>(
    config: WaitConfig,
    refresh: R,
    cancel: &CancellationToken,
) -> Result<Option<T>>
where
    T: Send + 'static,
    R: Refresh<T> + 'static,
{
    Waiter::new(config, refresh).wait(cancel).await
}
