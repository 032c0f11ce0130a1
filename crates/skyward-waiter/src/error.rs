//! Wait error types

use std::time::Duration;
use thiserror::Error;

/// Errors returned by [`Waiter::wait`](crate::Waiter::wait)
#[derive(Error, Debug)]
pub enum WaitError {
    /// The resource stayed absent for more polls than tolerated while a
    /// non-empty target was expected.
    #[error("{}", not_found_message(.retries))]
    NotFound {
        #[source]
        last_error: Option<anyhow::Error>,
        retries: u32,
    },

    /// The resource reported a state that is neither pending nor a target.
    #[error(
        "unexpected state '{state}', wanted target '{}'{}",
        .expected.join(", "),
        last_error_suffix(.last_error)
    )]
    UnexpectedState {
        #[source]
        last_error: Option<anyhow::Error>,
        state: String,
        expected: Vec<String>,
    },

    /// Time ran out, grace period included, without a terminal result.
    #[error("{}", timeout_message(.expected, .last_state, .timeout, .last_error))]
    Timeout {
        #[source]
        last_error: Option<anyhow::Error>,
        last_state: String,
        timeout: Duration,
        expected: Vec<String>,
    },

    /// The refresh callback failed. Never retried.
    #[error(transparent)]
    Refresh(anyhow::Error),

    /// The caller's cancellation token fired before a terminal result.
    #[error("wait cancelled")]
    Cancelled,

    /// The polling task ended without handing over a terminal result.
    #[error("polling task ended unexpectedly (last state: '{last_state}')")]
    SchedulerAborted { last_state: String },
}

impl WaitError {
    /// The underlying error carried by a classified error, if any
    pub fn last_error(&self) -> Option<&anyhow::Error> {
        match self {
            WaitError::NotFound { last_error, .. }
            | WaitError::UnexpectedState { last_error, .. }
            | WaitError::Timeout { last_error, .. } => last_error.as_ref(),
            WaitError::Refresh(err) => Some(err),
            WaitError::Cancelled | WaitError::SchedulerAborted { .. } => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::Timeout { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, WaitError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, WaitError>;

fn not_found_message(retries: &u32) -> String {
    if *retries > 0 {
        format!("couldn't find resource ({} retries)", retries)
    } else {
        "couldn't find resource".to_string()
    }
}

fn last_error_suffix(last_error: &Option<anyhow::Error>) -> String {
    match last_error {
        Some(err) => format!(". last error: {}", err),
        None => String::new(),
    }
}

fn timeout_message(
    expected: &[String],
    last_state: &str,
    timeout: &Duration,
    last_error: &Option<anyhow::Error>,
) -> String {
    let waiting_for = if expected.is_empty() {
        "resource to be gone".to_string()
    } else {
        format!("state to become '{}'", expected.join(", "))
    };

    let mut extra = Vec::new();
    if !last_state.is_empty() {
        extra.push(format!("last state: '{}'", last_state));
    }
    if !timeout.is_zero() {
        extra.push(format!("timeout: {:?}", timeout));
    }

    let suffix = if extra.is_empty() {
        String::new()
    } else {
        format!(" ({})", extra.join(", "))
    };

    match last_error {
        Some(err) => format!("timeout while waiting for {}{}: {}", waiting_for, suffix, err),
        None => format!("timeout while waiting for {}{}", waiting_for, suffix),
    }
}
