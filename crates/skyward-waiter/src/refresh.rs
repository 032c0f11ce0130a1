//! Refresh callback contract

use async_trait::async_trait;
use std::future::Future;

/// What a single poll saw on the remote side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation<T> {
    /// The remote object, `None` when it no longer exists
    pub payload: Option<T>,

    /// Status label of the remote object (e.g. "pending", "ready")
    pub state: String,
}

impl<T> Observation<T> {
    pub fn found(payload: T, state: impl Into<String>) -> Self {
        Self {
            payload: Some(payload),
            state: state.into(),
        }
    }

    /// The resource is gone
    pub fn absent(state: impl Into<String>) -> Self {
        Self {
            payload: None,
            state: state.into(),
        }
    }
}

/// Performs exactly one remote status lookup per call.
///
/// Return `Err` only for conditions that should end the wait (network or
/// authentication failures). "Not ready yet" is expressed through
/// [`Observation::state`], "gone" through an absent payload.
///
/// Any `FnMut() -> impl Future<Output = anyhow::Result<Observation<T>>>`
/// closure implements this trait.
#[async_trait]
pub trait Refresh<T>: Send {
    async fn refresh(&mut self) -> anyhow::Result<Observation<T>>;
}

#[async_trait]
impl<T, F, Fut> Refresh<T> for F
where
    T: Send + 'static,
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = anyhow::Result<Observation<T>>> + Send + 'static,
{
    async fn refresh(&mut self) -> anyhow::Result<Observation<T>> {
        (self)().await
    }
}
