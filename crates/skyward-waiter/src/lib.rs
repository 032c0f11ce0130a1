//! Skyward state-convergence waiter
//!
//! Most remote operations of an infrastructure API return before the work is
//! done: a volume is created in `pending`, a trashed object is purged in the
//! background. This crate polls such a resource until it reaches a target
//! state, disappears, or the wait times out.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐   mpsc(1)    ┌──────────────────────────┐
//! │       Coordinator        │ ◄─────────── │     Backoff Scheduler    │
//! │  Waiter::wait            │              │  (spawned tokio task)    │
//! │  result / cancel /       │ ───────────► │  refresh → classify →    │
//! │  timeout + grace period  │  stop token  │  send → backoff sleep    │
//! └──────────────────────────┘              └──────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use skyward_waiter::{Observation, WaitConfig, Waiter};
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! let config = WaitConfig::new()
//!     .with_pending(["pending", "configuring"])
//!     .with_target(["ready"])
//!     .with_timeout(Duration::from_secs(60))
//!     .with_min_timeout(Duration::from_secs(5));
//!
//! let volume = Waiter::new(config, move || {
//!     let api = api.clone();
//!     async move {
//!         let volume = api.get_volume(&id).await?;
//!         let state = volume.state.clone();
//!         Ok(Observation::found(volume, state))
//!     }
//! })
//! .wait(&CancellationToken::new())
//! .await?;
//! ```

mod backoff;
pub mod config;
pub mod error;
pub mod refresh;
mod scheduler;
pub mod waiter;

// Re-exports
pub use config::{
    DEFAULT_CONTINUOUS_TARGET_OCCURRENCE, DEFAULT_NOT_FOUND_CHECKS, MAX_BACKOFF,
    MAX_POLL_INTERVAL, REFRESH_GRACE_PERIOD, WaitConfig,
};
pub use error::{Result, WaitError};
pub use refresh::{Observation, Refresh};
pub use tokio_util::sync::CancellationToken;
pub use waiter::{Waiter, wait_for_state};
