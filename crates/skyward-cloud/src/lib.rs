//! Skyward Cloud Resources
//!
//! Resource handlers for the Skyward infrastructure API. Every create and
//! delete here is asynchronous on the API side; the handlers block on
//! [`skyward_waiter`] until the remote object has converged and then record
//! it in the local state file.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                    Provider                      │
//! │        create / refresh / destroy by key         │
//! └─────────────────┬──────────────────┬────────────┘
//!                   │                  │
//! ┌─────────────────▼─────────┐ ┌──────▼────────────┐
//! │     ResourceHandler       │ │   StateManager     │
//! │  FileStorageVolume, ...   │ │ .skyward/state.json│
//! └─────────────────┬─────────┘ └───────────────────┘
//!                   │
//! ┌─────────────────▼─────────┐ ┌───────────────────┐
//! │  waiters (task, trash,    │─►  skyward-waiter    │
//! │  volume readiness)        │ │                    │
//! └─────────────────┬─────────┘ └───────────────────┘
//!                   │
//! ┌─────────────────▼─────────┐
//! │  CoreApi (RetryingApi)    │
//! └───────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use skyward_cloud::{
//!     FileStorageVolumeResource, Provider, ProviderConfig, ResourceConfig, RetryConfig,
//!     RetryingApi, StateManager,
//! };
//!
//! let config = ProviderConfig::from_env()?;
//! skyward_cloud::logging::init(&config)?;
//!
//! let api = RetryingApi::new(client, RetryConfig::default()).into_shared();
//! let mut provider = Provider::new(StateManager::new("."));
//! provider.register(Arc::new(FileStorageVolumeResource::new(api, &config)));
//!
//! let volume = ResourceConfig::new("file_storage_volume", "shared", json!({}));
//! provider.create(&volume, &CancellationToken::new()).await?;
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod file_storage_volume;
pub mod logging;
pub mod provider;
pub mod retry;
pub mod state;
pub mod waiters;

// Re-exports
pub use api::{
    CoreApi, FileStorageVolume, FileStorageVolumeArgs, FileStorageVolumeState, RetryingApi, Task,
    TaskStatus, TrashObject, TrashObjectLookup,
};
pub use config::{ProviderConfig, ProviderOverrides, Timeouts};
pub use error::{CloudError, Result};
pub use file_storage_volume::FileStorageVolumeResource;
pub use provider::{Provider, ResourceConfig, ResourceHandler};
pub use retry::{RetryConfig, with_retry};
pub use state::{ResourceState, ResourceStatus, StateFile, StateManager};
