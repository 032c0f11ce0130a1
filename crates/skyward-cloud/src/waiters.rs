//! Convergence helpers for the asynchronous operations of the core API

use crate::api::{
    CoreApi, FileStorageVolume, FileStorageVolumeState, Task, TaskStatus, TrashObjectLookup,
};
use crate::error::{CloudError, Result};
use skyward_waiter::{CancellationToken, Observation, WaitConfig, wait_for_state};
use std::sync::Arc;
use std::time::Duration;

const TRASH_EXISTS: &str = "exists";
const TRASH_NOT_FOUND: &str = "not_found";

/// Minimum spacing between polls for all core API waits
const MIN_POLL_SPACING: Duration = Duration::from_secs(5);

/// Wait until a task completes. A failed task ends the wait with an error.
pub async fn wait_for_task_completion(
    api: Arc<dyn CoreApi>,
    task_id: &str,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<Task> {
    let config = WaitConfig::new()
        .with_pending([TaskStatus::Pending.as_str(), TaskStatus::Running.as_str()])
        .with_target([TaskStatus::Completed.as_str()])
        .with_timeout(timeout)
        .with_delay(Duration::from_secs(1))
        .with_min_timeout(MIN_POLL_SPACING);

    let id = task_id.to_string();
    let task = wait_for_state(
        config,
        move || {
            let api = api.clone();
            let id = id.clone();
            async move {
                let task = api.get_task(&id).await?;
                if task.status == TaskStatus::Failed {
                    anyhow::bail!("task failed");
                }
                let state = task.status.to_string();
                anyhow::Ok(Observation::found(task, state))
            }
        },
        cancel,
    )
    .await?;

    task.ok_or_else(|| CloudError::NotFound(task_id.to_string()))
}

/// Wait until a trash entry can no longer be looked up
pub async fn wait_for_trash_object_purged(
    api: Arc<dyn CoreApi>,
    lookup: TrashObjectLookup,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<()> {
    let config = WaitConfig::new()
        .with_pending([TRASH_EXISTS])
        .with_target([TRASH_NOT_FOUND])
        .with_timeout(timeout)
        .with_delay(Duration::from_secs(1))
        .with_min_timeout(MIN_POLL_SPACING);

    wait_for_state(
        config,
        move || {
            let api = api.clone();
            let lookup = lookup.clone();
            async move {
                let state = match api.get_trash_object(&lookup).await {
                    Ok(_) => TRASH_EXISTS,
                    Err(CloudError::NotFound(_)) => TRASH_NOT_FOUND,
                    Err(e) => return Err(e.into()),
                };
                anyhow::Ok(Observation::found((), state))
            }
        },
        cancel,
    )
    .await?;

    Ok(())
}

/// Purge a trash entry and wait for the purge to finish
///
/// An entry that is already gone counts as purged.
pub async fn purge_trash_object(
    api: Arc<dyn CoreApi>,
    lookup: TrashObjectLookup,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<()> {
    tracing::debug!("Purging {}", lookup);

    match api.delete_trash_object(&lookup).await {
        Ok(()) => {}
        Err(CloudError::NotFound(_)) => {
            tracing::debug!("{} already purged", lookup);
            return Ok(());
        }
        Err(e) => return Err(e),
    }

    wait_for_trash_object_purged(api, lookup.clone(), timeout, cancel).await?;
    tracing::info!("Purged {}", lookup);
    Ok(())
}

/// Wait until a file storage volume finishes provisioning
pub async fn wait_for_file_storage_volume_ready(
    api: Arc<dyn CoreApi>,
    volume_id: &str,
    timeout: Duration,
    delay: Duration,
    cancel: &CancellationToken,
) -> Result<FileStorageVolume> {
    let config = WaitConfig::new()
        .with_pending([
            FileStorageVolumeState::Pending.as_str(),
            FileStorageVolumeState::Configuring.as_str(),
        ])
        .with_target([FileStorageVolumeState::Ready.as_str()])
        .with_timeout(timeout)
        .with_delay(delay)
        .with_min_timeout(MIN_POLL_SPACING);

    let id = volume_id.to_string();
    let volume = wait_for_state(
        config,
        move || {
            let api = api.clone();
            let id = id.clone();
            async move {
                let volume = api.get_file_storage_volume(&id).await?;
                let state = volume.state.to_string();
                anyhow::Ok(Observation::found(volume, state))
            }
        },
        cancel,
    )
    .await?;

    volume.ok_or_else(|| CloudError::NotFound(volume_id.to_string()))
}
