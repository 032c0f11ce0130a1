//! File storage volume resource
//!
//! Volumes are created in `pending`, pass through `configuring` and become
//! `ready`. Deleting a volume moves it to the trash; unless the provider is
//! configured to skip purging, the trash entry is purged afterwards.

use crate::api::{
    CoreApi, FileStorageVolume, FileStorageVolumeArgs, FileStorageVolumeState, TrashObjectLookup,
};
use crate::config::{ProviderConfig, Timeouts};
use crate::error::{CloudError, Result};
use crate::provider::{ResourceConfig, ResourceHandler};
use crate::state::{ResourceState, ResourceStatus};
use crate::waiters::{purge_trash_object, wait_for_file_storage_volume_ready};
use async_trait::async_trait;
use skyward_waiter::CancellationToken;
use std::sync::Arc;
use std::time::Duration;

pub const RESOURCE_TYPE: &str = "file_storage_volume";

/// Longest name the API accepts for a volume
const MAX_NAME_LENGTH: usize = 128;

const READY_POLL_DELAY: Duration = Duration::from_secs(2);

pub struct FileStorageVolumeResource {
    api: Arc<dyn CoreApi>,
    organization: Option<String>,
    data_center: Option<String>,
    skip_trash_object_purge: bool,
    timeouts: Timeouts,
}

impl FileStorageVolumeResource {
    pub fn new(api: Arc<dyn CoreApi>, config: &ProviderConfig) -> Self {
        Self {
            api,
            organization: config.organization.clone(),
            data_center: config.data_center.clone(),
            skip_trash_object_purge: config.skip_trash_object_purge,
            timeouts: Timeouts::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    async fn purge(&self, volume_id: &str, cancel: &CancellationToken) -> Result<()> {
        purge_trash_object(
            self.api.clone(),
            TrashObjectLookup::ObjectId(volume_id.to_string()),
            self.timeouts.delete,
            cancel,
        )
        .await
    }
}

#[async_trait]
impl ResourceHandler for FileStorageVolumeResource {
    fn resource_type(&self) -> &str {
        RESOURCE_TYPE
    }

    async fn create(
        &self,
        config: &ResourceConfig,
        cancel: &CancellationToken,
    ) -> Result<ResourceState> {
        let args = FileStorageVolumeArgs {
            organization: self.organization.clone(),
            data_center: self.data_center.clone(),
            name: config
                .get_config::<String>("name")
                .unwrap_or_else(|| config.name.clone()),
            associations: config
                .get_config::<Vec<String>>("associations")
                .unwrap_or_default(),
        };

        let volume = self.api.create_file_storage_volume(&args).await?;
        tracing::debug!(
            "Created file storage volume {}, waiting for it to become ready",
            volume.id
        );

        let ready = wait_for_file_storage_volume_ready(
            self.api.clone(),
            &volume.id,
            self.timeouts.create,
            READY_POLL_DELAY,
            cancel,
        )
        .await?;

        Ok(volume_state(&ready))
    }

    async fn read(&self, id: &str) -> Result<Option<ResourceState>> {
        match self.api.get_file_storage_volume(id).await {
            Ok(volume) => Ok(Some(volume_state(&volume))),
            Err(e) if e.is_gone() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn delete(&self, state: &ResourceState, cancel: &CancellationToken) -> Result<()> {
        let volume = match self.api.get_file_storage_volume(&state.id).await {
            Ok(volume) => volume,
            Err(CloudError::NotFound(_)) => return Ok(()),
            Err(CloudError::ObjectInTrash(_)) => {
                if self.skip_trash_object_purge {
                    return Ok(());
                }
                return self.purge(&state.id, cancel).await;
            }
            Err(e) => return Err(e),
        };

        // A volume left in the trash keeps its name, which would block a new
        // volume with the same name.
        if self.skip_trash_object_purge {
            let name = trash_name(&volume.name, &volume.id);
            if name != volume.name {
                tracing::debug!("Renaming file storage volume {} to {}", volume.id, name);
                if let Err(e) = self.api.rename_file_storage_volume(&volume.id, &name).await
                    && !e.is_gone()
                {
                    return Err(e);
                }
            }
        }

        if let Err(e) = self.api.delete_file_storage_volume(&volume.id).await
            && !e.is_gone()
        {
            return Err(e);
        }

        if !self.skip_trash_object_purge {
            self.purge(&volume.id, cancel).await?;
        }

        Ok(())
    }
}

/// Name given to a volume before it is left in the trash: `<name>-<id>`,
/// with the name shortened so the result fits the API's length limit
pub fn trash_name(name: &str, id: &str) -> String {
    let suffix = format!("-{}", id);
    if name.ends_with(&suffix) {
        return truncate(name, MAX_NAME_LENGTH).to_string();
    }

    let keep = MAX_NAME_LENGTH.saturating_sub(suffix.len());
    let renamed = format!("{}{}", truncate(name, keep), suffix);

    // An oversized id leaves no room for the name and is cut itself
    truncate(&renamed, MAX_NAME_LENGTH).to_string()
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn volume_state(volume: &FileStorageVolume) -> ResourceState {
    let status = match volume.state {
        FileStorageVolumeState::Pending => ResourceStatus::Pending,
        FileStorageVolumeState::Configuring => ResourceStatus::Configuring,
        FileStorageVolumeState::Ready => ResourceStatus::Ready,
        FileStorageVolumeState::Failed => ResourceStatus::Error,
    };

    ResourceState::new(&volume.id, RESOURCE_TYPE)
        .with_status(status)
        .with_attribute("name", serde_json::json!(volume.name))
        .with_attribute("associations", serde_json::json!(volume.associations))
        .with_attribute("nfs_location", serde_json::json!(volume.nfs_location))
        .with_attribute("size", serde_json::json!(volume.size))
}
