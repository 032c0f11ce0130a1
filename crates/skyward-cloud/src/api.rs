//! Core API boundary
//!
//! The provider never talks HTTP itself. Everything it needs from the
//! infrastructure API goes through [`CoreApi`], so the transport (and the
//! fakes used in tests) can be swapped freely.

use crate::error::Result;
use crate::retry::{RetryConfig, with_retry};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Status of a background task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub status: TaskStatus,
}

/// Entry in the organization's trash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrashObject {
    pub id: String,
    pub object_id: String,
    pub keep_until: Option<DateTime<Utc>>,
}

/// Identifies a trash entry either by its own ID or by the trashed object's ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrashObjectLookup {
    Id(String),
    ObjectId(String),
}

impl std::fmt::Display for TrashObjectLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrashObjectLookup::Id(id) => write!(f, "trash object {}", id),
            TrashObjectLookup::ObjectId(id) => write!(f, "trash object for {}", id),
        }
    }
}

/// Lifecycle state of a file storage volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStorageVolumeState {
    Pending,
    Configuring,
    Ready,
    Failed,
}

impl FileStorageVolumeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStorageVolumeState::Pending => "pending",
            FileStorageVolumeState::Configuring => "configuring",
            FileStorageVolumeState::Ready => "ready",
            FileStorageVolumeState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for FileStorageVolumeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStorageVolume {
    pub id: String,
    pub name: String,
    pub state: FileStorageVolumeState,
    #[serde(default)]
    pub associations: Vec<String>,
    pub nfs_location: Option<String>,
    pub size: Option<u64>,
}

/// Properties for a new file storage volume
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStorageVolumeArgs {
    pub organization: Option<String>,
    pub data_center: Option<String>,
    pub name: String,
    #[serde(default)]
    pub associations: Vec<String>,
}

/// Operations of the infrastructure API used by the provider
///
/// Implementations map "no such object" to [`CloudError::NotFound`] and
/// "object is in the trash" to [`CloudError::ObjectInTrash`]. HTTP 429 maps
/// to [`CloudError::RateLimited`].
///
/// [`CloudError::NotFound`]: crate::CloudError::NotFound
/// [`CloudError::ObjectInTrash`]: crate::CloudError::ObjectInTrash
/// [`CloudError::RateLimited`]: crate::CloudError::RateLimited
#[async_trait]
pub trait CoreApi: Send + Sync {
    async fn get_task(&self, id: &str) -> Result<Task>;

    async fn get_trash_object(&self, lookup: &TrashObjectLookup) -> Result<TrashObject>;

    /// Start purging a trash entry. The purge completes in the background.
    async fn delete_trash_object(&self, lookup: &TrashObjectLookup) -> Result<()>;

    async fn get_file_storage_volume(&self, id: &str) -> Result<FileStorageVolume>;

    async fn create_file_storage_volume(
        &self,
        args: &FileStorageVolumeArgs,
    ) -> Result<FileStorageVolume>;

    async fn rename_file_storage_volume(&self, id: &str, name: &str) -> Result<FileStorageVolume>;

    /// Move a volume to the trash
    async fn delete_file_storage_volume(&self, id: &str) -> Result<()>;
}

#[async_trait]
impl<A: CoreApi + ?Sized> CoreApi for Arc<A> {
    async fn get_task(&self, id: &str) -> Result<Task> {
        (**self).get_task(id).await
    }

    async fn get_trash_object(&self, lookup: &TrashObjectLookup) -> Result<TrashObject> {
        (**self).get_trash_object(lookup).await
    }

    async fn delete_trash_object(&self, lookup: &TrashObjectLookup) -> Result<()> {
        (**self).delete_trash_object(lookup).await
    }

    async fn get_file_storage_volume(&self, id: &str) -> Result<FileStorageVolume> {
        (**self).get_file_storage_volume(id).await
    }

    async fn create_file_storage_volume(
        &self,
        args: &FileStorageVolumeArgs,
    ) -> Result<FileStorageVolume> {
        (**self).create_file_storage_volume(args).await
    }

    async fn rename_file_storage_volume(&self, id: &str, name: &str) -> Result<FileStorageVolume> {
        (**self).rename_file_storage_volume(id, name).await
    }

    async fn delete_file_storage_volume(&self, id: &str) -> Result<()> {
        (**self).delete_file_storage_volume(id).await
    }
}

/// [`CoreApi`] decorator that retries rate-limited and transport failures
pub struct RetryingApi<A> {
    inner: A,
    retry: RetryConfig,
}

impl<A: CoreApi> RetryingApi<A> {
    pub fn new(inner: A, retry: RetryConfig) -> Self {
        Self { inner, retry }
    }

    pub fn into_shared(self) -> Arc<dyn CoreApi>
    where
        A: 'static,
    {
        Arc::new(self)
    }
}

#[async_trait]
impl<A: CoreApi> CoreApi for RetryingApi<A> {
    async fn get_task(&self, id: &str) -> Result<Task> {
        with_retry(&self.retry, || self.inner.get_task(id)).await
    }

    async fn get_trash_object(&self, lookup: &TrashObjectLookup) -> Result<TrashObject> {
        with_retry(&self.retry, || self.inner.get_trash_object(lookup)).await
    }

    async fn delete_trash_object(&self, lookup: &TrashObjectLookup) -> Result<()> {
        with_retry(&self.retry, || self.inner.delete_trash_object(lookup)).await
    }

    async fn get_file_storage_volume(&self, id: &str) -> Result<FileStorageVolume> {
        with_retry(&self.retry, || self.inner.get_file_storage_volume(id)).await
    }

    async fn create_file_storage_volume(
        &self,
        args: &FileStorageVolumeArgs,
    ) -> Result<FileStorageVolume> {
        with_retry(&self.retry, || self.inner.create_file_storage_volume(args)).await
    }

    async fn rename_file_storage_volume(&self, id: &str, name: &str) -> Result<FileStorageVolume> {
        with_retry(&self.retry, || {
            self.inner.rename_file_storage_volume(id, name)
        })
        .await
    }

    async fn delete_file_storage_volume(&self, id: &str) -> Result<()> {
        with_retry(&self.retry, || self.inner.delete_file_storage_volume(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&FileStorageVolumeState::Configuring).unwrap();
        assert_eq!(json, "\"configuring\"");

        let status: TaskStatus = serde_json::from_str("\"running\"").unwrap();
        assert_eq!(status, TaskStatus::Running);
        assert_eq!(status.to_string(), "running");
    }

    #[test]
    fn test_volume_deserialize_defaults() {
        let volume: FileStorageVolume = serde_json::from_value(serde_json::json!({
            "id": "fsv_abc",
            "name": "shared",
            "state": "pending",
            "nfs_location": null,
            "size": null
        }))
        .unwrap();

        assert_eq!(volume.state, FileStorageVolumeState::Pending);
        assert!(volume.associations.is_empty());
    }

    #[test]
    fn test_trash_lookup_display() {
        assert_eq!(
            TrashObjectLookup::ObjectId("fsv_1".into()).to_string(),
            "trash object for fsv_1"
        );
    }
}
