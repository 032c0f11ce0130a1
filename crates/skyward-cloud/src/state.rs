//! Local state of managed resources
//!
//! Remote objects are reflected into `.skyward/state.json`, keyed by
//! `type:name`. The previous file is kept as `state.json.backup` on every
//! save.

use crate::error::{CloudError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

const STATE_VERSION: u32 = 1;
const STATE_DIR: &str = ".skyward";
const STATE_FILE: &str = "state.json";
const STATE_BACKUP: &str = "state.json.backup";

/// Contents of the state file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    /// State file version
    pub version: u32,

    /// Last modified timestamp
    pub updated_at: DateTime<Utc>,

    /// Resources indexed by type:name
    pub resources: HashMap<String, ResourceState>,
}

impl Default for StateFile {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            resources: HashMap::new(),
        }
    }
}

impl StateFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resources of one type
    pub fn resources_of_type(&self, resource_type: &str) -> Vec<(&String, &ResourceState)> {
        self.resources
            .iter()
            .filter(|(_, r)| r.resource_type == resource_type)
            .collect()
    }

    pub fn set_resource(&mut self, key: String, state: ResourceState) {
        self.resources.insert(key, state);
        self.updated_at = Utc::now();
    }

    pub fn remove_resource(&mut self, key: &str) -> Option<ResourceState> {
        let result = self.resources.remove(key);
        if result.is_some() {
            self.updated_at = Utc::now();
        }
        result
    }

    pub fn get_resource(&self, key: &str) -> Option<&ResourceState> {
        self.resources.get(key)
    }
}

/// Last known state of a single remote object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceState {
    /// Remote object ID
    pub id: String,

    /// Resource type
    pub resource_type: String,

    pub status: ResourceStatus,

    /// Remote attributes (name, NFS location, ...)
    pub attributes: HashMap<String, serde_json::Value>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl ResourceState {
    pub fn new(id: impl Into<String>, resource_type: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
            status: ResourceStatus::Unknown,
            attributes: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_status(mut self, status: ResourceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn get_attribute<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Take over status and attributes from a fresh read, keeping the
    /// creation time
    pub fn refresh_from(&mut self, latest: ResourceState) {
        self.status = latest.status;
        self.attributes = latest.attributes;
        self.updated_at = Utc::now();
    }
}

/// Status of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    /// Accepted by the API, not yet provisioned
    Pending,
    /// Being provisioned or reconfigured
    Configuring,
    /// Usable
    Ready,
    /// Provisioning failed
    Error,
    Unknown,
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceStatus::Pending => write!(f, "pending"),
            ResourceStatus::Configuring => write!(f, "configuring"),
            ResourceStatus::Ready => write!(f, "ready"),
            ResourceStatus::Error => write!(f, "error"),
            ResourceStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Reads and writes the state file under a project root
pub struct StateManager {
    project_root: PathBuf,
}

impl StateManager {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    fn state_dir(&self) -> PathBuf {
        self.project_root.join(STATE_DIR)
    }

    fn state_path(&self) -> PathBuf {
        self.state_dir().join(STATE_FILE)
    }

    fn backup_path(&self) -> PathBuf {
        self.state_dir().join(STATE_BACKUP)
    }

    async fn ensure_state_dir(&self) -> Result<()> {
        let dir = self.state_dir();
        if !fs::try_exists(&dir).await? {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created state directory: {}", dir.display());
        }
        Ok(())
    }

    /// Load the current state, or an empty one if no state file exists yet
    pub async fn load(&self) -> Result<StateFile> {
        let path = self.state_path();
        if !fs::try_exists(&path).await? {
            tracing::debug!("State file not found, returning empty state");
            return Ok(StateFile::new());
        }

        let content = fs::read_to_string(&path).await?;
        let state: StateFile = serde_json::from_str(&content)?;

        if state.version > STATE_VERSION {
            return Err(CloudError::StateError(format!(
                "State file version {} is newer than supported version {}",
                state.version, STATE_VERSION
            )));
        }

        tracing::debug!("Loaded state with {} resources", state.resources.len());
        Ok(state)
    }

    pub async fn save(&self, state: &StateFile) -> Result<()> {
        self.ensure_state_dir().await?;

        let path = self.state_path();
        let backup = self.backup_path();
        if fs::try_exists(&path).await? {
            if fs::try_exists(&backup).await? {
                fs::remove_file(&backup).await?;
            }
            fs::rename(&path, &backup).await?;
            tracing::debug!("Created state backup");
        }

        let content = serde_json::to_string_pretty(state)?;
        fs::write(&path, content).await?;

        tracing::debug!("Saved state with {} resources", state.resources.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn volume_state() -> ResourceState {
        ResourceState::new("fsv_abc", "file_storage_volume")
            .with_status(ResourceStatus::Ready)
            .with_attribute("nfs_location", serde_json::json!("10.0.0.5:/shared"))
    }

    #[tokio::test]
    async fn test_state_save_load() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let mut state = StateFile::new();
        state.set_resource("file_storage_volume:shared".to_string(), volume_state());
        manager.save(&state).await.unwrap();

        let loaded = manager.load().await.unwrap();
        let volume = loaded.get_resource("file_storage_volume:shared").unwrap();
        assert_eq!(volume.status, ResourceStatus::Ready);
        assert_eq!(
            volume.get_attribute::<String>("nfs_location").as_deref(),
            Some("10.0.0.5:/shared")
        );
    }

    #[tokio::test]
    async fn test_empty_state() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let state = manager.load().await.unwrap();
        assert!(state.resources.is_empty());
    }

    #[tokio::test]
    async fn test_save_keeps_backup() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let mut state = StateFile::new();
        manager.save(&state).await.unwrap();
        state.set_resource("file_storage_volume:shared".to_string(), volume_state());
        manager.save(&state).await.unwrap();

        let backup = temp_dir.path().join(STATE_DIR).join(STATE_BACKUP);
        let content = std::fs::read_to_string(backup).unwrap();
        let previous: StateFile = serde_json::from_str(&content).unwrap();
        assert!(previous.resources.is_empty());
    }

    #[tokio::test]
    async fn test_newer_version_rejected() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let state = StateFile {
            version: STATE_VERSION + 1,
            ..StateFile::new()
        };
        manager.save(&state).await.unwrap();

        let err = manager.load().await.unwrap_err();
        assert!(matches!(err, CloudError::StateError(_)));
    }

    #[test]
    fn test_resources_of_type() {
        let mut state = StateFile::new();
        state.set_resource("file_storage_volume:a".into(), volume_state());
        state.set_resource("ip:b".into(), ResourceState::new("ip_1", "ip"));

        assert_eq!(state.resources_of_type("file_storage_volume").len(), 1);
        assert!(state.remove_resource("ip:b").is_some());
        assert!(state.remove_resource("ip:b").is_none());
    }

    #[test]
    fn test_refresh_keeps_created_at() {
        let mut state = ResourceState::new("fsv_abc", "file_storage_volume");
        let created_at = state.created_at;

        state.refresh_from(volume_state());
        assert_eq!(state.status, ResourceStatus::Ready);
        assert_eq!(state.created_at, created_at);
        assert!(state.attributes.contains_key("nfs_location"));
    }
}
