//! In-memory stand-in for the core API

#![allow(dead_code)]

use async_trait::async_trait;
use skyward_cloud::{
    CloudError, CoreApi, FileStorageVolume, FileStorageVolumeArgs, FileStorageVolumeState,
    ProviderConfig, Result, Task, TaskStatus, TrashObject, TrashObjectLookup,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct TrashEntry {
    pub purging: bool,
    /// Lookups that still find the entry once a purge has started
    pub polls_until_gone: u32,
}

#[derive(Default)]
pub struct FakeState {
    pub volumes: HashMap<String, FileStorageVolume>,
    /// States reported by successive reads of a volume; the volume keeps
    /// its last state once the queue is empty
    pub volume_progress: HashMap<String, VecDeque<FileStorageVolumeState>>,
    /// Progress handed to the next created volume
    pub next_progress: VecDeque<FileStorageVolumeState>,
    pub trash: HashMap<String, TrashEntry>,
    pub tasks: HashMap<String, VecDeque<TaskStatus>>,
    /// Number of upcoming calls answered with HTTP 429
    pub rate_limited: u32,
    pub calls: Vec<String>,
    created: u32,
}

#[derive(Default)]
pub struct FakeCore {
    pub state: Mutex<FakeState>,
}

impl FakeCore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn api(self: &Arc<Self>) -> Arc<dyn CoreApi> {
        self.clone()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn insert_volume(&self, id: &str, name: &str, state: FileStorageVolumeState) {
        self.with_state(|s| {
            s.volumes.insert(
                id.to_string(),
                FileStorageVolume {
                    id: id.to_string(),
                    name: name.to_string(),
                    state,
                    associations: Vec::new(),
                    nfs_location: Some(format!("10.0.0.5:/{}", id)),
                    size: None,
                },
            );
        });
    }

    pub fn insert_trash(&self, object_id: &str, polls_until_gone: u32) {
        self.with_state(|s| {
            s.trash.insert(
                object_id.to_string(),
                TrashEntry {
                    purging: false,
                    polls_until_gone,
                },
            );
        });
    }

    pub fn calls(&self) -> Vec<String> {
        self.with_state(|s| s.calls.clone())
    }

    pub fn count(&self, method: &str) -> usize {
        self.with_state(|s| s.calls.iter().filter(|c| *c == method).count())
    }

    fn enter(&self, method: &str) -> Result<()> {
        self.with_state(|s| {
            s.calls.push(method.to_string());
            if s.rate_limited > 0 {
                s.rate_limited -= 1;
                return Err(CloudError::RateLimited { retry_after: None });
            }
            Ok(())
        })
    }
}

fn trash_key(lookup: &TrashObjectLookup) -> &str {
    match lookup {
        TrashObjectLookup::Id(id) | TrashObjectLookup::ObjectId(id) => id,
    }
}

#[async_trait]
impl CoreApi for FakeCore {
    async fn get_task(&self, id: &str) -> Result<Task> {
        self.enter("get_task")?;
        self.with_state(|s| {
            let statuses = s
                .tasks
                .get_mut(id)
                .ok_or_else(|| CloudError::NotFound(id.to_string()))?;
            let status = if statuses.len() > 1 {
                statuses.pop_front()
            } else {
                statuses.front().copied()
            }
            .ok_or_else(|| CloudError::NotFound(id.to_string()))?;

            Ok(Task {
                id: id.to_string(),
                name: "purge".to_string(),
                status,
            })
        })
    }

    async fn get_trash_object(&self, lookup: &TrashObjectLookup) -> Result<TrashObject> {
        self.enter("get_trash_object")?;
        let key = trash_key(lookup).to_string();
        self.with_state(|s| {
            let entry = s
                .trash
                .get_mut(&key)
                .ok_or_else(|| CloudError::NotFound(key.clone()))?;

            if entry.purging {
                if entry.polls_until_gone == 0 {
                    s.trash.remove(&key);
                    return Err(CloudError::NotFound(key));
                }
                entry.polls_until_gone -= 1;
            }

            Ok(TrashObject {
                id: format!("trsh_{}", key),
                object_id: key,
                keep_until: None,
            })
        })
    }

    async fn delete_trash_object(&self, lookup: &TrashObjectLookup) -> Result<()> {
        self.enter("delete_trash_object")?;
        let key = trash_key(lookup).to_string();
        self.with_state(|s| match s.trash.get_mut(&key) {
            Some(entry) => {
                entry.purging = true;
                Ok(())
            }
            None => Err(CloudError::NotFound(key)),
        })
    }

    async fn get_file_storage_volume(&self, id: &str) -> Result<FileStorageVolume> {
        self.enter("get_file_storage_volume")?;
        self.with_state(|s| {
            if s.trash.contains_key(id) {
                return Err(CloudError::ObjectInTrash(id.to_string()));
            }

            let next = s.volume_progress.get_mut(id).and_then(|q| q.pop_front());
            let volume = s
                .volumes
                .get_mut(id)
                .ok_or_else(|| CloudError::NotFound(id.to_string()))?;
            if let Some(state) = next {
                volume.state = state;
            }
            Ok(volume.clone())
        })
    }

    async fn create_file_storage_volume(
        &self,
        args: &FileStorageVolumeArgs,
    ) -> Result<FileStorageVolume> {
        self.enter("create_file_storage_volume")?;
        self.with_state(|s| {
            s.created += 1;
            let volume = FileStorageVolume {
                id: format!("fsv_{}", s.created),
                name: args.name.clone(),
                state: FileStorageVolumeState::Pending,
                associations: args.associations.clone(),
                nfs_location: None,
                size: None,
            };

            let progress = std::mem::take(&mut s.next_progress);
            s.volume_progress.insert(volume.id.clone(), progress);
            s.volumes.insert(volume.id.clone(), volume.clone());
            Ok(volume)
        })
    }

    async fn rename_file_storage_volume(&self, id: &str, name: &str) -> Result<FileStorageVolume> {
        self.enter("rename_file_storage_volume")?;
        self.with_state(|s| {
            let volume = s
                .volumes
                .get_mut(id)
                .ok_or_else(|| CloudError::NotFound(id.to_string()))?;
            volume.name = name.to_string();
            Ok(volume.clone())
        })
    }

    async fn delete_file_storage_volume(&self, id: &str) -> Result<()> {
        self.enter("delete_file_storage_volume")?;
        self.with_state(|s| {
            if s.volumes.remove(id).is_none() {
                return Err(CloudError::NotFound(id.to_string()));
            }
            s.trash.insert(
                id.to_string(),
                TrashEntry {
                    purging: false,
                    polls_until_gone: 1,
                },
            );
            Ok(())
        })
    }
}

pub fn provider_config(skip_trash_object_purge: bool) -> ProviderConfig {
    ProviderConfig {
        api_key: "test-key".to_string(),
        data_center: Some("uk-lon-01".to_string()),
        organization: Some("acme".to_string()),
        skip_trash_object_purge,
        log_level: "debug".to_string(),
        api_url: "http://localhost".to_string(),
    }
}
