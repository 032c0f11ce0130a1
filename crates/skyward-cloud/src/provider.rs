//! Resource handlers and the provider that drives them

use crate::error::{CloudError, Result};
use crate::state::{ResourceState, StateManager};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skyward_waiter::CancellationToken;
use std::collections::HashMap;
use std::sync::Arc;

/// Lifecycle operations for one resource type
///
/// Handlers reflect remote objects into [`ResourceState`]. A read that finds
/// the object gone (deleted, or sitting in the trash) returns `Ok(None)`.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// Returns the resource type (e.g., "file_storage_volume")
    fn resource_type(&self) -> &str;

    /// Create the remote object and wait until it is usable
    async fn create(
        &self,
        config: &ResourceConfig,
        cancel: &CancellationToken,
    ) -> Result<ResourceState>;

    async fn read(&self, id: &str) -> Result<Option<ResourceState>>;

    /// Delete the remote object. Already-deleted objects are not an error.
    async fn delete(&self, state: &ResourceState, cancel: &CancellationToken) -> Result<()>;
}

/// Desired configuration of a resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Resource type (e.g., "file_storage_volume")
    pub resource_type: String,

    /// Local resource name
    pub name: String,

    /// Resource-specific configuration
    pub config: serde_json::Value,
}

impl ResourceConfig {
    pub fn new(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        config: serde_json::Value,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            config,
        }
    }

    /// Get the full resource key (type:name)
    pub fn key(&self) -> String {
        format!("{}:{}", self.resource_type, self.name)
    }

    /// Get a configuration value as a specific type
    pub fn get_config<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.config
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Dispatches lifecycle operations to registered handlers and records the
/// outcome in the local state file
pub struct Provider {
    handlers: HashMap<String, Arc<dyn ResourceHandler>>,
    state: StateManager,
}

impl Provider {
    pub fn new(state: StateManager) -> Self {
        Self {
            handlers: HashMap::new(),
            state,
        }
    }

    pub fn register(&mut self, handler: Arc<dyn ResourceHandler>) {
        self.handlers
            .insert(handler.resource_type().to_string(), handler);
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    fn handler(&self, resource_type: &str) -> Result<&Arc<dyn ResourceHandler>> {
        self.handlers
            .get(resource_type)
            .ok_or_else(|| CloudError::UnknownResourceType(resource_type.to_string()))
    }

    /// Create a resource and record it under its key
    pub async fn create(
        &self,
        config: &ResourceConfig,
        cancel: &CancellationToken,
    ) -> Result<ResourceState> {
        let handler = self.handler(&config.resource_type)?;
        let created = handler.create(config, cancel).await?;

        let mut file = self.state.load().await?;
        file.set_resource(config.key(), created.clone());
        self.state.save(&file).await?;

        tracing::info!("Created {} ({})", config.key(), created.id);
        Ok(created)
    }

    /// Re-read a recorded resource. Resources that no longer exist remotely
    /// are dropped from state and reported as `None`.
    pub async fn refresh(&self, key: &str) -> Result<Option<ResourceState>> {
        let mut file = self.state.load().await?;
        let Some(mut current) = file.get_resource(key).cloned() else {
            return Ok(None);
        };

        let handler = self.handler(&current.resource_type)?;
        let result = match handler.read(&current.id).await? {
            Some(latest) => {
                current.refresh_from(latest);
                file.set_resource(key.to_string(), current.clone());
                Some(current)
            }
            None => {
                tracing::warn!("{} no longer exists, removing from state", key);
                file.remove_resource(key);
                None
            }
        };

        self.state.save(&file).await?;
        Ok(result)
    }

    /// Delete a recorded resource and forget it
    pub async fn destroy(&self, key: &str, cancel: &CancellationToken) -> Result<()> {
        let mut file = self.state.load().await?;
        let Some(current) = file.get_resource(key).cloned() else {
            tracing::debug!("{} not in state, nothing to destroy", key);
            return Ok(());
        };

        self.handler(&current.resource_type)?
            .delete(&current, cancel)
            .await?;

        file.remove_resource(key);
        self.state.save(&file).await?;

        tracing::info!("Destroyed {} ({})", key, current.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_config() {
        let config = ResourceConfig::new(
            "file_storage_volume",
            "shared",
            serde_json::json!({ "associations": ["vm_1", "vm_2"] }),
        );

        assert_eq!(config.key(), "file_storage_volume:shared");
        assert_eq!(
            config.get_config::<Vec<String>>("associations"),
            Some(vec!["vm_1".to_string(), "vm_2".to_string()])
        );
        assert_eq!(config.get_config::<String>("name"), None);
    }
}
