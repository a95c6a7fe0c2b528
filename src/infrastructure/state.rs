//! Shared application state

use std::sync::Arc;

use anyhow::Result;

use crate::application::services::{
    ActionService, ActionServiceImpl, DungeonInstanceService, DungeonInstanceServiceImpl,
};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::persistence::StoreBackend;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub action_service: Arc<dyn ActionService>,
    pub dungeon_instance_service: Arc<dyn DungeonInstanceService>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let store = Arc::new(StoreBackend::from_config(&config.store).await?);
        Ok(Self::with_store(config, store))
    }

    /// Wire services over an already opened store
    pub fn with_store(config: AppConfig, store: Arc<StoreBackend>) -> Self {
        let action_service = Arc::new(ActionServiceImpl::new(Arc::clone(&store)));
        let dungeon_instance_service = Arc::new(DungeonInstanceServiceImpl::new(store));

        Self {
            config,
            action_service,
            dungeon_instance_service,
        }
    }
}
