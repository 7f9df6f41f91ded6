use std::sync::Arc;

use parking_lot::RwLock;

use issuedeck_gateway::{Gateway, GatewayResult};

/// Repository names whose issues the feed aggregates.
pub struct RepoSelectionStore {
    gateway: Arc<dyn Gateway>,
    names: RwLock<Vec<String>>,
}

impl RepoSelectionStore {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            names: RwLock::new(Vec::new()),
        }
    }

    pub fn get(&self) -> Vec<String> {
        self.names.read().clone()
    }

    pub async fn load(&self) -> GatewayResult<Vec<String>> {
        let names = self
            .gateway
            .get_repos_from_store()
            .await
            .inspect_err(|e| tracing::error!("Failed to load selected repos: {}", e))?;
        *self.names.write() = names.clone();
        Ok(names)
    }

    pub async fn set(&self, names: &[String]) -> GatewayResult<Vec<String>> {
        let names = self
            .gateway
            .add_repos_to_store(names)
            .await
            .inspect_err(|e| tracing::error!("Failed to save selected repos: {}", e))?;
        *self.names.write() = names.clone();
        Ok(names)
    }
}
