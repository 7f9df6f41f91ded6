use std::sync::Arc;

use parking_lot::RwLock;

use issuedeck_gateway::{Gateway, GatewayResult};

/// Repository ids the user pinned to the top of the repo list.
pub struct PinnedRepoStore {
    gateway: Arc<dyn Gateway>,
    ids: RwLock<Vec<String>>,
}

impl PinnedRepoStore {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            ids: RwLock::new(Vec::new()),
        }
    }

    pub async fn initialize(&self) -> GatewayResult<Vec<String>> {
        let ids = self
            .gateway
            .get_pinned_repos()
            .await
            .inspect_err(|e| tracing::error!("Failed to load pinned repos: {}", e))?;
        *self.ids.write() = ids.clone();
        Ok(ids)
    }

    pub fn pinned_ids(&self) -> Vec<String> {
        self.ids.read().clone()
    }

    pub fn is_pinned(&self, id: &str) -> bool {
        self.ids.read().iter().any(|p| p == id)
    }

    pub async fn set_pinned_ids(&self, ids: Vec<String>) -> GatewayResult<()> {
        self.gateway
            .save_pinned_repos(&ids)
            .await
            .inspect_err(|e| tracing::error!("Failed to save pinned repos: {}", e))?;
        *self.ids.write() = ids;
        Ok(())
    }

    /// Compute the next list from the current one and persist it.
    pub async fn update_pinned_ids<F>(&self, update: F) -> GatewayResult<Vec<String>>
    where
        F: FnOnce(&[String]) -> Vec<String>,
    {
        let next = update(&self.pinned_ids());
        self.set_pinned_ids(next.clone()).await?;
        Ok(next)
    }

    /// Pin `id` if unpinned, unpin it otherwise. Returns the new pinned state.
    pub async fn toggle(&self, id: &str) -> GatewayResult<bool> {
        let next = self
            .update_pinned_ids(|prev| {
                if prev.iter().any(|p| p == id) {
                    prev.iter().filter(|p| *p != id).cloned().collect()
                } else {
                    let mut next = prev.to_vec();
                    next.push(id.to_string());
                    next
                }
            })
            .await?;
        Ok(next.iter().any(|p| p == id))
    }
}
