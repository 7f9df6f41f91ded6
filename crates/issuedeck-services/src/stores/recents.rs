use std::sync::Arc;

use parking_lot::RwLock;

use issuedeck_core::{RecentItem, Recents};
use issuedeck_gateway::{Gateway, GatewayResult};

pub struct RecentlyViewedStore {
    gateway: Arc<dyn Gateway>,
    recents: RwLock<Recents>,
}

impl RecentlyViewedStore {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            recents: RwLock::new(Recents::default()),
        }
    }

    pub async fn initialize(&self) -> GatewayResult<Recents> {
        let recents = self
            .gateway
            .load_recents()
            .await
            .inspect_err(|e| tracing::error!("Failed to load recently viewed: {}", e))?;
        *self.recents.write() = recents.clone();
        Ok(recents)
    }

    pub fn items(&self) -> Vec<RecentItem> {
        self.recents.read().items.clone()
    }

    /// Record a view; the backend returns the reordered list.
    pub async fn add_item(&self, id: &str, name: &str) -> GatewayResult<Recents> {
        let recents = self
            .gateway
            .add_recent_item(id, name)
            .await
            .inspect_err(|e| tracing::error!("Failed to add recent item {}: {}", id, e))?;
        *self.recents.write() = recents.clone();
        Ok(recents)
    }

    pub async fn clear(&self) -> GatewayResult<()> {
        self.gateway
            .clear_recents()
            .await
            .inspect_err(|e| tracing::error!("Failed to clear recently viewed: {}", e))?;
        *self.recents.write() = Recents::default();
        Ok(())
    }
}
