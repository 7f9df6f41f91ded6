use std::sync::Arc;

use parking_lot::RwLock;

use issuedeck_core::{Settings, SettingsPatch};
use issuedeck_gateway::{Gateway, GatewayResult};

pub struct SettingsStore {
    gateway: Arc<dyn Gateway>,
    settings: RwLock<Settings>,
}

impl SettingsStore {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            settings: RwLock::new(Settings::default()),
        }
    }

    pub fn get(&self) -> Settings {
        self.settings.read().clone()
    }

    pub async fn load(&self) -> GatewayResult<Settings> {
        let settings = self
            .gateway
            .load_settings()
            .await
            .inspect_err(|e| tracing::error!("Failed to load settings: {}", e))?;
        *self.settings.write() = settings.clone();
        Ok(settings)
    }

    /// Persist `patch`; memory takes the full record the backend returns.
    pub async fn update(&self, patch: &SettingsPatch) -> GatewayResult<Settings> {
        let settings = self
            .gateway
            .save_settings(patch)
            .await
            .inspect_err(|e| tracing::error!("Failed to save settings: {}", e))?;
        *self.settings.write() = settings.clone();
        Ok(settings)
    }
}
