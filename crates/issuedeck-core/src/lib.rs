pub mod config;
pub mod error;
pub mod types;

pub use config::{
    Config, GatewayConfig, GitHubConfig, PollingConfig, ValidationResult, GATEWAY_TOKEN_ENV,
};
pub use error::{AuthError, ConfigError, GatewayError, NetworkError, ReqwestErrorExt};
pub use types::{
    CacheStatus, Comment, DeviceCode, Issue, IssueKey, IssueState, RecentItem, Recents,
    RepoRef, RepoSummary, Settings, SettingsPatch, TokenPoll,
};

use anyhow::Result;

/// Initialize logging for the process.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!("IssueDeck core initialized");
    Ok(())
}
