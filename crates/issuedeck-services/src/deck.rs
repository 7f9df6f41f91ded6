//! Application context wiring every service around one gateway.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use issuedeck_core::{Config, ConfigError, Issue, IssueKey, RepoRef, RepoSummary};
use issuedeck_gateway::{Gateway, GatewayResult};

use crate::device_login::DeviceLogin;
use crate::error::ServiceError;
use crate::feed::{FeedPolicy, IssueFeed};
use crate::fetcher::IssueFetcher;
use crate::issue_cache::IssueCache;
use crate::mutations::IssueMutations;
use crate::stores::{
    AuthStore, PinnedRepoStore, RecentlyViewedStore, RepoSelectionStore, SettingsStore,
};

/// Owns the feed, the single-issue cache, the stores and the poller task.
/// Constructed once per session and passed to whatever drives the UI.
pub struct IssueDeck {
    gateway: Arc<dyn Gateway>,
    default_owner: String,
    feed: Arc<IssueFeed>,
    cache: Arc<IssueCache>,
    mutations: IssueMutations,
    auth: Arc<AuthStore>,
    pinned: PinnedRepoStore,
    recents: RecentlyViewedStore,
    settings: SettingsStore,
    selection: RepoSelectionStore,
    login: DeviceLogin,
    shutdown: CancellationToken,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl IssueDeck {
    pub fn new(gateway: Arc<dyn Gateway>, config: &Config) -> Self {
        let policy = FeedPolicy::from(&config.polling);
        let feed = Arc::new(IssueFeed::new(IssueFetcher::new(Arc::clone(&gateway)), policy));
        let cache = Arc::new(IssueCache::new(Arc::clone(&gateway), policy.poll_interval));
        let auth = Arc::new(AuthStore::new(Arc::clone(&gateway)));

        Self {
            mutations: IssueMutations::new(
                Arc::clone(&gateway),
                Arc::clone(&feed),
                Arc::clone(&cache),
            ),
            pinned: PinnedRepoStore::new(Arc::clone(&gateway)),
            recents: RecentlyViewedStore::new(Arc::clone(&gateway)),
            settings: SettingsStore::new(Arc::clone(&gateway)),
            selection: RepoSelectionStore::new(Arc::clone(&gateway)),
            login: DeviceLogin::new(Arc::clone(&gateway), Arc::clone(&auth)),
            default_owner: config.github.owner.clone(),
            gateway,
            feed,
            cache,
            auth,
            shutdown: CancellationToken::new(),
            poller: Mutex::new(None),
        }
    }

    /// Load auth status and every store, then point the feed at the saved
    /// repository selection. Store failures are logged and leave that
    /// store at its defaults.
    pub async fn initialize(&self) {
        let logged_in = self.auth.check_auth().await;
        tracing::info!("Signed in to GitHub: {}", logged_in);

        let (settings, pinned, recents, selection) = tokio::join!(
            self.settings.load(),
            self.pinned.initialize(),
            self.recents.initialize(),
            self.selection.load(),
        );
        if settings.is_err() || pinned.is_err() || recents.is_err() {
            tracing::warn!("Some stores failed to load; continuing with defaults");
        }

        if let Ok(names) = selection {
            self.feed.set_repositories(self.resolve(&names));
        }
    }

    /// Persist a new repository selection and refresh the feed with it.
    pub async fn select_repositories(&self, names: &[String]) -> GatewayResult<Vec<String>> {
        let saved = self.selection.set(names).await?;
        self.feed.set_repositories(self.resolve(&saved));
        Ok(saved)
    }

    /// Open one issue, recording it in the recently viewed list when that
    /// setting is on.
    pub async fn view_issue(&self, key: &IssueKey) -> GatewayResult<Issue> {
        let issue = self.cache.get(key).await?;

        if self.settings.get().recently_viewed {
            // Recents are best-effort; the store already logged the failure.
            let _ = self.recents.add_item(&issue.id, &issue.title).await;
        }
        Ok(issue)
    }

    /// Export issues as notes into the configured vault directory.
    pub async fn export_issues(&self, issues: &[Issue]) -> Result<String, ServiceError> {
        let vault = self.vault_directory()?;
        let message = self
            .gateway
            .save_to_obsidian(issues, &vault)
            .await
            .inspect_err(|e| tracing::error!("Failed to export issues: {}", e))?;
        tracing::info!("Exported {} issues to {}", issues.len(), vault);
        Ok(message)
    }

    /// Write a changelog section for `issues` into the vault directory.
    pub async fn generate_changelog(&self, issues: &[Issue]) -> Result<String, ServiceError> {
        let vault = self.vault_directory()?;
        let message = self
            .gateway
            .generate_and_save_changelog(issues, &vault)
            .await
            .inspect_err(|e| tracing::error!("Failed to generate changelog: {}", e))?;
        tracing::info!("Changelog written for {} issues in {}", issues.len(), vault);
        Ok(message)
    }

    fn vault_directory(&self) -> Result<String, ConfigError> {
        let vault = self.settings.get().file_directory;
        if vault.trim().is_empty() {
            return Err(ConfigError::MissingSetting("file_directory".to_string()));
        }
        Ok(vault)
    }

    /// Repositories the signed-in user can select.
    pub async fn available_repositories(&self) -> GatewayResult<Vec<RepoSummary>> {
        self.gateway.fetch_repos().await
    }

    /// Start the feed poller. Calling it again while running is a no-op.
    pub fn start(&self) {
        let mut poller = self.poller.lock();
        if poller.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }
        *poller = Some(self.feed.spawn_poller(self.shutdown.child_token()));
    }

    /// Stop the poller and wait for it to exit.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let handle = self.poller.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::warn!("Feed poller ended abnormally: {}", e);
            }
        }
    }

    fn resolve(&self, names: &[String]) -> Vec<RepoRef> {
        names
            .iter()
            .map(|name| RepoRef::resolve(name, &self.default_owner))
            .collect()
    }

    pub fn feed(&self) -> &Arc<IssueFeed> {
        &self.feed
    }

    pub fn issues(&self) -> &IssueCache {
        &self.cache
    }

    pub fn mutations(&self) -> &IssueMutations {
        &self.mutations
    }

    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    pub fn pinned(&self) -> &PinnedRepoStore {
        &self.pinned
    }

    pub fn recents(&self) -> &RecentlyViewedStore {
        &self.recents
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn selection(&self) -> &RepoSelectionStore {
        &self.selection
    }

    pub fn device_login(&self) -> &DeviceLogin {
        &self.login
    }
}
