//! Per-repository issue fetch.

use std::sync::Arc;

use issuedeck_core::{Issue, RepoRef};
use issuedeck_gateway::{Gateway, GatewayResult};

/// Fetches one repository's issues, forcing a backend refresh when the
/// backend has nothing cached.
#[derive(Clone)]
pub struct IssueFetcher {
    gateway: Arc<dyn Gateway>,
}

impl IssueFetcher {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.gateway
    }

    /// Fetch issues for `repo`, each tagged with its repository name and
    /// composite id. Gateway errors are returned as-is.
    pub async fn fetch(&self, repo: &RepoRef, force: bool) -> GatewayResult<Vec<Issue>> {
        let status = self
            .gateway
            .check_cache_status(&repo.owner, &repo.name)
            .await?;

        let force_refresh = !status.cached || force;
        tracing::debug!(
            "Fetching issues for {} (cached: {}, force: {})",
            repo,
            status.cached,
            force_refresh
        );

        let issues = self
            .gateway
            .fetch_issues(&repo.owner, &repo.name, force_refresh)
            .await?;

        Ok(issues
            .into_iter()
            .map(|issue| issue.decorate(&repo.owner, &repo.name))
            .collect())
    }
}
