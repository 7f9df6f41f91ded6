//! Issue and comment mutations.
//!
//! Nothing is applied optimistically: each operation waits for the gateway,
//! then reconciles the feed or the single-issue cache. Failures are logged
//! and returned to the caller, and caches keep their pre-mutation state.

use std::sync::Arc;

use issuedeck_core::{Issue, IssueKey, RepoRef};
use issuedeck_gateway::{Gateway, GatewayResult};

use crate::feed::IssueFeed;
use crate::issue_cache::IssueCache;

pub struct IssueMutations {
    gateway: Arc<dyn Gateway>,
    feed: Arc<IssueFeed>,
    cache: Arc<IssueCache>,
}

impl IssueMutations {
    pub fn new(gateway: Arc<dyn Gateway>, feed: Arc<IssueFeed>, cache: Arc<IssueCache>) -> Self {
        Self {
            gateway,
            feed,
            cache,
        }
    }

    /// Create an issue; the feed refetches afterwards.
    pub async fn create_issue(
        &self,
        repo: &RepoRef,
        title: &str,
        body: &str,
    ) -> GatewayResult<Issue> {
        let issue = self
            .gateway
            .create_new_issue(&repo.owner, &repo.name, title, body)
            .await
            .inspect_err(|e| tracing::error!("Failed to create issue in {}: {}", repo, e))?;

        tracing::info!("Created issue #{} in {}", issue.number, repo);
        self.feed.invalidate();
        Ok(issue.decorate(&repo.owner, &repo.name))
    }

    pub async fn add_comment(&self, key: &IssueKey, body: &str) -> GatewayResult<Issue> {
        let issue = self
            .gateway
            .add_issue_comment(&key.owner, &key.repo, key.number, body)
            .await
            .inspect_err(|e| tracing::error!("Failed to add comment to {}: {}", key, e))?;

        self.cache.invalidate(key);
        Ok(issue.decorate(&key.owner, &key.repo))
    }

    pub async fn edit_comment(
        &self,
        key: &IssueKey,
        comment_id: i64,
        body: &str,
    ) -> GatewayResult<Issue> {
        let issue = self
            .gateway
            .edit_issue_comment(&key.repo, key.number, comment_id, body)
            .await
            .inspect_err(|e| {
                tracing::error!("Failed to edit comment {} on {}: {}", comment_id, key, e)
            })?;

        self.cache.invalidate(key);
        Ok(issue.decorate(&key.owner, &key.repo))
    }

    /// Delete a comment. The returned issue goes straight into the cache
    /// so the comment disappears without waiting for a refetch.
    pub async fn delete_comment(&self, key: &IssueKey, comment_id: i64) -> GatewayResult<Issue> {
        let issue = self
            .gateway
            .delete_issue_comment(&key.repo, key.number, comment_id)
            .await
            .inspect_err(|e| {
                tracing::error!("Failed to delete comment {} on {}: {}", comment_id, key, e)
            })?;

        if issue.has_comment(comment_id) {
            tracing::warn!(
                "Backend still lists deleted comment {} on {}; dropping it locally",
                comment_id,
                key
            );
        }
        let mut issue = issue;
        issue.comments.retain(|c| c.id != comment_id);

        tracing::debug!("Comment {} deleted from {}", comment_id, key);
        Ok(self.cache.set(key, issue))
    }
}
