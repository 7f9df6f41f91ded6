//! Service-level error types.

use issuedeck_core::{AuthError, ConfigError, GatewayError, RepoRef};
use thiserror::Error;

/// One repository that failed during an aggregate fetch.
#[derive(Debug)]
pub struct RepoFailure {
    pub repo: RepoRef,
    pub error: GatewayError,
}

/// Failure of the aggregated issue feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// At least one selected repository failed; no partial list is returned.
    #[error("Failed to fetch issues: {}", describe_failures(.0))]
    Repositories(Vec<RepoFailure>),
}

fn describe_failures(failures: &[RepoFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.repo, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

impl FeedError {
    pub fn user_message(&self) -> &'static str {
        "Failed to fetch issues"
    }

    /// Repositories that caused the failure.
    pub fn failed_repos(&self) -> Vec<&RepoRef> {
        match self {
            FeedError::Repositories(failures) => failures.iter().map(|f| &f.repo).collect(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Feed(#[from] FeedError),
}

impl ServiceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ServiceError::Gateway(e) => e.user_message(),
            ServiceError::Config(e) => e.user_message(),
            ServiceError::Auth(e) => e.user_message(),
            ServiceError::Feed(e) => e.user_message(),
        }
    }
}
