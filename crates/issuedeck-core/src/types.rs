//! Data shapes exchanged with the backend gateway.
//!
//! Field names follow the backend's JSON (snake_case). Issues arrive from
//! `fetch_issues` without `id`/`repo_name`; the issue fetcher fills those in.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Issue open/closed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    #[default]
    Open,
    Closed,
    #[serde(other)]
    Unknown,
}

/// A comment on an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A GitHub issue as shown in the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Composite `owner-repo-number` id, empty until decorated
    #[serde(default)]
    pub id: String,
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub state: IssueState,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Repository the issue was fetched from, empty until decorated
    #[serde(default, alias = "repoName")]
    pub repo_name: String,
}

impl Issue {
    /// Stamp the originating repository and the composite id.
    pub fn decorate(mut self, owner: &str, repo: &str) -> Self {
        self.id = IssueKey::new(owner, repo, self.number).composite_id();
        self.repo_name = repo.to_string();
        self
    }

    pub fn has_comment(&self, comment_id: i64) -> bool {
        self.comments.iter().any(|c| c.id == comment_id)
    }
}

/// Identifies one issue across repositories.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssueKey {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseIssueKeyError {
    #[error("issue id has no number segment: {0}")]
    MissingNumber(String),
    #[error("issue id has no repository segment: {0}")]
    MissingRepo(String),
}

impl IssueKey {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, number: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            number,
        }
    }

    pub fn composite_id(&self) -> String {
        format!("{}-{}-{}", self.owner, self.repo, self.number)
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// Parses a composite id. The owner is the first `-` segment and the
/// number the last; everything between is the repository name, so owners
/// containing `-` do not round-trip.
impl FromStr for IssueKey {
    type Err = ParseIssueKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rest, number) = s
            .rsplit_once('-')
            .ok_or_else(|| ParseIssueKeyError::MissingNumber(s.to_string()))?;
        let number = number
            .parse::<u64>()
            .map_err(|_| ParseIssueKeyError::MissingNumber(s.to_string()))?;
        let (owner, repo) = rest
            .split_once('-')
            .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty())
            .ok_or_else(|| ParseIssueKeyError::MissingRepo(s.to_string()))?;

        Ok(Self::new(owner, repo, number))
    }
}

/// An `(owner, name)` pair resolved from a selected repository entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// `owner/name` keeps its owner; a bare `name` gets `default_owner`.
    pub fn resolve(entry: &str, default_owner: &str) -> Self {
        match entry.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() => {
                Self::new(owner, name)
            }
            _ => Self::new(default_owner, entry.trim_matches('/')),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Whether the backend holds issues for a repository, and since when.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStatus {
    pub cached: bool,
    pub last_updated: DateTime<Utc>,
}

impl CacheStatus {
    /// True when the cached data is older than `window` at `now`.
    pub fn is_stale_at(&self, now: DateTime<Utc>, window: std::time::Duration) -> bool {
        match chrono::Duration::from_std(window) {
            Ok(window) => self.last_updated < now - window,
            Err(_) => false,
        }
    }
}

/// A repository visible to the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoSummary {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub visibility: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User preferences persisted by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: String,
    pub font_size: String,
    pub notifications: bool,
    /// Vault directory issues are exported to
    pub file_directory: String,
    pub api_key: Option<String>,
    pub recently_viewed: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "system".to_string(),
            font_size: "medium".to_string(),
            notifications: true,
            file_directory: String::new(),
            api_key: None,
            recently_viewed: true,
        }
    }
}

/// Partial settings update; absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_directory: Option<String>,
    /// An empty string clears the key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recently_viewed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentItem {
    pub id: String,
    pub name: String,
}

/// Recently viewed issues, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recents {
    #[serde(default)]
    pub items: Vec<RecentItem>,
}

/// Device-flow code the user enters at `verification_uri`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCode {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    /// Seconds until the code expires
    pub expires_in: u64,
    /// Minimum seconds between token polls
    pub interval: u64,
}

/// Outcome of a single `poll_for_token` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TokenPoll {
    Granted { access_token: String },
    Pending,
    SlowDown,
    Expired,
    Denied { reason: String },
}
