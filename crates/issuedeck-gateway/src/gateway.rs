use async_trait::async_trait;

use issuedeck_core::{
    CacheStatus, DeviceCode, GatewayError, Issue, Recents, RepoSummary, Settings,
    SettingsPatch, TokenPoll,
};

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Backend command names.
pub mod commands {
    pub const CHECK_CACHE_STATUS: &str = "check_cache_status";
    pub const FETCH_ISSUES: &str = "fetch_issues";
    pub const FETCH_SINGLE_ISSUE: &str = "fetch_single_issue";
    pub const GET_CACHED_ISSUE: &str = "get_cached_issue";
    pub const CREATE_NEW_ISSUE: &str = "create_new_issue";
    pub const ADD_ISSUE_COMMENT: &str = "add_issue_comment";
    pub const EDIT_ISSUE_COMMENT: &str = "edit_issue_comment";
    pub const DELETE_ISSUE_COMMENT: &str = "delete_issue_comment";
    pub const GET_REPOS_FROM_STORE: &str = "get_repos_from_store";
    pub const ADD_REPOS_TO_STORE: &str = "add_repos_to_store";
    pub const FETCH_REPOS: &str = "fetch_repos";
    pub const LOAD_SETTINGS: &str = "load_settings";
    pub const SAVE_SETTINGS: &str = "save_settings";
    pub const GET_PINNED_REPOS: &str = "get_pinned_repos";
    pub const SAVE_PINNED_REPOS: &str = "save_pinned_repos";
    pub const LOAD_RECENTS: &str = "load_recents";
    pub const ADD_RECENT_ITEM: &str = "add_recent_item";
    pub const CLEAR_RECENTS: &str = "clear_recents";
    pub const CHECK_AUTH: &str = "check_auth";
    pub const INITIATE_DEVICE_LOGIN: &str = "initiate_device_login";
    pub const POLL_FOR_TOKEN: &str = "poll_for_token";
    pub const SAVE_TO_OBSIDIAN: &str = "save_to_obsidian";
    pub const GENERATE_AND_SAVE_CHANGELOG: &str = "generate_and_save_changelog";
}

/// Named operations exposed by the backend process.
///
/// Every call is a single request/response; failures come back as
/// [`GatewayError`] without distinguishing transient from permanent causes.
#[async_trait]
pub trait Gateway: Send + Sync {
    // Issues

    async fn check_cache_status(&self, owner: &str, repo: &str) -> GatewayResult<CacheStatus>;

    async fn fetch_issues(
        &self,
        owner: &str,
        repo: &str,
        force_refresh: bool,
    ) -> GatewayResult<Vec<Issue>>;

    async fn fetch_single_issue(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
    ) -> GatewayResult<Issue>;

    async fn get_cached_issue(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
    ) -> GatewayResult<Option<Issue>>;

    async fn create_new_issue(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        body: &str,
    ) -> GatewayResult<Issue>;

    // Comments

    async fn add_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> GatewayResult<Issue>;

    async fn edit_issue_comment(
        &self,
        repo: &str,
        issue_number: u64,
        comment_id: i64,
        body: &str,
    ) -> GatewayResult<Issue>;

    async fn delete_issue_comment(
        &self,
        repo: &str,
        issue_number: u64,
        comment_id: i64,
    ) -> GatewayResult<Issue>;

    // Repositories

    async fn get_repos_from_store(&self) -> GatewayResult<Vec<String>>;

    async fn add_repos_to_store(&self, selected: &[String]) -> GatewayResult<Vec<String>>;

    async fn fetch_repos(&self) -> GatewayResult<Vec<RepoSummary>>;

    async fn get_pinned_repos(&self) -> GatewayResult<Vec<String>>;

    async fn save_pinned_repos(&self, repos: &[String]) -> GatewayResult<()>;

    // Settings and recents

    async fn load_settings(&self) -> GatewayResult<Settings>;

    async fn save_settings(&self, patch: &SettingsPatch) -> GatewayResult<Settings>;

    async fn load_recents(&self) -> GatewayResult<Recents>;

    async fn add_recent_item(&self, id: &str, name: &str) -> GatewayResult<Recents>;

    async fn clear_recents(&self) -> GatewayResult<()>;

    // Auth

    async fn check_auth(&self) -> GatewayResult<bool>;

    async fn initiate_device_login(&self) -> GatewayResult<DeviceCode>;

    async fn poll_for_token(&self, device_code: &str) -> GatewayResult<TokenPoll>;

    // Export

    /// Append `issues` to today's note in `vault_path`; returns a status line.
    async fn save_to_obsidian(&self, issues: &[Issue], vault_path: &str)
        -> GatewayResult<String>;

    /// Summarize `issues` into a dated changelog section in `vault_path`;
    /// returns a status line.
    async fn generate_and_save_changelog(
        &self,
        issues: &[Issue],
        vault_path: &str,
    ) -> GatewayResult<String>;
}
