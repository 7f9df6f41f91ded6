//! Scripted in-memory gateway shared by the service integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use parking_lot::Mutex;
use tokio::sync::Notify;

use issuedeck_core::{
    CacheStatus, Comment, Config, DeviceCode, GatewayError, Issue, IssueState, RecentItem,
    Recents, RepoSummary, Settings, SettingsPatch, TokenPoll,
};
use issuedeck_gateway::{Gateway, GatewayResult};

/// Issue created at 2026-01-30 12:`minute`.
pub fn issue(number: u64, minute: u32) -> Issue {
    Issue {
        id: String::new(),
        number,
        title: format!("Issue {}", number),
        body: Some(format!("Body of issue {}", number)),
        state: IssueState::Open,
        created_at: Utc.with_ymd_and_hms(2026, 1, 30, 12, minute, 0).unwrap(),
        creator: "octocat".into(),
        labels: vec![],
        assignees: vec![],
        comments: vec![],
        repo_name: String::new(),
    }
}

pub fn comment(id: i64, body: &str) -> Comment {
    Comment {
        id,
        author: "octocat".into(),
        body: body.into(),
        created_at: Utc.with_ymd_and_hms(2026, 1, 30, 13, 0, 0).unwrap(),
        updated_at: None,
    }
}

pub fn config(owner: &str) -> Config {
    let mut config = Config::default();
    config.github.owner = owner.to_string();
    config
}

pub fn fresh_status() -> CacheStatus {
    CacheStatus {
        cached: true,
        last_updated: Utc::now(),
    }
}

pub fn stale_status() -> CacheStatus {
    CacheStatus {
        cached: true,
        last_updated: Utc::now() - Duration::minutes(10),
    }
}

pub fn not_cached() -> CacheStatus {
    CacheStatus {
        cached: false,
        last_updated: Utc.timestamp_opt(0, 0).unwrap(),
    }
}

/// Backend-side merge of a settings patch; an empty api key clears it.
fn apply_patch(settings: &mut Settings, patch: &SettingsPatch) {
    if let Some(theme) = &patch.theme {
        settings.theme.clone_from(theme);
    }
    if let Some(font_size) = &patch.font_size {
        settings.font_size.clone_from(font_size);
    }
    if let Some(notifications) = patch.notifications {
        settings.notifications = notifications;
    }
    if let Some(dir) = &patch.file_directory {
        settings.file_directory.clone_from(dir);
    }
    if let Some(api_key) = &patch.api_key {
        settings.api_key = Some(api_key.clone()).filter(|k| !k.is_empty());
    }
    if let Some(recently_viewed) = patch.recently_viewed {
        settings.recently_viewed = recently_viewed;
    }
}

/// Holds one gateway call open: the call signals `entered`, then waits for
/// `release`.
#[derive(Clone, Default)]
pub struct Gate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl Gate {
    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

#[derive(Default)]
pub struct FakeState {
    /// Issues per repository name returned by `fetch_issues`
    pub issues: HashMap<String, Vec<Issue>>,
    /// Defaults to fresh and cached when absent
    pub cache_status: HashMap<String, CacheStatus>,
    pub failing_repos: HashSet<String>,
    pub failing_status: HashSet<String>,
    /// Issues on GitHub, keyed by (repo, number)
    pub remote_issues: HashMap<(String, u64), Issue>,
    /// Issues in the backend cache, keyed by (repo, number)
    pub backend_cached: HashMap<(String, u64), Issue>,
    pub fail_mutations: bool,
    pub fail_persistence: bool,

    pub pinned: Vec<String>,
    pub selected: Vec<String>,
    pub settings: Settings,
    pub recents: Recents,
    pub authed: bool,
    pub token_script: VecDeque<TokenPoll>,
    pub device_code: Option<DeviceCode>,

    // One-shot gates, taken by the next matching call
    pub cached_issue_gate: Option<Gate>,
    pub fetch_gate: Option<Gate>,
    pub token_gate: Option<Gate>,

    // Recorded calls
    pub fetch_calls: Vec<(String, String, bool)>,
    pub status_checks: usize,
    pub single_fetches: usize,
    pub cached_lookups: usize,
    pub token_polls: usize,
    pub saved_pinned: Vec<Vec<String>>,
    pub exports: Vec<(usize, String)>,
    pub changelogs: Vec<(Vec<u64>, String)>,
    pub created: Vec<(String, String)>,
}

#[derive(Default)]
pub struct FakeGateway {
    pub state: Mutex<FakeState>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_issues(self: Arc<Self>, repo: &str, issues: Vec<Issue>) -> Arc<Self> {
        {
            let mut state = self.state.lock();
            for issue in &issues {
                state
                    .remote_issues
                    .insert((repo.to_string(), issue.number), issue.clone());
            }
            state.issues.insert(repo.to_string(), issues);
        }
        self
    }

    pub fn set_status(&self, repo: &str, status: CacheStatus) {
        self.state.lock().cache_status.insert(repo.to_string(), status);
    }

    pub fn fail_repo(&self, repo: &str) {
        self.state.lock().failing_repos.insert(repo.to_string());
    }

    pub fn fetch_calls(&self) -> Vec<(String, String, bool)> {
        self.state.lock().fetch_calls.clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.state.lock().fetch_calls.len()
    }

    fn check_persistence(state: &FakeState, command: &str) -> GatewayResult<()> {
        if state.fail_persistence {
            return Err(GatewayError::command(command, "store unavailable"));
        }
        Ok(())
    }

    fn mutate<F>(&self, command: &str, repo: &str, number: u64, f: F) -> GatewayResult<Issue>
    where
        F: FnOnce(&mut Issue),
    {
        let mut state = self.state.lock();
        if state.fail_mutations {
            return Err(GatewayError::command(command, "mutation rejected"));
        }
        let issue = state
            .remote_issues
            .get_mut(&(repo.to_string(), number))
            .ok_or_else(|| GatewayError::command(command, "issue not found"))?;
        f(issue);
        Ok(issue.clone())
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn check_cache_status(&self, _owner: &str, repo: &str) -> GatewayResult<CacheStatus> {
        let mut state = self.state.lock();
        state.status_checks += 1;
        if state.failing_status.contains(repo) {
            return Err(GatewayError::command("check_cache_status", "status unavailable"));
        }
        Ok(state
            .cache_status
            .get(repo)
            .copied()
            .unwrap_or_else(fresh_status))
    }

    async fn fetch_issues(
        &self,
        owner: &str,
        repo: &str,
        force_refresh: bool,
    ) -> GatewayResult<Vec<Issue>> {
        let (result, gate) = {
            let mut state = self.state.lock();
            state
                .fetch_calls
                .push((owner.to_string(), repo.to_string(), force_refresh));
            let result = if state.failing_repos.contains(repo) {
                Err(GatewayError::command("fetch_issues", format!("{} unavailable", repo)))
            } else {
                if force_refresh {
                    state.cache_status.insert(repo.to_string(), fresh_status());
                }
                Ok(state.issues.get(repo).cloned().unwrap_or_default())
            };
            (result, state.fetch_gate.take())
        };
        if let Some(gate) = gate {
            gate.pass().await;
        }
        result
    }

    async fn fetch_single_issue(
        &self,
        _owner: &str,
        repo: &str,
        issue_number: u64,
    ) -> GatewayResult<Issue> {
        let mut state = self.state.lock();
        state.single_fetches += 1;
        let issue = state
            .remote_issues
            .get(&(repo.to_string(), issue_number))
            .cloned()
            .ok_or_else(|| GatewayError::command("fetch_single_issue", "issue not found"))?;
        state
            .backend_cached
            .insert((repo.to_string(), issue_number), issue.clone());
        Ok(issue)
    }

    async fn get_cached_issue(
        &self,
        _owner: &str,
        repo: &str,
        issue_number: u64,
    ) -> GatewayResult<Option<Issue>> {
        let (cached, gate) = {
            let mut state = self.state.lock();
            state.cached_lookups += 1;
            let cached = state
                .backend_cached
                .get(&(repo.to_string(), issue_number))
                .cloned();
            (cached, state.cached_issue_gate.take())
        };
        if let Some(gate) = gate {
            gate.pass().await;
        }
        Ok(cached)
    }

    async fn create_new_issue(
        &self,
        _owner: &str,
        repo: &str,
        title: &str,
        body: &str,
    ) -> GatewayResult<Issue> {
        let mut state = self.state.lock();
        if state.fail_mutations {
            return Err(GatewayError::command("create_new_issue", "mutation rejected"));
        }
        let list = state.issues.entry(repo.to_string()).or_default();
        let number = list.iter().map(|i| i.number).max().unwrap_or(0) + 1;
        let mut created = issue(number, 59);
        created.title = title.to_string();
        created.body = Some(body.to_string());
        list.push(created.clone());
        state
            .remote_issues
            .insert((repo.to_string(), number), created.clone());
        state.created.push((repo.to_string(), title.to_string()));
        Ok(created)
    }

    async fn add_issue_comment(
        &self,
        _owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> GatewayResult<Issue> {
        self.mutate("add_issue_comment", repo, issue_number, |issue| {
            let id = issue.comments.iter().map(|c| c.id).max().unwrap_or(100) + 1;
            issue.comments.push(comment(id, body));
        })
    }

    async fn edit_issue_comment(
        &self,
        repo: &str,
        issue_number: u64,
        comment_id: i64,
        body: &str,
    ) -> GatewayResult<Issue> {
        self.mutate("edit_issue_comment", repo, issue_number, |issue| {
            if let Some(c) = issue.comments.iter_mut().find(|c| c.id == comment_id) {
                c.body = body.to_string();
                c.updated_at = Some(Utc::now());
            }
        })
    }

    async fn delete_issue_comment(
        &self,
        repo: &str,
        issue_number: u64,
        comment_id: i64,
    ) -> GatewayResult<Issue> {
        self.mutate("delete_issue_comment", repo, issue_number, |issue| {
            issue.comments.retain(|c| c.id != comment_id);
        })
    }

    async fn get_repos_from_store(&self) -> GatewayResult<Vec<String>> {
        let state = self.state.lock();
        Self::check_persistence(&state, "get_repos_from_store")?;
        Ok(state.selected.clone())
    }

    async fn add_repos_to_store(&self, selected: &[String]) -> GatewayResult<Vec<String>> {
        let mut state = self.state.lock();
        Self::check_persistence(&state, "add_repos_to_store")?;
        state.selected = selected.to_vec();
        Ok(state.selected.clone())
    }

    async fn fetch_repos(&self) -> GatewayResult<Vec<RepoSummary>> {
        let state = self.state.lock();
        let mut names: Vec<&String> = state.issues.keys().collect();
        names.sort();
        Ok(names
            .into_iter()
            .map(|name| RepoSummary {
                name: name.clone(),
                full_name: format!("octocat/{}", name),
                description: None,
                language: None,
                stargazers_count: 0,
                fork: false,
                visibility: "public".into(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .collect())
    }

    async fn get_pinned_repos(&self) -> GatewayResult<Vec<String>> {
        let state = self.state.lock();
        Self::check_persistence(&state, "get_pinned_repos")?;
        Ok(state.pinned.clone())
    }

    async fn save_pinned_repos(&self, repos: &[String]) -> GatewayResult<()> {
        let mut state = self.state.lock();
        Self::check_persistence(&state, "save_pinned_repos")?;
        state.pinned = repos.to_vec();
        state.saved_pinned.push(repos.to_vec());
        Ok(())
    }

    async fn load_settings(&self) -> GatewayResult<Settings> {
        let state = self.state.lock();
        Self::check_persistence(&state, "load_settings")?;
        Ok(state.settings.clone())
    }

    async fn save_settings(&self, patch: &SettingsPatch) -> GatewayResult<Settings> {
        let mut state = self.state.lock();
        Self::check_persistence(&state, "save_settings")?;
        apply_patch(&mut state.settings, patch);
        Ok(state.settings.clone())
    }

    async fn load_recents(&self) -> GatewayResult<Recents> {
        let state = self.state.lock();
        Self::check_persistence(&state, "load_recents")?;
        Ok(state.recents.clone())
    }

    async fn add_recent_item(&self, id: &str, name: &str) -> GatewayResult<Recents> {
        let mut state = self.state.lock();
        Self::check_persistence(&state, "add_recent_item")?;
        state.recents.items.retain(|item| item.id != id);
        state.recents.items.insert(
            0,
            RecentItem {
                id: id.to_string(),
                name: name.to_string(),
            },
        );
        Ok(state.recents.clone())
    }

    async fn clear_recents(&self) -> GatewayResult<()> {
        let mut state = self.state.lock();
        Self::check_persistence(&state, "clear_recents")?;
        state.recents = Recents::default();
        Ok(())
    }

    async fn check_auth(&self) -> GatewayResult<bool> {
        Ok(self.state.lock().authed)
    }

    async fn initiate_device_login(&self) -> GatewayResult<DeviceCode> {
        let state = self.state.lock();
        Ok(state.device_code.clone().unwrap_or_else(|| DeviceCode {
            device_code: "dev-123".into(),
            user_code: "ABCD-1234".into(),
            verification_uri: "https://github.com/login/device".into(),
            expires_in: 900,
            interval: 5,
        }))
    }

    async fn poll_for_token(&self, device_code: &str) -> GatewayResult<TokenPoll> {
        let (poll, gate) = {
            let mut state = self.state.lock();
            state.token_polls += 1;
            assert_eq!(device_code, "dev-123");
            let poll = state.token_script.pop_front().unwrap_or(TokenPoll::Pending);
            (poll, state.token_gate.take())
        };
        if let Some(gate) = gate {
            gate.pass().await;
        }
        Ok(poll)
    }

    async fn save_to_obsidian(&self, issues: &[Issue], vault_path: &str) -> GatewayResult<String> {
        let mut state = self.state.lock();
        state.exports.push((issues.len(), vault_path.to_string()));
        Ok(format!("Saved {} issues", issues.len()))
    }

    async fn generate_and_save_changelog(
        &self,
        issues: &[Issue],
        vault_path: &str,
    ) -> GatewayResult<String> {
        let mut state = self.state.lock();
        state.changelogs.push((
            issues.iter().map(|i| i.number).collect(),
            vault_path.to_string(),
        ));
        Ok(format!("Changelog updated with {} issues", issues.len()))
    }
}
