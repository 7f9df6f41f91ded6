//! HTTP transport for the backend command gateway.
//!
//! Each command is `POST {base_url}/invoke/{command}` with a JSON object of
//! camelCase arguments; the response body is the command's JSON result.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::instrument;
use url::Url;

use issuedeck_core::{
    CacheStatus, DeviceCode, GatewayConfig, GatewayError, Issue, NetworkError, Recents,
    ReqwestErrorExt, RepoSummary, Settings, SettingsPatch, TokenPoll,
};

use crate::gateway::{commands, Gateway, GatewayResult};

/// Gateway client talking to the backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    base_url: Url,
    client: Client,
    token: Option<String>,
}

impl HttpGateway {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: &str, token: Option<String>) -> GatewayResult<Self> {
        Self::with_timeout(base_url, token, std::time::Duration::from_secs(30))
    }

    pub fn from_config(config: &GatewayConfig) -> GatewayResult<Self> {
        Self::with_timeout(&config.base_url, config.resolved_token(), config.timeout())
    }

    pub fn with_timeout(
        base_url: &str,
        token: Option<String>,
        timeout: std::time::Duration,
    ) -> GatewayResult<Self> {
        // A trailing slash keeps `join` from replacing the last path segment.
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized).map_err(|e| {
            NetworkError::ConnectionFailed(format!("invalid gateway URL {}: {}", base_url, e))
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| e.into_network_error())?;

        Ok(Self {
            base_url,
            client,
            token,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn command_url(&self, command: &str) -> GatewayResult<Url> {
        self.base_url
            .join(&format!("invoke/{}", command))
            .map_err(|e| GatewayError::command(command, format!("invalid command URL: {}", e)))
    }

    /// Run one backend command and decode its result.
    async fn invoke<T: DeserializeOwned>(&self, command: &str, args: Value) -> GatewayResult<T> {
        let url = self.command_url(command)?;

        let mut request = self
            .client
            .post(url)
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, "issuedeck")
            .json(&args);
        if let Some(token) = &self.token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(|e| e.into_network_error())?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::debug!("Command {} failed with {}: {}", command, status, text);
            return Err(GatewayError::Command {
                command: command.to_string(),
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let bytes = response.bytes().await.map_err(|e| e.into_network_error())?;
        let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes
        };

        serde_json::from_slice(body).map_err(|e| GatewayError::Decode {
            command: command.to_string(),
            message: e.to_string(),
        })
    }
}

/// Pull a message out of an error body: `{"error": "..."}`, a bare JSON
/// string, or the raw text.
fn error_message(text: &str) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => map
            .get("error")
            .or_else(|| map.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| text.to_string()),
        Ok(Value::String(s)) => s,
        _ => text.trim().to_string(),
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    #[instrument(skip(self), level = "debug")]
    async fn check_cache_status(&self, owner: &str, repo: &str) -> GatewayResult<CacheStatus> {
        self.invoke(
            commands::CHECK_CACHE_STATUS,
            json!({ "owner": owner, "repo": repo }),
        )
        .await
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch_issues(
        &self,
        owner: &str,
        repo: &str,
        force_refresh: bool,
    ) -> GatewayResult<Vec<Issue>> {
        self.invoke(
            commands::FETCH_ISSUES,
            json!({ "owner": owner, "repo": repo, "forceRefresh": force_refresh }),
        )
        .await
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch_single_issue(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
    ) -> GatewayResult<Issue> {
        self.invoke(
            commands::FETCH_SINGLE_ISSUE,
            json!({ "owner": owner, "repo": repo, "issueNumber": issue_number }),
        )
        .await
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_cached_issue(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
    ) -> GatewayResult<Option<Issue>> {
        self.invoke(
            commands::GET_CACHED_ISSUE,
            json!({ "owner": owner, "repo": repo, "issueNumber": issue_number }),
        )
        .await
    }

    #[instrument(skip(self, body), level = "debug")]
    async fn create_new_issue(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        body: &str,
    ) -> GatewayResult<Issue> {
        self.invoke(
            commands::CREATE_NEW_ISSUE,
            json!({ "owner": owner, "repo": repo, "title": title, "body": body }),
        )
        .await
    }

    #[instrument(skip(self, body), level = "debug")]
    async fn add_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> GatewayResult<Issue> {
        self.invoke(
            commands::ADD_ISSUE_COMMENT,
            json!({
                "owner": owner,
                "repo": repo,
                "issueNumber": issue_number,
                "body": body,
            }),
        )
        .await
    }

    #[instrument(skip(self, body), level = "debug")]
    async fn edit_issue_comment(
        &self,
        repo: &str,
        issue_number: u64,
        comment_id: i64,
        body: &str,
    ) -> GatewayResult<Issue> {
        self.invoke(
            commands::EDIT_ISSUE_COMMENT,
            json!({
                "repo": repo,
                "issueNumber": issue_number,
                "commentId": comment_id,
                "body": body,
            }),
        )
        .await
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete_issue_comment(
        &self,
        repo: &str,
        issue_number: u64,
        comment_id: i64,
    ) -> GatewayResult<Issue> {
        self.invoke(
            commands::DELETE_ISSUE_COMMENT,
            json!({
                "repo": repo,
                "issueNumber": issue_number,
                "commentNumber": comment_id,
            }),
        )
        .await
    }

    async fn get_repos_from_store(&self) -> GatewayResult<Vec<String>> {
        self.invoke(commands::GET_REPOS_FROM_STORE, json!({})).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn add_repos_to_store(&self, selected: &[String]) -> GatewayResult<Vec<String>> {
        self.invoke(
            commands::ADD_REPOS_TO_STORE,
            json!({ "selectedRepos": selected }),
        )
        .await
    }

    async fn fetch_repos(&self) -> GatewayResult<Vec<RepoSummary>> {
        self.invoke(commands::FETCH_REPOS, json!({})).await
    }

    async fn get_pinned_repos(&self) -> GatewayResult<Vec<String>> {
        self.invoke(commands::GET_PINNED_REPOS, json!({})).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn save_pinned_repos(&self, repos: &[String]) -> GatewayResult<()> {
        self.invoke(commands::SAVE_PINNED_REPOS, json!({ "repos": repos }))
            .await
    }

    async fn load_settings(&self) -> GatewayResult<Settings> {
        self.invoke(commands::LOAD_SETTINGS, json!({})).await
    }

    #[instrument(skip(self, patch), level = "debug")]
    async fn save_settings(&self, patch: &SettingsPatch) -> GatewayResult<Settings> {
        self.invoke(commands::SAVE_SETTINGS, json!({ "settings": patch }))
            .await
    }

    async fn load_recents(&self) -> GatewayResult<Recents> {
        self.invoke(commands::LOAD_RECENTS, json!({})).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn add_recent_item(&self, id: &str, name: &str) -> GatewayResult<Recents> {
        self.invoke(commands::ADD_RECENT_ITEM, json!({ "id": id, "name": name }))
            .await
    }

    async fn clear_recents(&self) -> GatewayResult<()> {
        self.invoke(commands::CLEAR_RECENTS, json!({})).await
    }

    async fn check_auth(&self) -> GatewayResult<bool> {
        self.invoke(commands::CHECK_AUTH, json!({})).await
    }

    async fn initiate_device_login(&self) -> GatewayResult<DeviceCode> {
        self.invoke(commands::INITIATE_DEVICE_LOGIN, json!({})).await
    }

    #[instrument(skip(self, device_code), level = "debug")]
    async fn poll_for_token(&self, device_code: &str) -> GatewayResult<TokenPoll> {
        self.invoke(
            commands::POLL_FOR_TOKEN,
            json!({ "deviceCode": device_code }),
        )
        .await
    }

    #[instrument(skip(self, issues), fields(count = issues.len()), level = "debug")]
    async fn save_to_obsidian(
        &self,
        issues: &[Issue],
        vault_path: &str,
    ) -> GatewayResult<String> {
        self.invoke(
            commands::SAVE_TO_OBSIDIAN,
            json!({ "issues": issues, "vaultPath": vault_path }),
        )
        .await
    }

    #[instrument(skip(self, issues), fields(count = issues.len()), level = "debug")]
    async fn generate_and_save_changelog(
        &self,
        issues: &[Issue],
        vault_path: &str,
    ) -> GatewayResult<String> {
        self.invoke(
            commands::GENERATE_AND_SAVE_CHANGELOG,
            json!({ "issues": issues, "vaultPath": vault_path }),
        )
        .await
    }
}
