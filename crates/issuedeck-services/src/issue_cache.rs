//! Single-issue cache backing the issue detail view.
//!
//! Reads go memory → backend cache (`get_cached_issue`) → GitHub
//! (`fetch_single_issue`). An invalidated key skips the backend cache on its
//! next read so that read reflects the mutation that invalidated it.
//!
//! Every key carries a generation bumped by `invalidate` and `set`. A read
//! only stores its result if the generation it started under is still
//! current, so a response that predates a mutation never overwrites it.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use issuedeck_core::{Issue, IssueKey};
use issuedeck_gateway::{Gateway, GatewayResult};

struct Entry {
    issue: Issue,
    fetched_at: Instant,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<IssueKey, Entry>,
    invalidated: HashSet<IssueKey>,
    generations: HashMap<IssueKey, u64>,
}

impl CacheState {
    fn generation(&self, key: &IssueKey) -> u64 {
        self.generations.get(key).copied().unwrap_or(0)
    }

    fn bump(&mut self, key: &IssueKey) {
        *self.generations.entry(key.clone()).or_insert(0) += 1;
    }

    fn insert(&mut self, key: &IssueKey, issue: Issue) {
        self.entries.insert(
            key.clone(),
            Entry {
                issue,
                fetched_at: Instant::now(),
            },
        );
        self.invalidated.remove(key);
    }
}

pub struct IssueCache {
    gateway: Arc<dyn Gateway>,
    max_age: Duration,
    state: Mutex<CacheState>,
}

impl IssueCache {
    /// Entries older than `max_age` are re-read on the next `get`.
    pub fn new(gateway: Arc<dyn Gateway>, max_age: Duration) -> Self {
        Self {
            gateway,
            max_age,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Cached issue without touching the gateway.
    pub fn peek(&self, key: &IssueKey) -> Option<Issue> {
        self.state.lock().entries.get(key).map(|e| e.issue.clone())
    }

    pub async fn get(&self, key: &IssueKey) -> GatewayResult<Issue> {
        if let Some(issue) = self.fresh_entry(key) {
            return Ok(issue);
        }

        let (generation, skip_backend_cache) = {
            let state = self.state.lock();
            (state.generation(key), state.invalidated.contains(key))
        };
        if !skip_backend_cache {
            let cached = self
                .gateway
                .get_cached_issue(&key.owner, &key.repo, key.number)
                .await?;
            if let Some(issue) = cached {
                if let Some(issue) = self.store_if_current(key, generation, issue) {
                    tracing::debug!("Issue {} served from backend cache", key);
                    return Ok(issue);
                }
                if let Some(issue) = self.fresh_entry(key) {
                    return Ok(issue);
                }
                tracing::debug!("Issue {} changed during backend cache read", key);
            }
        }

        self.refetch(key).await
    }

    /// Fetch `key` from GitHub, bypassing both cache layers.
    pub async fn refetch(&self, key: &IssueKey) -> GatewayResult<Issue> {
        loop {
            let generation = self.state.lock().generation(key);
            let issue = self
                .gateway
                .fetch_single_issue(&key.owner, &key.repo, key.number)
                .await?;

            if let Some(issue) = self.store_if_current(key, generation, issue) {
                tracing::debug!("Issue {} fetched fresh", key);
                return Ok(issue);
            }
            if let Some(issue) = self.fresh_entry(key) {
                return Ok(issue);
            }
            tracing::debug!("Issue {} changed during fetch, fetching again", key);
        }
    }

    /// Replace the cached issue, e.g. with a mutation's response.
    pub fn set(&self, key: &IssueKey, issue: Issue) -> Issue {
        let issue = issue.decorate(&key.owner, &key.repo);
        let mut state = self.state.lock();
        state.bump(key);
        state.insert(key, issue.clone());
        issue
    }

    pub fn invalidate(&self, key: &IssueKey) {
        let mut state = self.state.lock();
        state.bump(key);
        state.entries.remove(key);
        state.invalidated.insert(key.clone());
    }

    fn fresh_entry(&self, key: &IssueKey) -> Option<Issue> {
        let state = self.state.lock();
        let entry = state.entries.get(key)?;
        (entry.fetched_at.elapsed() < self.max_age).then(|| entry.issue.clone())
    }

    /// Store `issue` unless `key` was invalidated or replaced since
    /// `generation` was read.
    fn store_if_current(&self, key: &IssueKey, generation: u64, issue: Issue) -> Option<Issue> {
        let mut state = self.state.lock();
        if state.generation(key) != generation {
            return None;
        }
        let issue = issue.decorate(&key.owner, &key.repo);
        state.insert(key, issue.clone());
        Some(issue)
    }
}
