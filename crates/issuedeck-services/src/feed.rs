//! Aggregated issue feed across every selected repository.
//!
//! A refresh fans out one [`IssueFetcher`] call per repository, waits for
//! all of them, and publishes the merged list newest-first. A failing
//! repository fails the whole refresh; the previous list stays visible and
//! the snapshot carries the error.
//!
//! The poller refreshes every `poll_interval`. When any repository's
//! backend cache is older than `staleness_window` the tick forces a
//! refresh. [`IssueFeed::invalidate`] wakes the poller for an immediate
//! refresh.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use issuedeck_core::{Issue, PollingConfig, RepoRef};

use crate::error::{FeedError, RepoFailure};
use crate::fetcher::IssueFetcher;

pub type FeedResult = Result<Arc<Vec<Issue>>, FeedError>;

/// Refresh timing for the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedPolicy {
    pub poll_interval: Duration,
    pub staleness_window: Duration,
}

impl Default for FeedPolicy {
    fn default() -> Self {
        Self::from(&PollingConfig::default())
    }
}

impl From<&PollingConfig> for FeedPolicy {
    fn from(config: &PollingConfig) -> Self {
        Self {
            poll_interval: config.interval(),
            staleness_window: config.staleness_window(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedState {
    /// Nothing loaded yet
    #[default]
    Idle,
    Loading,
    Ready,
}

/// Point-in-time view of the feed, published on every change.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    pub state: FeedState,
    /// `None` until the first successful refresh
    pub issues: Option<Arc<Vec<Issue>>>,
    /// Message of the last failed refresh, cleared by the next success
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl FeedSnapshot {
    pub fn is_loading(&self) -> bool {
        self.state == FeedState::Loading
    }

    pub fn issues(&self) -> &[Issue] {
        self.issues.as_deref().map_or(&[], Vec::as_slice)
    }
}

pub struct IssueFeed {
    fetcher: IssueFetcher,
    policy: FeedPolicy,
    repos: RwLock<Vec<RepoRef>>,
    snapshot: watch::Sender<FeedSnapshot>,
    invalidated: AtomicBool,
    wake: Notify,
    next_ticket: AtomicU64,
    applied_ticket: Mutex<u64>,
    in_flight: AtomicUsize,
}

impl IssueFeed {
    pub fn new(fetcher: IssueFetcher, policy: FeedPolicy) -> Self {
        let (snapshot, _) = watch::channel(FeedSnapshot::default());
        Self {
            fetcher,
            policy,
            repos: RwLock::new(Vec::new()),
            snapshot,
            invalidated: AtomicBool::new(false),
            wake: Notify::new(),
            next_ticket: AtomicU64::new(0),
            applied_ticket: Mutex::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn policy(&self) -> FeedPolicy {
        self.policy
    }

    pub fn repositories(&self) -> Vec<RepoRef> {
        self.repos.read().clone()
    }

    /// Replace the selected repositories and schedule a refresh.
    pub fn set_repositories(&self, repos: Vec<RepoRef>) {
        tracing::info!("Issue feed now follows {} repositories", repos.len());
        *self.repos.write() = repos;
        self.invalidate();
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receive every snapshot change.
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshot.subscribe()
    }

    /// Mark the current list outdated and wake the poller.
    pub fn invalidate(&self) {
        self.invalidated.store(true, Ordering::SeqCst);
        self.wake.notify_one();
    }

    pub fn is_invalidated(&self) -> bool {
        self.invalidated.load(Ordering::SeqCst)
    }

    /// Current issues, refreshing first if never loaded or invalidated.
    pub async fn read(&self) -> FeedResult {
        let cached = self.snapshot.borrow().issues.clone();
        match cached {
            Some(issues) if !self.is_invalidated() => Ok(issues),
            _ => self.refresh(false).await,
        }
    }

    /// Manual refetch; always forces the backend to refresh.
    pub async fn refetch(&self) -> FeedResult {
        self.refresh(true).await
    }

    /// Fetch every selected repository and publish the merged list.
    pub async fn refresh(&self, force: bool) -> FeedResult {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        self.invalidated.store(false, Ordering::SeqCst);
        let repos = self.repositories();

        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.snapshot.send_modify(|s| {
            s.state = FeedState::Loading;
            s.error = None;
        });

        tracing::debug!(
            "Refreshing issues for {} repositories (force: {})",
            repos.len(),
            force
        );
        let results = join_all(repos.iter().map(|repo| self.fetcher.fetch(repo, force))).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let mut issues = Vec::new();
        let mut failures = Vec::new();
        for (repo, result) in repos.into_iter().zip(results) {
            match result {
                Ok(batch) => issues.extend(batch),
                Err(error) => failures.push(RepoFailure { repo, error }),
            }
        }

        let outcome = if failures.is_empty() {
            sort_newest_first(&mut issues);
            tracing::info!("Fetched {} issues", issues.len());
            Ok(Arc::new(issues))
        } else {
            let err = FeedError::Repositories(failures);
            tracing::warn!("{}", err);
            Err(err)
        };

        self.publish(ticket, &outcome);
        outcome
    }

    /// Apply a refresh result unless a later-started refresh already landed.
    fn publish(&self, ticket: u64, outcome: &FeedResult) {
        let mut applied = self.applied_ticket.lock();
        let still_loading = self.in_flight.load(Ordering::SeqCst) > 0;
        let superseded = ticket < *applied;
        if superseded {
            tracing::debug!("Discarding result of superseded refresh #{}", ticket);
        } else {
            *applied = ticket;
        }

        self.snapshot.send_modify(|s| {
            if !superseded {
                match outcome {
                    Ok(issues) => {
                        s.issues = Some(Arc::clone(issues));
                        s.last_updated = Some(Utc::now());
                        s.error = None;
                    }
                    Err(e) => s.error = Some(e.to_string()),
                }
            }
            s.state = if still_loading {
                FeedState::Loading
            } else if s.issues.is_some() {
                FeedState::Ready
            } else {
                FeedState::Idle
            };
        });
    }

    /// One poll tick: refresh, forcing it when any backend cache is stale.
    /// Returns `None` when no repositories are selected.
    pub async fn poll_tick(&self) -> Option<FeedResult> {
        let repos = self.repositories();
        if repos.is_empty() {
            return None;
        }

        let force = self.any_stale(&repos).await;
        if force {
            tracing::info!(
                "Cached issues older than {:?}, forcing refresh",
                self.policy.staleness_window
            );
        }
        Some(self.refresh(force).await)
    }

    async fn any_stale(&self, repos: &[RepoRef]) -> bool {
        let gateway = self.fetcher.gateway();
        let statuses = join_all(
            repos
                .iter()
                .map(|repo| gateway.check_cache_status(&repo.owner, &repo.name)),
        )
        .await;

        let now = Utc::now();
        let mut stale = false;
        for (repo, status) in repos.iter().zip(statuses) {
            match status {
                Ok(status) => {
                    stale |= status.cached && status.is_stale_at(now, self.policy.staleness_window);
                }
                Err(e) => tracing::warn!("Error checking cache for {}: {}", repo, e),
            }
        }
        stale
    }

    /// Run the poller on the current runtime until `cancel` fires.
    pub fn spawn_poller(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let feed = Arc::clone(self);
        tokio::spawn(async move { feed.run_poller(cancel).await })
    }

    async fn run_poller(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.policy.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; the initial load covers it.
        ticker.tick().await;

        tracing::info!("Issue feed poller started ({:?} interval)", self.policy.poll_interval);
        let _ = self.refresh(false).await;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = self.wake.notified() => {
                    if self.is_invalidated() {
                        let _ = self.refresh(false).await;
                    }
                }
                _ = ticker.tick() => {
                    let _ = self.poll_tick().await;
                }
            }
        }

        tracing::info!("Issue feed poller stopped");
    }
}

/// Stable sort by creation time, newest first.
fn sort_newest_first(issues: &mut [Issue]) {
    issues.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
