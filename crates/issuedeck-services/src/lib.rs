//! Client-side services for the issue tracker: the aggregated issue feed,
//! the single-issue cache, mutations, state stores and device login.

pub mod deck;
pub mod device_login;
pub mod error;
pub mod feed;
pub mod fetcher;
pub mod issue_cache;
pub mod mutations;
pub mod stores;

pub use deck::IssueDeck;
pub use device_login::DeviceLogin;
pub use error::{FeedError, RepoFailure, ServiceError};
pub use feed::{FeedPolicy, FeedResult, FeedSnapshot, FeedState, IssueFeed};
pub use fetcher::IssueFetcher;
pub use issue_cache::IssueCache;
pub use mutations::IssueMutations;
pub use stores::{
    AuthStore, PinnedRepoStore, RecentlyViewedStore, RepoSelectionStore, SettingsStore,
};
