//! Client-side state stores.
//!
//! Each store mirrors one piece of backend-persisted state. Updates are
//! persisted through the gateway first; in-memory state changes only once
//! the gateway call succeeds. Failures are logged and returned.

mod auth;
mod pinned;
mod recents;
mod selection;
mod settings;

pub use auth::AuthStore;
pub use pinned::PinnedRepoStore;
pub use recents::RecentlyViewedStore;
pub use selection::RepoSelectionStore;
pub use settings::SettingsStore;
