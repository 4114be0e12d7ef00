// ── Sync stores ──
//
// Per-screen orchestrators: translate user intents (refresh, filter
// change, search, type switch) into PagedList operations and expose the
// resulting sequences for rendering. One instance per screen/session,
// constructed and owned by the composition root -- no globals.

mod discovery;
mod feed;
mod messenger;

pub use discovery::{
    DEFAULT_KIND, DiscoveryStore, FILTER_FEATURED, FILTER_SEARCH, FILTER_TRENDING,
};
pub use feed::{FILTER_FEED, FILTER_REWARDS, FeedStore};
pub use messenger::MessengerStore;

/// Whether a filter value triggers network fetches or only changes
/// display state.
///
/// Display-only filters (the feed store's `rewards` toggle) suppress
/// every fetch path; the no-fetch branch is a visible case here rather
/// than a string comparison buried in the load path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterMode {
    Fetching(String),
    DisplayOnly(String),
}

impl FilterMode {
    pub fn fetching(name: impl Into<String>) -> Self {
        Self::Fetching(name.into())
    }

    pub fn display_only(name: impl Into<String>) -> Self {
        Self::DisplayOnly(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Fetching(name) | Self::DisplayOnly(name) => name,
        }
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self, Self::Fetching(_))
    }
}
