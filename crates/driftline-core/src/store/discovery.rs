// ── Discovery store ──
//
// Multi-category browse and search: one PagedList per list kind behind
// a ListSet, with filter switching, shape-routed search, and per-kind
// normalization through the registry.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::warn;

use crate::config::SyncConfig;
use crate::error::CoreError;
use crate::fetch::{FetchClient, PageQuery, PageRequest, SearchRequest, SearchScope};
use crate::list::{ListKind, ListSet, ListSnapshot, LoadOutcome, Page, PagedList};
use crate::model::FeedEntity;
use crate::normalize::NormalizerRegistry;
use crate::stream::ListStream;

use super::FilterMode;

pub const FILTER_TRENDING: &str = "trending";
pub const FILTER_FEATURED: &str = "featured";
/// Marker filter while a search is active; fetches go through the
/// search endpoint instead of the listing endpoint.
pub const FILTER_SEARCH: &str = "search";

/// The browse tab shown on entry and after leaving a search.
pub const DEFAULT_KIND: ListKind = ListKind::Image;

struct DiscoveryState {
    filter: FilterMode,
    search_text: String,
    category: String,
}

impl Default for DiscoveryState {
    fn default() -> Self {
        Self {
            filter: FilterMode::fetching(FILTER_TRENDING),
            search_text: String::new(),
            category: "all".to_owned(),
        }
    }
}

/// Fetch context captured when a load is issued, so a filter or search
/// change mid-flight cannot leak into the request.
enum FetchMode {
    Listing { filter: String },
    Search { query: String },
}

/// Discovery screen orchestrator.
pub struct DiscoveryStore<C> {
    client: Arc<C>,
    registry: NormalizerRegistry,
    lists: ListSet<FeedEntity>,
    state: Mutex<DiscoveryState>,
    page_size: u32,
}

impl<C> DiscoveryStore<C> {
    pub fn new(client: Arc<C>, config: &SyncConfig) -> Self {
        Self::with_registry(client, config, NormalizerRegistry::with_defaults())
    }

    /// Construct with a custom normalizer registry (extra kinds, a
    /// preload hook).
    pub fn with_registry(
        client: Arc<C>,
        config: &SyncConfig,
        registry: NormalizerRegistry,
    ) -> Self {
        Self {
            client,
            registry,
            lists: ListSet::new(DEFAULT_KIND),
            state: Mutex::new(DiscoveryState::default()),
            page_size: config.discovery_page_size,
        }
    }

    fn lock(&self) -> MutexGuard<'_, DiscoveryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Observation ──────────────────────────────────────────────

    pub fn active_kind(&self) -> ListKind {
        self.lists.active()
    }

    /// The list behind one tab (scroll position and cursor survive tab
    /// switches).
    pub fn list(&self, kind: ListKind) -> &PagedList<FeedEntity> {
        self.lists.get(kind)
    }

    pub fn snapshot(&self) -> ListSnapshot<FeedEntity> {
        self.lists.active_list().snapshot()
    }

    pub fn stream(&self) -> ListStream<FeedEntity> {
        ListStream::new(self.lists.active_list().subscribe())
    }

    pub fn filter(&self) -> FilterMode {
        self.lock().filter.clone()
    }

    pub fn search_text(&self) -> String {
        self.lock().search_text.clone()
    }

    pub fn category(&self) -> String {
        self.lock().category.clone()
    }

    /// Display-only category chip; never affects fetching.
    pub fn set_category(&self, category: impl Into<String>) {
        self.lock().category = category.into();
    }

    /// Switch the active tab. Pure state switch: the UI requests a load
    /// when it actually navigates into the tab, so no fetch is issued
    /// here (unlike [`set_filter`](Self::set_filter)).
    pub fn set_type(&self, kind: ListKind) {
        self.lists.set_active(kind);
    }
}

impl<C: FetchClient> DiscoveryStore<C> {
    /// Load the next page of the active list. Suppressed for
    /// non-fetchable kinds (recent channels).
    ///
    /// `preload` fires the registry's media hook for each normalized
    /// entity.
    pub async fn load_active(&self, force: bool, preload: bool) -> Result<LoadOutcome, CoreError> {
        let kind = self.lists.active();
        if !kind.is_fetchable() {
            return Ok(LoadOutcome::Suppressed);
        }

        let mode = self.fetch_mode();
        let result = self
            .lists
            .get(kind)
            .load_more(force, |offset| self.fetch_active(kind, mode, preload, offset))
            .await;
        if let Err(error) = &result {
            warn!(error = %error, %kind, "discovery fetch failed");
        }
        result
    }

    /// Pull-to-refresh the active list.
    pub async fn refresh(&self) -> Result<LoadOutcome, CoreError> {
        let kind = self.lists.active();
        if !kind.is_fetchable() {
            return Ok(LoadOutcome::Suppressed);
        }

        let mode = self.fetch_mode();
        let result = self
            .lists
            .get(kind)
            .refresh(|offset| self.fetch_active(kind, mode, false, offset))
            .await;
        if let Err(error) = &result {
            warn!(error = %error, %kind, "discovery refresh failed");
        }
        result
    }

    /// Switch the ranking filter. No-op when unchanged; otherwise the
    /// active list is invalidated and reloaded.
    pub async fn set_filter(&self, filter: FilterMode) -> Result<LoadOutcome, CoreError> {
        let fetches = {
            let mut st = self.lock();
            if st.filter == filter {
                return Ok(LoadOutcome::Suppressed);
            }
            let fetches = filter.is_fetching();
            st.filter = filter;
            fetches
        };

        self.lists.active_list().clear();

        if fetches {
            self.load_active(true, false).await
        } else {
            Ok(LoadOutcome::Suppressed)
        }
    }

    /// Run a search, or leave search mode when `text` is empty.
    ///
    /// The query's shape routes the type: a leading `#` or an embedded
    /// space is a content search (activity), anything else a channel
    /// search (user). Empty text restores the default browse tab and
    /// filter with a single listing reload.
    pub async fn search(&self, text: &str) -> Result<LoadOutcome, CoreError> {
        let text = text.trim();

        // Invalidate whatever the user was looking at; search always
        // starts a fresh pagination context.
        self.lists.active_list().clear();

        if text.is_empty() {
            {
                let mut st = self.lock();
                st.search_text.clear();
                st.filter = FilterMode::fetching(FILTER_TRENDING);
            }
            self.lists.set_active(DEFAULT_KIND);
            self.lists.active_list().clear();
            return self.load_active(true, false).await;
        }

        let kind = route_search(text);
        {
            let mut st = self.lock();
            st.search_text = text.to_owned();
            st.filter = FilterMode::fetching(FILTER_SEARCH);
        }
        self.lists.set_active(kind);
        self.lists.active_list().clear();
        self.load_active(true, false).await
    }

    /// Rebuild every list and restore construction-time defaults.
    /// In-flight fetches are discarded on arrival.
    pub fn reset(&self) {
        self.lists.reset_all();
        self.lists.set_active(DEFAULT_KIND);
        *self.lock() = DiscoveryState::default();
    }

    /// Capture the current fetch mode at issue time.
    fn fetch_mode(&self) -> FetchMode {
        let st = self.lock();
        if st.filter.name() == FILTER_SEARCH && !st.search_text.is_empty() {
            FetchMode::Search {
                query: st.search_text.clone(),
            }
        } else {
            FetchMode::Listing {
                filter: st.filter.name().to_owned(),
            }
        }
    }

    async fn fetch_active(
        &self,
        kind: ListKind,
        mode: FetchMode,
        preload: bool,
        offset: String,
    ) -> Result<Page<FeedEntity>, CoreError> {
        let envelope = match mode {
            FetchMode::Search { query } => {
                self.client
                    .fetch_search(SearchRequest {
                        scope: SearchScope::Entities(kind),
                        query,
                        offset,
                        limit: self.page_size,
                    })
                    .await?
            }
            FetchMode::Listing { filter } => {
                self.client
                    .fetch_page(PageRequest {
                        query: PageQuery::Discovery { kind, filter },
                        offset,
                        limit: self.page_size,
                    })
                    .await?
            }
        };

        Ok(Page {
            entities: self
                .registry
                .create_many(kind, &envelope.entities, preload),
            next_token: envelope.load_next,
        })
    }
}

/// Route a search query to a list kind by its shape: `#tag` and
/// multi-word queries search content, single words search channels.
fn route_search(text: &str) -> ListKind {
    if text.starts_with('#') || text.contains(' ') {
        ListKind::Activity
    } else {
        ListKind::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashtags_and_phrases_route_to_activity() {
        assert_eq!(route_search("#tag"), ListKind::Activity);
        assert_eq!(route_search("two words"), ListKind::Activity);
    }

    #[test]
    fn single_words_route_to_user() {
        assert_eq!(route_search("alice"), ListKind::User);
    }
}
