// ── Channel feed store ──
//
// One channel's activity feed: a single PagedList plus the filter
// toggle between the fetching `feed` view and the display-only
// `rewards` view.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::SyncConfig;
use crate::error::CoreError;
use crate::fetch::{FetchClient, PageQuery, PageRequest};
use crate::list::{ListSnapshot, LoadOutcome, Page, PagedList};
use crate::model::{Activity, Guid};
use crate::stream::ListStream;

use super::FilterMode;

/// The default, fetching filter.
pub const FILTER_FEED: &str = "feed";
/// Display-only: toggles the rewards panel, never fetches.
pub const FILTER_REWARDS: &str = "rewards";

struct FeedState {
    channel: Option<Guid>,
    filter: FilterMode,
    show_rewards: bool,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            channel: None,
            filter: FilterMode::fetching(FILTER_FEED),
            show_rewards: false,
        }
    }
}

/// Per-channel feed orchestrator.
pub struct FeedStore<C> {
    client: Arc<C>,
    list: PagedList<Activity>,
    state: Mutex<FeedState>,
    page_size: u32,
}

impl<C> FeedStore<C> {
    pub fn new(client: Arc<C>, config: &SyncConfig) -> Self {
        Self {
            client,
            list: PagedList::new(),
            state: Mutex::new(FeedState::default()),
            page_size: config.feed_page_size,
        }
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bind the store to a channel. Does not clear or fetch -- callers
    /// binding a different channel follow up with [`clear`](Self::clear)
    /// and a load.
    pub fn set_channel(&self, guid: Guid) {
        self.lock().channel = Some(guid);
    }

    // ── Observation ──────────────────────────────────────────────

    pub fn snapshot(&self) -> ListSnapshot<Activity> {
        self.list.snapshot()
    }

    pub fn stream(&self) -> ListStream<Activity> {
        ListStream::new(self.list.subscribe())
    }

    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot<Activity>> {
        self.list.subscribe()
    }

    pub fn filter(&self) -> FilterMode {
        self.lock().filter.clone()
    }

    pub fn show_rewards(&self) -> bool {
        self.lock().show_rewards
    }

    pub fn is_refreshing(&self) -> bool {
        self.list.is_refreshing()
    }

    pub fn is_loaded(&self) -> bool {
        self.list.is_loaded()
    }

    pub fn can_load_more(&self) -> bool {
        self.list.can_load_more()
    }
}

impl<C: FetchClient> FeedStore<C> {
    /// Fetch the next feed page. Suppressed for display-only filters
    /// and when no channel is bound.
    pub async fn load_more(&self, force: bool) -> Result<LoadOutcome, CoreError> {
        let Some(channel) = self.fetch_context() else {
            return Ok(LoadOutcome::Suppressed);
        };

        let result = self
            .list
            .load_more(force, |offset| self.fetch_page_at(channel, offset))
            .await;
        if let Err(error) = &result {
            warn!(error = %error, "channel feed fetch failed");
        }
        result
    }

    /// Pull-to-refresh: clear and re-fetch from the top. Ignored for
    /// display-only filters; the refreshing flag is cleared on every
    /// completion path.
    pub async fn refresh(&self) -> Result<LoadOutcome, CoreError> {
        let Some(channel) = self.fetch_context() else {
            return Ok(LoadOutcome::Suppressed);
        };

        let result = self
            .list
            .refresh(|offset| self.fetch_page_at(channel, offset))
            .await;
        if let Err(error) = &result {
            warn!(error = %error, "channel feed refresh failed");
        }
        result
    }

    /// Switch the filter. No-op when unchanged. A fetching filter
    /// clears the list and reloads; a display-only filter just clears
    /// and flips the display flag.
    pub async fn set_filter(&self, filter: FilterMode) -> Result<LoadOutcome, CoreError> {
        let fetches = {
            let mut st = self.lock();
            if st.filter == filter {
                return Ok(LoadOutcome::Suppressed);
            }
            st.show_rewards = !filter.is_fetching() && filter.name() == FILTER_REWARDS;
            let fetches = filter.is_fetching();
            st.filter = filter;
            fetches
        };

        self.list.clear();

        if fetches {
            self.load_more(true).await
        } else {
            Ok(LoadOutcome::Suppressed)
        }
    }

    /// Reset list and filter state to construction defaults. The
    /// channel binding survives; an in-flight fetch is discarded on
    /// arrival.
    pub fn clear(&self) {
        self.list.clear();
        let mut st = self.lock();
        st.filter = FilterMode::fetching(FILTER_FEED);
        st.show_rewards = false;
    }

    /// Channel to fetch for, or `None` when the current state never
    /// fetches.
    fn fetch_context(&self) -> Option<Guid> {
        let st = self.lock();
        if !st.filter.is_fetching() {
            return None;
        }
        if st.channel.is_none() {
            debug!("feed load requested before a channel was bound");
        }
        st.channel.clone()
    }

    async fn fetch_page_at(
        &self,
        channel: Guid,
        offset: String,
    ) -> Result<Page<Activity>, CoreError> {
        let envelope = self
            .client
            .fetch_page(PageRequest {
                query: PageQuery::ChannelFeed { channel },
                offset,
                limit: self.page_size,
            })
            .await?;

        Ok(Page {
            entities: envelope
                .entities
                .iter()
                .filter_map(Activity::from_raw)
                .collect(),
            next_token: envelope.load_next,
        })
    }
}
