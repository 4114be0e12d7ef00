// ── Messenger list store ──
//
// The direct-message conversation list: paginated listing, one-shot
// search mode, push-driven unread marking, and the private-key unlock
// flow through the session seam.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use secrecy::SecretString;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::SyncConfig;
use crate::error::CoreError;
use crate::fetch::{FetchClient, PageQuery, PageRequest, SearchRequest, SearchScope};
use crate::list::{ListSnapshot, LoadOutcome, Page, PagedList};
use crate::model::{Conversation, Guid};
use crate::push::{PushChannel, PushEvent};
use crate::session::SessionKeys;
use crate::stream::ListStream;

struct MessengerState {
    search: String,
    /// Set when the search text changes; the next load goes through the
    /// search endpoint exactly once, then pagination resumes normally.
    new_search: bool,
    /// A private key is available (stored from a previous session or
    /// unlocked in this one).
    configured: bool,
    unlocking: bool,
}

impl Default for MessengerState {
    fn default() -> Self {
        Self {
            search: String::new(),
            new_search: true,
            configured: false,
            unlocking: false,
        }
    }
}

/// Which endpoint the next conversation fetch goes through.
enum FetchPath {
    Listing,
    Search(String),
}

/// Messenger screen orchestrator.
pub struct MessengerStore<C> {
    client: Arc<C>,
    session: Arc<dyn SessionKeys>,
    /// Shared with the push listener task, which flips unread markers
    /// directly on the list.
    list: Arc<PagedList<Conversation>>,
    state: Mutex<MessengerState>,
    page_size: u32,
    listen_cancel: Mutex<Option<CancellationToken>>,
}

impl<C> MessengerStore<C> {
    /// Consults the session store for a previously unlocked key and
    /// marks the store configured when one is present.
    pub fn new(client: Arc<C>, session: Arc<dyn SessionKeys>, config: &SyncConfig) -> Self {
        let configured = session.private_key().is_some();
        Self {
            client,
            session,
            list: Arc::new(PagedList::new()),
            state: Mutex::new(MessengerState {
                configured,
                ..MessengerState::default()
            }),
            page_size: config.messenger_page_size,
            listen_cancel: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MessengerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Observation ──────────────────────────────────────────────

    pub fn snapshot(&self) -> ListSnapshot<Conversation> {
        self.list.snapshot()
    }

    pub fn stream(&self) -> ListStream<Conversation> {
        ListStream::new(self.list.subscribe())
    }

    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot<Conversation>> {
        self.list.subscribe()
    }

    /// Any loaded conversation carries the unread marker.
    pub fn unread(&self) -> bool {
        self.list.snapshot().iter().any(|row| row.entity.unread)
    }

    pub fn search(&self) -> String {
        self.lock().search.clone()
    }

    pub fn is_configured(&self) -> bool {
        self.lock().configured
    }

    pub fn is_unlocking(&self) -> bool {
        self.lock().unlocking
    }

    pub fn is_refreshing(&self) -> bool {
        self.list.is_refreshing()
    }

    pub fn is_loaded(&self) -> bool {
        self.list.is_loaded()
    }

    // ── Unread marking ───────────────────────────────────────────

    /// Flip the unread marker on a conversation in the loaded window.
    /// No-op (returns `false`) when the guid is not loaded -- there is
    /// deliberately no server round-trip fallback.
    pub fn touch_conversation(&self, guid: &Guid) -> bool {
        self.list
            .mutate_where(|conv| conv.guid == *guid, |conv| conv.unread = true)
    }
}

impl<C: FetchClient> MessengerStore<C> {
    /// Load the next page of conversations.
    ///
    /// A pending search (set via [`set_search`](Self::set_search)) is
    /// consumed here: that one load goes through the search endpoint.
    /// `reload` clears the list and fetches from the top.
    pub async fn load_list(&self, reload: bool) -> Result<LoadOutcome, CoreError> {
        if self.list.is_loading() {
            return Ok(LoadOutcome::AlreadyLoading);
        }

        let path = {
            let mut st = self.lock();
            if !st.search.is_empty() && st.new_search {
                st.new_search = false;
                FetchPath::Search(st.search.clone())
            } else {
                FetchPath::Listing
            }
        };
        let force = matches!(path, FetchPath::Search(_));

        let result = if reload {
            self.list
                .refresh(|offset| self.fetch_conversations(path, offset))
                .await
        } else {
            self.list
                .load_more(force, |offset| self.fetch_conversations(path, offset))
                .await
        };
        if let Err(error) = &result {
            warn!(error = %error, "conversation fetch failed");
        }
        result
    }

    /// Change the search text and reload. Empty text leaves search mode
    /// and reloads the plain listing.
    pub async fn set_search(&self, text: &str) -> Result<LoadOutcome, CoreError> {
        {
            let mut st = self.lock();
            st.search = text.trim().to_owned();
            st.new_search = true;
        }
        self.list.clear();
        self.load_list(false).await
    }

    /// Pull-to-refresh. Dropped while a load is in flight; otherwise
    /// clears and refetches (re-running the search when one is active),
    /// with the refreshing flag cleared on every completion path.
    pub async fn refresh(&self) -> Result<LoadOutcome, CoreError> {
        if self.list.is_loading() {
            return Ok(LoadOutcome::AlreadyLoading);
        }

        {
            let mut st = self.lock();
            if !st.search.is_empty() {
                st.new_search = true;
            }
        }
        self.load_list(true).await
    }

    /// Return everything to construction defaults (logout / leaving the
    /// screen). In-flight fetches are discarded on arrival.
    pub fn reset(&self) {
        self.list.clear();
        *self.lock() = MessengerState::default();
    }

    // ── Key unlock ───────────────────────────────────────────────

    /// Unlock the messenger private key with the account password and
    /// store it through the session seam.
    ///
    /// A rejected password surfaces as [`CoreError::Auth`] -- the one
    /// error the UI presents as a blocking prompt. Never retried here.
    pub async fn unlock(&self, password: &SecretString) -> Result<(), CoreError> {
        {
            let mut st = self.lock();
            if st.unlocking {
                return Ok(());
            }
            st.unlocking = true;
        }
        let _guard = UnlockingGuard { state: &self.state };

        match self.client.fetch_private_key(password).await {
            Ok(key) => {
                self.session.set_private_key(key);
                self.lock().configured = true;
                info!("messenger key unlocked");
                Ok(())
            }
            Err(error) if error.is_auth() => Err(CoreError::Auth(error.to_string())),
            Err(error) => {
                warn!(error = %error, "key unlock fetch failed");
                Err(CoreError::Fetch(error))
            }
        }
    }

    // ── Push events ──────────────────────────────────────────────

    /// Subscribe to `touchConversation` push events. Replaces any
    /// previous subscription.
    pub fn listen(&self, push: &PushChannel) {
        let mut rx = push.subscribe();
        let token = CancellationToken::new();
        {
            let mut slot = self
                .listen_cancel
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(previous) = slot.replace(token.clone()) {
                previous.cancel();
            }
        }

        let list = Arc::clone(&self.list);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    event = rx.recv() => match event {
                        Ok(PushEvent::TouchConversation { guid }) => {
                            list.mutate_where(
                                |conv| conv.guid == guid,
                                |conv| conv.unread = true,
                            );
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "push listener lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });
    }

    /// Stop listening for push events.
    pub fn unlisten(&self) {
        let token = self
            .listen_cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(token) = token {
            token.cancel();
        }
    }

    async fn fetch_conversations(
        &self,
        path: FetchPath,
        offset: String,
    ) -> Result<Page<Conversation>, CoreError> {
        let envelope = match path {
            FetchPath::Search(query) => {
                self.client
                    .fetch_search(SearchRequest {
                        scope: SearchScope::Conversations,
                        query,
                        offset,
                        limit: self.page_size,
                    })
                    .await?
            }
            FetchPath::Listing => {
                self.client
                    .fetch_page(PageRequest {
                        query: PageQuery::Conversations,
                        offset,
                        limit: self.page_size,
                    })
                    .await?
            }
        };

        Ok(Page {
            entities: envelope
                .entities
                .iter()
                .filter_map(Conversation::from_raw)
                .collect(),
            next_token: envelope.load_next,
        })
    }
}

/// Clears the unlocking flag on every exit path of `unlock`.
struct UnlockingGuard<'a> {
    state: &'a Mutex<MessengerState>,
}

impl Drop for UnlockingGuard<'_> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .unlocking = false;
    }
}
