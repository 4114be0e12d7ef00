// ── Paged list ──
//
// The shared skeleton of every store: an ordered, append-growable
// sequence bound to one cursor and one fetch context, with single-flight
// load guarding and epoch-checked discard of stale responses.
//
// State lives behind a short-lived mutex that is never held across an
// await; observers consume immutable row snapshots through a `watch`
// channel.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::debug;

use crate::error::CoreError;
use crate::model::Entity;

use super::cursor::Cursor;

/// One page of normalized entities plus the next pagination token.
#[derive(Debug, Clone)]
pub struct Page<E> {
    pub entities: Vec<E>,
    /// Empty = this was the terminal page.
    pub next_token: String,
}

/// Result of a `load_more` / `refresh` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Fetched and appended `count` entities.
    Appended { count: usize },
    /// Another fetch is in flight; this request was dropped, not queued.
    /// Callers re-invoke later if they still need data.
    AlreadyLoading,
    /// Cursor exhausted and the load was not forced; no request made.
    Exhausted,
    /// The response arrived after the list moved on (reset, filter or
    /// search change) and was discarded.
    Stale,
    /// The current context never fetches (display-only filter,
    /// non-fetchable list kind).
    Suppressed,
}

/// A loaded entity plus its display key.
///
/// Guids repeat across pages, so the key folds in the position within
/// the batch and the list length at append time -- unique within one
/// rendered sequence.
#[derive(Debug, Clone)]
pub struct Row<E> {
    pub key: String,
    pub entity: E,
}

/// Immutable snapshot of the rows, cheap to clone and hand to renderers.
pub type ListSnapshot<E> = Arc<Vec<Arc<Row<E>>>>;

struct ListState<E> {
    rows: Vec<Arc<Row<E>>>,
    cursor: Cursor,
    loading: bool,
    refreshing: bool,
    loaded: bool,
    /// Bumped by every clearing operation; a fetch completion whose
    /// captured epoch no longer matches is discarded wholesale.
    epoch: u64,
}

impl<E> Default for ListState<E> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            cursor: Cursor::default(),
            loading: false,
            refreshing: false,
            loaded: false,
            epoch: 0,
        }
    }
}

/// Ordered, observable, cursor-paginated entity list.
pub struct PagedList<E> {
    state: Mutex<ListState<E>>,
    snapshot: watch::Sender<ListSnapshot<E>>,
}

impl<E> Default for PagedList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> PagedList<E> {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            state: Mutex::new(ListState::default()),
            snapshot,
        }
    }

    /// Lock the state, recovering from poisoning -- the state struct is
    /// plain data, always left consistent by the mutating methods.
    fn lock(&self) -> MutexGuard<'_, ListState<E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_locked(&self, st: &ListState<E>) {
        let rows = Arc::new(st.rows.clone());
        self.snapshot.send_modify(|snap| *snap = rows);
    }

    // ── Observation ──────────────────────────────────────────────

    /// Current row snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> ListSnapshot<E> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot<E>> {
        self.snapshot.subscribe()
    }

    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().rows.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn is_refreshing(&self) -> bool {
        self.lock().refreshing
    }

    /// `true` once at least one fetch has completed for the current
    /// context, regardless of result size. Distinguishes "not yet
    /// attempted" from "attempted, zero results".
    pub fn is_loaded(&self) -> bool {
        self.lock().loaded
    }

    pub fn is_exhausted(&self) -> bool {
        !self.lock().cursor.can_fetch_more()
    }

    pub fn can_load_more(&self) -> bool {
        let st = self.lock();
        !st.loading && st.cursor.can_fetch_more()
    }

    // ── Mutation ─────────────────────────────────────────────────

    /// Reset to the initial state without fetching. Any in-flight fetch
    /// is orphaned: its completion fails the epoch check and is dropped.
    pub fn clear(&self) {
        let mut st = self.lock();
        st.rows.clear();
        st.cursor = Cursor::default();
        st.loading = false;
        st.refreshing = false;
        st.loaded = false;
        st.epoch += 1;
        self.publish_locked(&st);
    }
}

impl<E: Entity + Clone> PagedList<E> {
    /// Fetch the next page and append it.
    ///
    /// No-op while a fetch is in flight (dropped, not queued) and when
    /// the cursor is exhausted and `force` is false. On fetch failure
    /// the rows and cursor are untouched and the error is returned for
    /// the caller to log; the loading flag is cleared on every exit
    /// path, including cancellation of the returned future.
    pub async fn load_more<F, Fut>(&self, force: bool, fetch: F) -> Result<LoadOutcome, CoreError>
    where
        F: FnOnce(String) -> Fut + Send,
        Fut: Future<Output = Result<Page<E>, CoreError>> + Send,
    {
        let (epoch, token) = {
            let mut st = self.lock();
            if st.loading {
                return Ok(LoadOutcome::AlreadyLoading);
            }
            if !force && !st.cursor.can_fetch_more() {
                return Ok(LoadOutcome::Exhausted);
            }
            st.loading = true;
            (st.epoch, st.cursor.token().to_owned())
        };

        let _guard = FlightGuard { list: self, epoch };

        let page = fetch(token).await?;
        Ok(self.apply(epoch, page))
    }

    /// Clear and re-fetch from the beginning.
    ///
    /// Dropped while a load is in flight (same guard semantics as
    /// `load_more`). The refreshing flag is cleared unconditionally on
    /// completion, success or failure.
    pub async fn refresh<F, Fut>(&self, fetch: F) -> Result<LoadOutcome, CoreError>
    where
        F: FnOnce(String) -> Fut + Send,
        Fut: Future<Output = Result<Page<E>, CoreError>> + Send,
    {
        {
            let mut st = self.lock();
            if st.loading {
                return Ok(LoadOutcome::AlreadyLoading);
            }
            st.refreshing = true;
            st.rows.clear();
            st.cursor = Cursor::default();
            st.loaded = false;
            st.epoch += 1;
            self.publish_locked(&st);
        }

        self.load_more(true, fetch).await
    }

    /// Apply a completed page, unless the list has moved to a new epoch.
    fn apply(&self, epoch: u64, page: Page<E>) -> LoadOutcome {
        let mut st = self.lock();
        if st.epoch != epoch {
            debug!(
                issued = epoch,
                current = st.epoch,
                "discarding stale page for a superseded context"
            );
            return LoadOutcome::Stale;
        }

        let base = st.rows.len();
        let count = page.entities.len();
        st.rows
            .extend(page.entities.into_iter().enumerate().map(|(index, entity)| {
                Arc::new(Row {
                    key: format!("{}:{index}:{base}", entity.guid()),
                    entity,
                })
            }));
        st.cursor.advance(page.next_token);
        st.loaded = true;
        st.loading = false;
        st.refreshing = false;
        self.publish_locked(&st);

        LoadOutcome::Appended { count }
    }

    /// Clone-on-write mutation of the first row matching `pred`.
    /// Returns `false` (and publishes nothing) when no row matches.
    pub fn mutate_where<P, F>(&self, pred: P, mutate: F) -> bool
    where
        P: Fn(&E) -> bool,
        F: FnOnce(&mut E),
    {
        let mut st = self.lock();
        let Some(pos) = st.rows.iter().position(|row| pred(&row.entity)) else {
            return false;
        };

        let mut row = (*st.rows[pos]).clone();
        mutate(&mut row.entity);
        st.rows[pos] = Arc::new(row);
        self.publish_locked(&st);
        true
    }
}

/// Clears the in-flight flags when the fetch future exits by any path --
/// return, error, or cancellation -- unless the list has since moved to
/// a new epoch (whose flags belong to the new context).
struct FlightGuard<'a, E> {
    list: &'a PagedList<E>,
    epoch: u64,
}

impl<E> Drop for FlightGuard<'_, E> {
    fn drop(&mut self) {
        let mut st = self.list.lock();
        if st.epoch == self.epoch {
            st.loading = false;
            st.refreshing = false;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Guid;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Item {
        guid: Guid,
    }

    impl Entity for Item {
        fn guid(&self) -> &Guid {
            &self.guid
        }
    }

    fn page(guids: &[&str], next: &str) -> Result<Page<Item>, CoreError> {
        Ok(Page {
            entities: guids
                .iter()
                .map(|g| Item {
                    guid: Guid::from(*g),
                })
                .collect(),
            next_token: next.to_owned(),
        })
    }

    fn keys(list: &PagedList<Item>) -> Vec<String> {
        list.snapshot().iter().map(|r| r.key.clone()).collect()
    }

    #[tokio::test]
    async fn first_load_appends_and_advances_cursor() {
        let list: PagedList<Item> = PagedList::new();
        assert!(!list.is_loaded());

        let outcome = list
            .load_more(false, |off| async move {
                assert_eq!(off, "");
                page(&["e1", "e2"], "abc")
            })
            .await
            .unwrap();

        assert_eq!(outcome, LoadOutcome::Appended { count: 2 });
        assert_eq!(list.len(), 2);
        assert!(list.is_loaded());
        assert!(!list.is_exhausted());
        assert!(list.can_load_more());
    }

    #[tokio::test]
    async fn terminal_page_appends_then_exhausts() {
        let list: PagedList<Item> = PagedList::new();
        list.load_more(false, |_| async { page(&["e1", "e2"], "abc") })
            .await
            .unwrap();

        let outcome = list
            .load_more(false, |off| async move {
                assert_eq!(off, "abc");
                page(&["e3"], "")
            })
            .await
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Appended { count: 1 });
        assert_eq!(list.len(), 3);
        assert!(list.is_exhausted());

        // Third call makes zero network requests.
        let outcome = list
            .load_more(false, |_| async { panic!("exhausted list must not fetch") })
            .await
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Exhausted);
        assert_eq!(list.len(), 3);
    }

    #[tokio::test]
    async fn empty_terminal_page_still_exhausts_and_marks_loaded() {
        let list: PagedList<Item> = PagedList::new();
        let outcome = list
            .load_more(false, |_| async { page(&[], "") })
            .await
            .unwrap();

        assert_eq!(outcome, LoadOutcome::Appended { count: 0 });
        assert!(list.is_loaded());
        assert!(list.is_exhausted());
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn second_load_while_loading_is_dropped() {
        let list: PagedList<Item> = PagedList::new();
        let list = &list;
        let outcome = list
            .load_more(false, |_| async move {
                let inner = list
                    .load_more(false, |_| async { panic!("second fetch must not run") })
                    .await
                    .unwrap();
                assert_eq!(inner, LoadOutcome::AlreadyLoading);
                page(&["e1"], "x")
            })
            .await
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Appended { count: 1 });
    }

    #[tokio::test]
    async fn refresh_while_loading_is_dropped() {
        let list: PagedList<Item> = PagedList::new();
        let list = &list;
        list.load_more(false, |_| async move {
            let inner = list
                .refresh(|_| async { panic!("refresh must not fetch while loading") })
                .await
                .unwrap();
            assert_eq!(inner, LoadOutcome::AlreadyLoading);
            page(&["e1"], "")
        })
        .await
        .unwrap();
        assert_eq!(list.len(), 1);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_state_and_clears_loading() {
        let list: PagedList<Item> = PagedList::new();
        list.load_more(false, |_| async { page(&["e1"], "abc") })
            .await
            .unwrap();

        let result = list
            .load_more(false, |_| async {
                Err(CoreError::Fetch(driftline_api::Error::Api {
                    message: "boom".into(),
                    status: 500,
                }))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(list.len(), 1);
        assert!(!list.is_loading());
        assert!(list.can_load_more());
    }

    #[tokio::test]
    async fn append_preserves_order_and_grows_monotonically() {
        let list: PagedList<Item> = PagedList::new();
        list.load_more(false, |_| async { page(&["a", "b"], "1") })
            .await
            .unwrap();
        list.load_more(false, |_| async { page(&["c"], "2") })
            .await
            .unwrap();

        let snap = list.snapshot();
        let guids: Vec<&str> = snap.iter().map(|r| r.entity.guid.as_str()).collect();
        assert_eq!(guids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn row_keys_fold_in_batch_index_and_base_length() {
        let list: PagedList<Item> = PagedList::new();
        list.load_more(false, |_| async { page(&["a", "a"], "1") })
            .await
            .unwrap();
        list.load_more(false, |_| async { page(&["a"], "") })
            .await
            .unwrap();

        // Duplicate guids stay unique within the rendered sequence.
        assert_eq!(keys(&list), vec!["a:0:0", "a:1:0", "a:0:2"]);
    }

    #[tokio::test]
    async fn refresh_replaces_entities() {
        let list: PagedList<Item> = PagedList::new();
        list.load_more(false, |_| async { page(&["old1", "old2"], "x") })
            .await
            .unwrap();

        let outcome = list
            .refresh(|off| async move {
                assert_eq!(off, "", "refresh fetches from the beginning");
                page(&["new"], "y")
            })
            .await
            .unwrap();

        assert_eq!(outcome, LoadOutcome::Appended { count: 1 });
        let snap = list.snapshot();
        let guids: Vec<&str> = snap.iter().map(|r| r.entity.guid.as_str()).collect();
        assert_eq!(guids, vec!["new"]);
        assert!(!list.is_refreshing());
    }

    #[tokio::test]
    async fn failed_refresh_clears_refreshing_flag() {
        let list: PagedList<Item> = PagedList::new();
        let result = list
            .refresh(|_| async {
                Err(CoreError::Fetch(driftline_api::Error::Api {
                    message: "down".into(),
                    status: 503,
                }))
            })
            .await;

        assert!(result.is_err());
        assert!(!list.is_refreshing());
        assert!(!list.is_loading());
    }

    #[tokio::test]
    async fn clear_mid_flight_discards_the_stale_page() {
        let list: PagedList<Item> = PagedList::new();
        let list = &list;
        let outcome = list
            .load_more(false, |_| async move {
                // Context moves on while the fetch is suspended.
                list.clear();
                page(&["stale"], "tok")
            })
            .await
            .unwrap();

        assert_eq!(outcome, LoadOutcome::Stale);
        assert!(list.is_empty());
        assert!(!list.is_loading());
        assert!(!list.is_loaded());
        assert!(list.can_load_more());
    }

    #[tokio::test]
    async fn mutate_where_flips_in_place_and_is_idempotent() {
        #[derive(Debug, Clone, PartialEq, Eq)]
        struct Flagged {
            guid: Guid,
            marked: bool,
        }
        impl Entity for Flagged {
            fn guid(&self) -> &Guid {
                &self.guid
            }
        }

        let list: PagedList<Flagged> = PagedList::new();
        list.load_more(false, |_| async {
            Ok(Page {
                entities: vec![
                    Flagged {
                        guid: Guid::from("a"),
                        marked: false,
                    },
                    Flagged {
                        guid: Guid::from("b"),
                        marked: false,
                    },
                ],
                next_token: String::new(),
            })
        })
        .await
        .unwrap();

        assert!(list.mutate_where(|c| c.guid == *"b", |c| c.marked = true));
        assert!(list.mutate_where(|c| c.guid == *"b", |c| c.marked = true));
        assert!(!list.mutate_where(|c| c.guid == *"zz", |c| c.marked = true));

        let snap = list.snapshot();
        assert!(!snap[0].entity.marked);
        assert!(snap[1].entity.marked);
    }
}
