// ── List-set coordination ──
//
// One PagedList per logical list kind, with an active-kind switch.
// Used by the discovery store, where every tab keeps its own scroll
// position and cursor.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use strum::{Display, EnumIter, IntoEnumIterator};

use super::paged::PagedList;

/// Logical key for one discovery list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ListKind {
    Image,
    Video,
    Blog,
    User,
    Group,
    Activity,
    /// Recently visited channels -- populated locally by the UI layer,
    /// never from the network.
    RecentChannels,
}

impl ListKind {
    /// Entity-type segment for the listing/search endpoints.
    /// `None` for kinds that never fetch.
    pub fn api_type(self) -> Option<&'static str> {
        match self {
            Self::Image => Some("image"),
            Self::Video => Some("video"),
            Self::Blog => Some("blog"),
            Self::User => Some("user"),
            Self::Group => Some("group"),
            Self::Activity => Some("activity"),
            Self::RecentChannels => None,
        }
    }

    pub fn is_fetchable(self) -> bool {
        self.api_type().is_some()
    }
}

/// Owns one [`PagedList`] per [`ListKind`] plus the active-kind marker.
///
/// `set_active` is a pure state switch -- the caller decides whether to
/// trigger a load on the newly active list.
pub struct ListSet<E> {
    lists: HashMap<ListKind, PagedList<E>>,
    active: Mutex<ListKind>,
}

impl<E> ListSet<E> {
    pub fn new(default_active: ListKind) -> Self {
        let lists = ListKind::iter()
            .map(|kind| (kind, PagedList::new()))
            .collect();
        Self {
            lists,
            active: Mutex::new(default_active),
        }
    }

    fn active_lock(&self) -> MutexGuard<'_, ListKind> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, kind: ListKind) -> &PagedList<E> {
        self.lists
            .get(&kind)
            .expect("every ListKind is registered at construction")
    }

    pub fn active(&self) -> ListKind {
        *self.active_lock()
    }

    pub fn active_list(&self) -> &PagedList<E> {
        self.get(self.active())
    }

    /// Switch the active kind. No implicit load.
    pub fn set_active(&self, kind: ListKind) {
        *self.active_lock() = kind;
    }

    /// Reset every list to its initial state. In-flight fetches are
    /// discarded on arrival by the per-list epoch guard.
    pub fn reset_all(&self) {
        for list in self.lists.values() {
            list.clear();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Entity, Guid};

    #[derive(Debug, Clone)]
    struct Item {
        guid: Guid,
    }

    impl Entity for Item {
        fn guid(&self) -> &Guid {
            &self.guid
        }
    }

    #[test]
    fn every_kind_gets_a_list() {
        let set: ListSet<Item> = ListSet::new(ListKind::Image);
        for kind in ListKind::iter() {
            assert!(set.get(kind).is_empty());
        }
    }

    #[test]
    fn set_active_is_a_pure_switch() {
        let set: ListSet<Item> = ListSet::new(ListKind::Image);
        set.set_active(ListKind::User);
        assert_eq!(set.active(), ListKind::User);
        assert!(!set.active_list().is_loading());
    }

    #[tokio::test]
    async fn reset_all_clears_every_list() {
        let set: ListSet<Item> = ListSet::new(ListKind::Image);
        set.get(ListKind::Blog)
            .load_more(false, |_| async {
                Ok(crate::list::Page {
                    entities: vec![Item {
                        guid: Guid::from("1"),
                    }],
                    next_token: "t".to_owned(),
                })
            })
            .await
            .unwrap();
        assert_eq!(set.get(ListKind::Blog).len(), 1);

        set.reset_all();
        assert!(set.get(ListKind::Blog).is_empty());
        assert!(!set.get(ListKind::Blog).is_loaded());
    }

    #[test]
    fn recent_channels_is_not_fetchable() {
        assert!(!ListKind::RecentChannels.is_fetchable());
        assert!(ListKind::Activity.is_fetchable());
        assert_eq!(ListKind::Image.api_type(), Some("image"));
    }
}
