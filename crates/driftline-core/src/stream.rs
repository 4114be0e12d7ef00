// ── Reactive list streams ──
//
// Subscription types for consuming row-snapshot changes from a PagedList.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::list::ListSnapshot;

/// A subscription to one list's row snapshots.
///
/// Provides both point-in-time snapshot access and reactive change
/// notification via `changed()` or by converting to a `Stream`.
pub struct ListStream<E> {
    current: ListSnapshot<E>,
    receiver: watch::Receiver<ListSnapshot<E>>,
}

impl<E> ListStream<E> {
    pub(crate) fn new(receiver: watch::Receiver<ListSnapshot<E>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Get the snapshot captured at creation time.
    pub fn current(&self) -> &ListSnapshot<E> {
        &self.current
    }

    /// Get the latest snapshot (may have changed since creation).
    pub fn latest(&self) -> ListSnapshot<E> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` if the owning list has been dropped.
    pub async fn changed(&mut self) -> Option<ListSnapshot<E>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> ListWatchStream<E>
    where
        E: Send + Sync + 'static,
    {
        ListWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Yields a new snapshot each time the underlying list is mutated.
pub struct ListWatchStream<E: Send + Sync + 'static> {
    inner: WatchStream<ListSnapshot<E>>,
}

impl<E: Send + Sync + 'static> Stream for ListWatchStream<E> {
    type Item = ListSnapshot<E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // WatchStream is Unpin; ListSnapshot is an Arc and always Unpin.
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
