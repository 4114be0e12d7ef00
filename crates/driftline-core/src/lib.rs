//! Paginated list synchronization core for the Driftline SDK.
//!
//! This crate owns the state machine shared by every list-backed screen
//! of the Driftline apps: cursor-based pagination, single-flight load
//! guarding, filter/type switching with list invalidation, and
//! search-mode transitions. It sits between `driftline-api` and the
//! rendering layer:
//!
//! - **[`PagedList`]** — ordered, observable entity sequence bound to
//!   one [`Cursor`] and one fetch context. Guards against duplicate
//!   in-flight loads and discards stale responses with a per-list
//!   epoch counter. Publishes row snapshots through `watch` channels;
//!   [`ListStream`] is the subscription handle.
//!
//! - **[`ListSet`]** — one [`PagedList`] per [`ListKind`] with an
//!   active-kind switch, for screens that keep several categories
//!   alive at once.
//!
//! - **Stores** ([`FeedStore`], [`DiscoveryStore`], [`MessengerStore`])
//!   — per-screen orchestrators translating user intents (refresh,
//!   filter change, search, tab switch) into list operations.
//!   Constructed by the composition root, one per screen/session.
//!
//! - **Seams** — [`FetchClient`] (HTTP layer; implemented by
//!   `driftline_api::ApiClient`), [`NormalizerRegistry`] (raw wire
//!   entity to domain record, per list kind), [`SessionKeys`]
//!   (messenger private key storage), and [`PushChannel`] (in-process
//!   push event fan-out).
//!
//! Fetch failures never propagate as faults: a failed page load leaves
//! the list untouched with its flags cleared, and the user retries. The
//! one user-blocking error is a rejected messenger key unlock
//! ([`CoreError::Auth`]).

pub mod config;
pub mod error;
pub mod fetch;
pub mod list;
pub mod model;
pub mod normalize;
pub mod push;
pub mod session;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::SyncConfig;
pub use error::CoreError;
pub use fetch::{FetchClient, PageQuery, PageRequest, SearchRequest, SearchScope};
pub use list::{Cursor, ListKind, ListSet, ListSnapshot, LoadOutcome, Page, PagedList, Row};
pub use normalize::NormalizerRegistry;
pub use push::{PushChannel, PushEvent};
pub use session::{MemorySessionKeys, SessionKeys};
pub use store::{DiscoveryStore, FeedStore, FilterMode, MessengerStore};
pub use stream::ListStream;

// Re-export model types at the crate root for ergonomics.
pub use model::{Activity, Blog, Conversation, Entity, FeedEntity, Group, Guid, User};
