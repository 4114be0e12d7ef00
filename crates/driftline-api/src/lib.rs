//! Async HTTP client for the Driftline social platform API.
//!
//! This crate owns the wire-level surface consumed by `driftline-core`:
//!
//! - **[`ApiClient`]** — hand-crafted reqwest client for the paginated
//!   listing endpoints (channel feed, discovery, search), the messenger
//!   conversation endpoints, and the messenger key-unlock endpoint.
//! - **[`TransportConfig`]** — TLS and timeout settings shared by every
//!   constructed client.
//! - **[`Error`]** — failure taxonomy across transport, API envelope, and
//!   authentication, with `is_transient()` / `is_auth()` classification
//!   helpers that `driftline-core` maps into its own error type.
//! - **Wire types** ([`types`]) — the `{status, entities, "load-next"}`
//!   page envelope and the loosely-typed [`RawEntity`](types::RawEntity)
//!   records that core-side normalizers turn into domain models.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use types::{PageEnvelope, RawEntity};
