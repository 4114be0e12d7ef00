use thiserror::Error;

/// Top-level error type for the `driftline-core` crate.
///
/// The taxonomy is deliberately small: a page fetch that failed (transient,
/// the user retries via pull-to-refresh or load-more) and a key unlock that
/// was rejected (the one error surfaced to the user as a blocking prompt).
/// Nothing here is fatal -- every failure degrades to "list did not
/// advance".
#[derive(Debug, Error)]
pub enum CoreError {
    /// A page fetch failed. Stores log this and leave list state
    /// untouched; the caller decides whether to offer a retry.
    #[error("fetch failed: {0}")]
    Fetch(#[from] driftline_api::Error),

    /// Messenger key unlock rejected. Surfaced directly to the user;
    /// never retried automatically.
    #[error("key unlock failed: {0}")]
    Auth(String),
}

impl CoreError {
    /// `true` when retrying the same operation later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_transient(),
            Self::Auth(_) => false,
        }
    }
}
