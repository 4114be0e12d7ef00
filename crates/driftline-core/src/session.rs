// ── Session key seam ──
//
// The messenger private key lives in external shared storage (device
// keystore in the apps). The core only reads it at construction and
// writes it back after a successful unlock, through this interface.

use std::sync::{Mutex, PoisonError};

use secrecy::SecretString;

/// Get/set access to the stored messenger private key.
///
/// Implementations are expected to be cheap; the core calls
/// `private_key()` once per store construction, not per fetch.
pub trait SessionKeys: Send + Sync {
    fn private_key(&self) -> Option<SecretString>;
    fn set_private_key(&self, key: SecretString);
}

/// In-memory implementation: the default for tests and for embedders
/// that manage persistence themselves.
#[derive(Default)]
pub struct MemorySessionKeys {
    key: Mutex<Option<SecretString>>,
}

impl MemorySessionKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded with a key, as after a previous unlock.
    pub fn with_key(key: SecretString) -> Self {
        Self {
            key: Mutex::new(Some(key)),
        }
    }
}

impl SessionKeys for MemorySessionKeys {
    fn private_key(&self) -> Option<SecretString> {
        self.key
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_private_key(&self, key: SecretString) {
        *self.key.lock().unwrap_or_else(PoisonError::into_inner) = Some(key);
    }
}
