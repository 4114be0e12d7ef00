// ── Runtime sync configuration ──
//
// Page sizes and defaults for the three stores. The embedding app builds
// a `SyncConfig` and hands it in -- core never reads config files.

/// Tuning knobs for the list synchronization stores.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Page size for channel feed fetches.
    pub feed_page_size: u32,
    /// Page size for discovery listing and search fetches.
    pub discovery_page_size: u32,
    /// Page size for messenger conversation fetches.
    pub messenger_page_size: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            feed_page_size: 12,
            discovery_page_size: 24,
            messenger_page_size: 24,
        }
    }
}
