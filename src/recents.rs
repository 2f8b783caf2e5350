use crate::storage::Store;

/// Storage key for the recency list. Distinct from the theme key so the two
/// never collide.
pub const RECENT_ROOTS_KEY: &str = "cisp_recent_roots";

/// Upper bound on remembered roots.
pub const MAX_RECENT_ROOTS: usize = 10;

/// Bounded, deduplicated, most-recent-first list of looked-up roots,
/// persisted across runs.
pub struct RecentRoots {
    store: Store,
}

impl RecentRoots {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Returns the persisted list, newest first. An absent or corrupt blob
    /// reads as an empty list, not an error.
    pub fn list(&self) -> Vec<String> {
        self.store
            .get(RECENT_ROOTS_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// Moves `root` to the front of the list, dropping any previous
    /// occurrence, and truncates to the bound. A persistence failure is
    /// logged and swallowed; a recency chip is never worth failing a lookup.
    pub fn record(&self, root: &str) {
        let mut roots = self.list();
        roots.retain(|r| r != root);
        roots.insert(0, root.to_string());
        roots.truncate(MAX_RECENT_ROOTS);

        let raw = serde_json::to_string(&roots).unwrap_or_default();
        if let Err(e) = self.store.put(RECENT_ROOTS_KEY, &raw) {
            tracing::warn!("Failed to persist recent roots: {}", e);
        }
    }
}
