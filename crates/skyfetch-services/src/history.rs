//! Recent searches and the last-city shortcut, written through to a
//! `KeyValueStore`.

use std::sync::Arc;

use crate::kv_backend::{KeyValueStore, KvError, KvResult};
use crate::recent::{DecodeOutcome, RecentSearches};

/// Store key holding the encoded recency list.
pub const RECENT_SEARCHES_KEY: &str = "recentSearches";

/// Store key holding the literal argument of the last successful search.
pub const LAST_CITY_KEY: &str = "lastCity";

pub struct SearchHistory {
    store: Arc<dyn KeyValueStore>,
    recent: RecentSearches,
}

impl SearchHistory {
    /// Empty history over `store`; nothing is read until `reload`.
    pub fn new(store: Arc<dyn KeyValueStore>, max_recent: usize) -> Self {
        Self {
            store,
            recent: RecentSearches::new(max_recent),
        }
    }

    /// Create and read the persisted list.
    #[cfg(test)]
    pub fn load(store: Arc<dyn KeyValueStore>, max_recent: usize) -> Self {
        let mut history = Self::new(store, max_recent);
        let _ = history.reload();
        history
    }

    /// Replace the in-memory list with the persisted one.
    ///
    /// A value that cannot be read or decoded leaves the list empty and is
    /// returned as an error (`KvError::Corrupt` for an undecodable value).
    /// The stored value is left as is until the next mutation.
    pub fn reload(&mut self) -> KvResult<()> {
        let max_recent = self.recent.max();
        self.recent = RecentSearches::new(max_recent);

        let raw = match self.store.get(RECENT_SEARCHES_KEY)? {
            Some(raw) => raw,
            None => return Ok(()),
        };

        match RecentSearches::decode(&raw, max_recent) {
            DecodeOutcome::Current(recent) => self.recent = recent,
            DecodeOutcome::Migrated(recent) => {
                tracing::info!(
                    "Migrating {} recent searches from the unversioned format",
                    recent.len()
                );
                self.recent = recent;
            }
            DecodeOutcome::Rejected(reason) => {
                return Err(KvError::Corrupt {
                    key: RECENT_SEARCHES_KEY.to_string(),
                    reason,
                });
            }
        }

        tracing::debug!("Loaded {} recent searches", self.recent.len());
        Ok(())
    }

    pub fn cities(&self) -> &[String] {
        self.recent.cities()
    }

    pub fn recent(&self) -> &RecentSearches {
        &self.recent
    }

    /// Record a successful search.
    ///
    /// The in-memory list is updated even if a write fails; the first write
    /// error is returned after both keys have been attempted.
    pub fn record(&mut self, city: &str) -> KvResult<()> {
        self.recent.record(city);

        let recent_written = self
            .recent
            .encode()
            .map_err(|e| KvError::Other(e.into()))
            .and_then(|encoded| self.store.set(RECENT_SEARCHES_KEY, &encoded));
        let last_written = self.store.set(LAST_CITY_KEY, city);

        recent_written.and(last_written)
    }

    /// Empty the list and remove its key. The last-city shortcut is kept.
    pub fn clear(&mut self) -> KvResult<()> {
        self.recent.clear();
        self.store.remove(RECENT_SEARCHES_KEY)
    }

    /// Last searched city, with an empty value treated as absent.
    pub fn last_city(&self) -> KvResult<Option<String>> {
        Ok(self.store.get(LAST_CITY_KEY)?.filter(|city| !city.is_empty()))
    }
}
