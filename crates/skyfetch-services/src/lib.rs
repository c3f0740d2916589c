//! Local persistence for SkyFetch: the key-value store seam and the
//! recent-searches history built on top of it.

pub mod history;
pub mod kv_backend;
pub mod kv_store;
pub mod memory;
pub mod recent;

pub use history::{SearchHistory, LAST_CITY_KEY, RECENT_SEARCHES_KEY};
pub use kv_backend::{KeyValueStore, KvError, KvResult};
pub use kv_store::SqliteKvStore;
pub use memory::MemoryKvStore;
pub use recent::{canonicalize_city, DecodeOutcome, RecentSearches, RECENT_FORMAT_VERSION};
