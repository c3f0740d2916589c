//! Bounded, duplicate-free, most-recent-first list of searched cities and
//! its persisted JSON form.
//!
//! Stored as `{"version":1,"cities":[...]}`. A bare array of strings (the
//! format written before versioning) is still accepted and migrated.

use serde::{Deserialize, Serialize};

/// Version written by `RecentSearches::encode`.
pub const RECENT_FORMAT_VERSION: u32 = 1;

/// First letter uppercase, the rest lowercase ("lONDON" -> "London").
///
/// Used for display and deduplication only; the remote query keeps the
/// caller's literal text.
pub fn canonicalize_city(city: &str) -> String {
    let mut chars = city.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredRecent {
    version: u32,
    cities: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredForm {
    Versioned(StoredRecent),
    Legacy(Vec<String>),
}

/// Result of reading a persisted recency value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// Current format.
    Current(RecentSearches),
    /// Legacy bare array; should be rewritten in the current format.
    Migrated(RecentSearches),
    /// Unreadable or unknown version. Carries the reason.
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentSearches {
    cities: Vec<String>,
    max: usize,
}

impl RecentSearches {
    pub fn new(max: usize) -> Self {
        Self {
            cities: Vec::new(),
            max,
        }
    }

    /// Build from an ordered list, applying canonicalization, dedup and the cap.
    pub fn from_cities<I, S>(cities: I, max: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut recent = Self::new(max);
        for city in cities {
            let canonical = canonicalize_city(city.as_ref());
            if recent.cities.len() >= max {
                break;
            }
            if !canonical.is_empty() && !recent.cities.contains(&canonical) {
                recent.cities.push(canonical);
            }
        }
        recent
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.cities.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Move `city` (canonicalized) to the front, evicting the oldest entry
    /// when the list is full.
    pub fn record(&mut self, city: &str) {
        let canonical = canonicalize_city(city);
        self.cities.retain(|c| c != &canonical);
        self.cities.insert(0, canonical);
        self.cities.truncate(self.max);
    }

    pub fn clear(&mut self) {
        self.cities.clear();
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&StoredRecent {
            version: RECENT_FORMAT_VERSION,
            cities: self.cities.clone(),
        })
    }

    pub fn decode(raw: &str, max: usize) -> DecodeOutcome {
        match serde_json::from_str::<StoredForm>(raw) {
            Ok(StoredForm::Versioned(stored)) if stored.version == RECENT_FORMAT_VERSION => {
                DecodeOutcome::Current(Self::from_cities(stored.cities, max))
            }
            Ok(StoredForm::Versioned(stored)) => {
                DecodeOutcome::Rejected(format!("unsupported format version {}", stored.version))
            }
            Ok(StoredForm::Legacy(cities)) => {
                DecodeOutcome::Migrated(Self::from_cities(cities, max))
            }
            Err(e) => DecodeOutcome::Rejected(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn list(cities: &[&str]) -> RecentSearches {
        RecentSearches::from_cities(cities.iter().copied(), 5)
    }

    #[test]
    fn test_canonicalize() {
        assert_eq!(canonicalize_city("lONDON"), "London");
        assert_eq!(canonicalize_city("paris"), "Paris");
        assert_eq!(canonicalize_city("new york"), "New york");
        assert_eq!(canonicalize_city("ñuñoa"), "Ñuñoa");
        assert_eq!(canonicalize_city(""), "");
    }

    #[test]
    fn test_record_moves_existing_to_front() {
        let mut recent = list(&["Paris", "Tokyo", "London"]);
        recent.record("paris");
        assert_eq!(recent.cities(), ["Paris", "Tokyo", "London"]);

        recent.record("LONDON");
        assert_eq!(recent.cities(), ["London", "Paris", "Tokyo"]);
    }

    #[test]
    fn test_record_evicts_oldest() {
        let mut recent = list(&["Oslo", "Rome", "Lima", "Kyiv", "Bern"]);
        recent.record("Cairo");

        assert_eq!(recent.len(), 5);
        assert_eq!(recent.cities(), ["Cairo", "Oslo", "Rome", "Lima", "Kyiv"]);
    }

    #[test]
    fn test_record_respects_custom_max() {
        let mut recent = RecentSearches::new(2);
        for city in ["a", "b", "c"] {
            recent.record(city);
        }
        assert_eq!(recent.cities(), ["C", "B"]);
    }

    #[test]
    fn test_clear() {
        let mut recent = list(&["Paris", "Tokyo"]);
        recent.clear();
        assert!(recent.is_empty());
    }

    #[test]
    fn test_encode_is_versioned() {
        let encoded = list(&["Paris", "Tokyo"]).encode().unwrap();
        assert_eq!(encoded, r#"{"version":1,"cities":["Paris","Tokyo"]}"#);

        assert_eq!(
            RecentSearches::decode(&encoded, 5),
            DecodeOutcome::Current(list(&["Paris", "Tokyo"]))
        );
    }

    #[test]
    fn test_decode_legacy_array() {
        let outcome = RecentSearches::decode(r#"["Paris","tokyo","Paris"]"#, 5);
        assert_eq!(outcome, DecodeOutcome::Migrated(list(&["Paris", "Tokyo"])));
    }

    #[test]
    fn test_decode_truncates_to_max() {
        let raw = r#"{"version":1,"cities":["A","B","C","D","E","F","G"]}"#;
        match RecentSearches::decode(raw, 5) {
            DecodeOutcome::Current(recent) => {
                assert_eq!(recent.cities(), ["A", "B", "C", "D", "E"]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_unknown_version() {
        let outcome = RecentSearches::decode(r#"{"version":7,"cities":["Paris"]}"#, 5);
        assert!(matches!(outcome, DecodeOutcome::Rejected(ref reason) if reason.contains('7')));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            RecentSearches::decode("not json", 5),
            DecodeOutcome::Rejected(_)
        ));
        assert!(matches!(
            RecentSearches::decode(r#"{"cities":"Paris"}"#, 5),
            DecodeOutcome::Rejected(_)
        ));
    }
}
