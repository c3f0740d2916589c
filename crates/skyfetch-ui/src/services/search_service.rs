//! Search orchestration: validate, fetch both documents, render, remember.
//!
//! Overlapping searches are ordered by a generation counter. Every lookup
//! takes a ticket when it starts; when the lookup settles, a ticket that is
//! no longer the newest means the result is dropped without rendering or
//! persisting anything, and the searching flag is left to the newer search.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::instrument;

use skyfetch_core::{AppError, Config, ValidationError};
use skyfetch_services::{KeyValueStore, KvError, SearchHistory};
use skyfetch_weather::{
    fetch_weather, normalize_forecast, CurrentConditions, FetchError, FetchErrorKind,
    ForecastEntry, WeatherBundle, WeatherSource,
};

use crate::presentation::{PresentationSurface, ViewState};

/// Minimum trimmed length of a city query, in characters.
pub const MIN_CITY_CHARS: usize = 2;

/// Trim and check a raw city query. The accepted text is returned as typed.
pub fn validate_city(raw: &str) -> Result<String, ValidationError> {
    let city = raw.trim();
    if city.is_empty() {
        return Err(ValidationError::EmptyInput);
    }
    if city.chars().count() < MIN_CITY_CHARS {
        return Err(ValidationError::TooShort {
            min: MIN_CITY_CHARS,
        });
    }
    Ok(city.to_string())
}

/// Errors surfaced by the search service
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Storage(#[from] KvError),
}

/// Where the single-search state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Validating,
    Rejected,
    Fetching,
    Succeeded,
    Failed,
}

/// How a search ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Rejected(ValidationError),
    Succeeded { city_name: String },
    Failed(FetchErrorKind),
    /// A newer search started before this one settled; its result was dropped.
    Superseded,
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub max_recent: usize,
    pub icon_base_url: String,
}

impl SearchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_recent: config.history.max_recent,
            icon_base_url: config.weather.icon_base_url.clone(),
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub struct SearchOrchestrator {
    source: Arc<dyn WeatherSource>,
    surface: Arc<dyn PresentationSurface>,
    history: Mutex<SearchHistory>,
    icon_base_url: String,
    generation: AtomicU64,
    phase: Mutex<SearchPhase>,
}

/// Clears the searching flag when a lookup settles, unless a newer lookup
/// has taken over.
struct SearchingGuard<'a> {
    orchestrator: &'a SearchOrchestrator,
    ticket: u64,
}

impl Drop for SearchingGuard<'_> {
    fn drop(&mut self) {
        if self.orchestrator.is_current(self.ticket) {
            self.orchestrator.surface.set_searching(false);
            self.orchestrator.set_phase(SearchPhase::Idle);
        }
    }
}

impl SearchOrchestrator {
    pub fn new(
        source: Arc<dyn WeatherSource>,
        store: Arc<dyn KeyValueStore>,
        surface: Arc<dyn PresentationSurface>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            source,
            surface,
            history: Mutex::new(SearchHistory::new(store, settings.max_recent)),
            icon_base_url: settings.icon_base_url,
            generation: AtomicU64::new(0),
            phase: Mutex::new(SearchPhase::Idle),
        }
    }

    pub fn phase(&self) -> SearchPhase {
        *self.phase.lock()
    }

    fn set_phase(&self, phase: SearchPhase) {
        let mut current = self.phase.lock();
        tracing::trace!("Search phase {:?} -> {:?}", *current, phase);
        *current = phase;
    }

    pub fn recent_searches(&self) -> Vec<String> {
        self.history.lock().cities().to_vec()
    }

    /// City at `index` in the recent list (0 = most recent).
    pub fn recent_search(&self, index: usize) -> Option<String> {
        self.history.lock().recent().get(index).map(str::to_string)
    }

    /// Read the persisted recent searches and render them. Call once at startup.
    ///
    /// An unreadable list starts empty; if it was corrupt rather than
    /// unreachable, the user is told it was reset.
    pub fn load_recent_searches(&self) {
        let (loaded, cities) = {
            let mut history = self.history.lock();
            let loaded = history.reload();
            (loaded, history.cities().to_vec())
        };
        tracing::info!("Loaded {} recent searches", cities.len());
        self.surface.render(ViewState::recent_searches(&cities));

        if let Err(e) = loaded {
            tracing::warn!("Ignoring unreadable recent searches: {}", e);
            if matches!(e, KvError::Corrupt { .. }) {
                let err = AppError::from(SearchError::from(e));
                self.surface.render(ViewState::error(err.user_message()));
            }
        }
    }

    /// Re-fetch the last searched city, or show the welcome state if there is none.
    ///
    /// Returns `None` when no lookup was started.
    pub async fn restore_session(&self) -> Option<SearchOutcome> {
        let last_city = match self.history.lock().last_city() {
            Ok(city) => city,
            Err(e) => {
                tracing::warn!("Failed to read last city: {}", e);
                None
            }
        };

        match last_city {
            Some(city) => {
                tracing::info!("Restoring last searched city '{}'", city);
                Some(self.fetch_city(&city).await)
            }
            None => {
                self.surface.render(ViewState::Welcome);
                None
            }
        }
    }

    /// Handle a typed query: validate, then look it up.
    ///
    /// A query rejected while another lookup is in flight leaves that
    /// lookup's phase alone.
    pub async fn search(&self, raw_input: &str) -> SearchOutcome {
        let lookup_in_flight = self.phase() == SearchPhase::Fetching;
        if !lookup_in_flight {
            self.set_phase(SearchPhase::Validating);
        }

        match validate_city(raw_input) {
            Ok(city) => self.fetch_city(&city).await,
            Err(e) => {
                tracing::debug!("Rejected query {:?}: {}", raw_input, e);
                if !lookup_in_flight {
                    self.set_phase(SearchPhase::Rejected);
                }
                self.surface
                    .render(ViewState::error(AppError::from(SearchError::from(e)).user_message()));
                if !lookup_in_flight {
                    self.set_phase(SearchPhase::Idle);
                }
                SearchOutcome::Rejected(e)
            }
        }
    }

    /// Look up `city` without validating it (recent-list picks, session restore).
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_city(&self, city: &str) -> SearchOutcome {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.set_phase(SearchPhase::Fetching);
        self.surface.render(ViewState::Loading);
        self.surface.set_searching(true);
        let _searching = SearchingGuard {
            orchestrator: self,
            ticket,
        };

        let result = fetch_weather(self.source.as_ref(), city).await;

        if !self.is_current(ticket) {
            tracing::debug!("Dropping superseded result for '{}'", city);
            return SearchOutcome::Superseded;
        }

        match result.and_then(|bundle| self.build_views(&bundle)) {
            Ok((current, forecast)) => {
                let city_name = current.city_name.clone();
                self.set_phase(SearchPhase::Succeeded);
                self.surface.render(ViewState::Results { current, forecast });

                if let Err(e) = self.record_search(city) {
                    tracing::warn!("Recent searches not saved: {}", e);
                }
                tracing::info!("Showing weather for {}", city_name);
                SearchOutcome::Succeeded { city_name }
            }
            Err(e) => {
                let kind = e.kind();
                match kind {
                    FetchErrorKind::NotFound => tracing::info!("No such city: '{}'", city),
                    _ => tracing::warn!("Weather lookup for '{}' failed: {}", city, e),
                }
                self.set_phase(SearchPhase::Failed);
                self.surface
                    .render(ViewState::error(AppError::from(SearchError::from(e)).user_message()));
                SearchOutcome::Failed(kind)
            }
        }
    }

    fn build_views(
        &self,
        bundle: &WeatherBundle,
    ) -> Result<(CurrentConditions, Vec<ForecastEntry>), FetchError> {
        let current = CurrentConditions::from_document(&bundle.current, &self.icon_base_url)?;
        let forecast = normalize_forecast(&bundle.forecast.list, &self.icon_base_url)?;
        Ok((current, forecast))
    }

    /// Put `city` at the front of the recent list and remember it as the last city.
    ///
    /// The in-memory list and its rendering are updated even if the store
    /// write fails; the error is returned for the caller to report.
    pub fn record_search(&self, city: &str) -> Result<(), AppError> {
        let (written, cities) = {
            let mut history = self.history.lock();
            let written = history.record(city);
            (written, history.cities().to_vec())
        };
        self.surface.render(ViewState::recent_searches(&cities));
        written.map_err(|e| SearchError::from(e).into())
    }

    /// Empty the recent list and delete it from the store. Asking the user
    /// first is the caller's job.
    pub fn clear_history(&self) -> Result<(), AppError> {
        let cleared = self.history.lock().clear();
        self.surface.render(ViewState::recent_searches(&[]));
        cleared.map_err(|e| {
            tracing::warn!("Failed to remove recent searches: {}", e);
            SearchError::from(e).into()
        })
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }
}
