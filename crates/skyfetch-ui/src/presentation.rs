//! The outbound interface: everything the orchestrator shows goes through a
//! `PresentationSurface` as a `ViewState`.

use skyfetch_weather::{CurrentConditions, ForecastEntry};

/// One complete thing to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// No city searched yet.
    Welcome,
    /// A lookup is in flight.
    Loading,
    Error {
        message: String,
    },
    Results {
        current: CurrentConditions,
        forecast: Vec<ForecastEntry>,
    },
    /// The recent-searches list; hidden when empty.
    RecentSearches {
        cities: Vec<String>,
        visible: bool,
    },
}

impl ViewState {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn recent_searches(cities: &[String]) -> Self {
        Self::RecentSearches {
            cities: cities.to_vec(),
            visible: !cities.is_empty(),
        }
    }
}

/// Sink for view states.
pub trait PresentationSurface: Send + Sync {
    fn render(&self, state: ViewState);

    /// Toggle the "searching" indicator (and whatever input it disables).
    fn set_searching(&self, searching: bool);
}
