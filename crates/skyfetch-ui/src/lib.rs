//! Search orchestration and presentation for SkyFetch.
//!
//! `SearchOrchestrator` drives validation, the concurrent weather lookup,
//! forecast normalization and history updates, and reports every state
//! change to a `PresentationSurface`.

pub mod error_mapping;
pub mod presentation;
pub mod services;
pub mod terminal;

pub use presentation::{PresentationSurface, ViewState};
pub use services::search_service::{
    validate_city, SearchError, SearchOrchestrator, SearchOutcome, SearchPhase, SearchSettings,
    MIN_CITY_CHARS,
};
pub use terminal::TerminalSurface;
