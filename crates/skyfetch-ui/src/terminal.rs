//! Line-oriented rendering of view states.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::presentation::{PresentationSurface, ViewState};

/// Writes each view state as plain text to `out` (stdout by default).
pub struct TerminalSurface<W: Write + Send = io::Stdout> {
    out: Mutex<W>,
    searching: AtomicBool,
}

impl TerminalSurface<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            searching: AtomicBool::new(false),
        }
    }

    /// True while a lookup is in flight.
    pub fn is_searching(&self) -> bool {
        self.searching.load(Ordering::SeqCst)
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

/// Text for one view state. Empty for a hidden recent list.
pub fn format_view(state: &ViewState) -> String {
    match state {
        ViewState::Welcome => {
            "Welcome to SkyFetch! Type a city name to see its weather.".to_string()
        }
        ViewState::Loading => "Loading weather data...".to_string(),
        ViewState::Error { message } => format!("Error: {}", message),
        ViewState::Results { current, forecast } => {
            let mut text = format!(
                "{}: {}°C, {}\n  icon: {}",
                current.city_name, current.temperature_celsius, current.description, current.icon_url
            );
            if !forecast.is_empty() {
                text.push_str("\n5-day forecast:");
            }
            for day in forecast {
                text.push_str(&format!(
                    "\n  {:<4}{:>4}°C  {}",
                    day.day_label, day.temperature_celsius, day.description
                ));
            }
            text
        }
        ViewState::RecentSearches { visible: false, .. } => String::new(),
        ViewState::RecentSearches { cities, .. } => {
            let entries: Vec<String> = cities
                .iter()
                .enumerate()
                .map(|(i, city)| format!("[{}] {}", i + 1, city))
                .collect();
            format!("Recent searches: {}", entries.join("  "))
        }
    }
}

impl<W: Write + Send> PresentationSurface for TerminalSurface<W> {
    fn render(&self, state: ViewState) {
        let text = format_view(&state);
        if text.is_empty() {
            return;
        }

        let mut out = self.out.lock();
        if let Err(e) = writeln!(out, "{}", text).and_then(|_| out.flush()) {
            tracing::warn!("Failed to write to terminal: {}", e);
        }
    }

    fn set_searching(&self, searching: bool) {
        self.searching.store(searching, Ordering::SeqCst);
        tracing::debug!("Searching: {}", searching);
    }
}
