//! Collapse the 3-hour forecast into one entry per day.

use chrono::NaiveDateTime;

use crate::error::FetchError;
use crate::types::{icon_url, round_temperature, ForecastEntry, ForecastItem};

/// Timestamp text identifying the midday sample of a day.
pub const MIDDAY_MARKER: &str = "12:00:00";

/// Upper bound on normalized forecast entries.
pub const MAX_FORECAST_DAYS: usize = 5;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Keep the midday samples in their original order, at most `MAX_FORECAST_DAYS`.
///
/// Running this on its own output returns the same sequence.
pub fn select_midday_samples(items: &[ForecastItem]) -> Vec<ForecastItem> {
    items
        .iter()
        .filter(|item| item.dt_txt.contains(MIDDAY_MARKER))
        .take(MAX_FORECAST_DAYS)
        .cloned()
        .collect()
}

/// Build the render-ready daily forecast.
///
/// Fewer than five midday samples yields a shorter list. A sample whose
/// timestamp or condition list cannot be read fails the whole forecast with
/// `FetchError::MalformedResponse`.
pub fn normalize_forecast(
    items: &[ForecastItem],
    icon_base_url: &str,
) -> Result<Vec<ForecastEntry>, FetchError> {
    select_midday_samples(items)
        .iter()
        .map(|item| to_entry(item, icon_base_url))
        .collect()
}

fn to_entry(item: &ForecastItem, icon_base_url: &str) -> Result<ForecastEntry, FetchError> {
    let timestamp = NaiveDateTime::parse_from_str(&item.dt_txt, TIMESTAMP_FORMAT).map_err(|e| {
        FetchError::malformed(format!("bad forecast timestamp '{}': {}", item.dt_txt, e))
    })?;
    let condition = item.primary_condition()?;

    Ok(ForecastEntry {
        day_label: timestamp.format("%a").to_string(),
        temperature_celsius: round_temperature(item.main.temp),
        description: condition.description.clone(),
        icon_url: icon_url(icon_base_url, &condition.icon),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::types::{ConditionRecord, MainReadings};

    const ICONS: &str = "https://openweathermap.org/img/wn";

    fn item(dt_txt: &str, temp: f64) -> ForecastItem {
        ForecastItem {
            dt_txt: dt_txt.to_string(),
            main: MainReadings { temp },
            weather: vec![ConditionRecord {
                description: format!("sky at {}", dt_txt),
                icon: "01d".to_string(),
            }],
        }
    }

    /// Eight samples a day, starting 2024-03-04 (a Monday).
    fn three_hourly(days: u32) -> Vec<ForecastItem> {
        let mut items = Vec::new();
        for day in 0..days {
            for hour in (0..24).step_by(3) {
                items.push(item(
                    &format!("2024-03-{:02} {:02}:00:00", 4 + day, hour),
                    f64::from(day) + f64::from(hour) / 10.0,
                ));
            }
        }
        items
    }

    #[test]
    fn test_one_entry_per_day() {
        let entries = normalize_forecast(&three_hourly(5), ICONS).unwrap();

        let labels: Vec<_> = entries.iter().map(|e| e.day_label.as_str()).collect();
        assert_eq!(labels, vec!["Mon", "Tue", "Wed", "Thu", "Fri"]);
        assert_eq!(entries[0].description, "sky at 2024-03-04 12:00:00");
    }

    #[test]
    fn test_six_middays_truncated_to_first_five() {
        let entries = normalize_forecast(&three_hourly(6), ICONS).unwrap();

        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].day_label, "Mon");
        assert_eq!(entries[4].day_label, "Fri");
    }

    #[test]
    fn test_fewer_middays_is_not_an_error() {
        let items = vec![
            item("2024-03-04 15:00:00", 4.0),
            item("2024-03-05 12:00:00", 6.4),
            item("2024-03-05 15:00:00", 7.0),
        ];

        let entries = normalize_forecast(&items, ICONS).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].day_label, "Tue");
        assert_eq!(entries[0].temperature_celsius, 6);
    }

    #[test]
    fn test_empty_forecast() {
        assert!(normalize_forecast(&[], ICONS).unwrap().is_empty());
    }

    #[test]
    fn test_selection_is_idempotent() {
        let once = select_midday_samples(&three_hourly(6));
        let twice = select_midday_samples(&once);
        assert_eq!(once, twice);
        assert_eq!(twice.len(), MAX_FORECAST_DAYS);
    }

    #[test]
    fn test_selection_preserves_order() {
        let items = vec![
            item("2024-03-06 12:00:00", 1.0),
            item("2024-03-04 12:00:00", 2.0),
        ];
        let selected = select_midday_samples(&items);
        assert_eq!(selected[0].dt_txt, "2024-03-06 12:00:00");
        assert_eq!(selected[1].dt_txt, "2024-03-04 12:00:00");
    }

    #[test]
    fn test_bad_timestamp_is_malformed() {
        let items = vec![item("tomorrow 12:00:00", 1.0)];
        let err = normalize_forecast(&items, ICONS).unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse(_)));
    }

    #[test]
    fn test_missing_condition_is_malformed() {
        let mut sample = item("2024-03-04 12:00:00", 1.0);
        sample.weather.clear();
        let err = normalize_forecast(&[sample], ICONS).unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse(_)));
    }
}
