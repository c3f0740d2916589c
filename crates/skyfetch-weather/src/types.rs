use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Temperature and other scalar readings of a document or forecast sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
}

/// One weather-condition record (OpenWeatherMap returns a list; the first is primary).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionRecord {
    pub description: String,
    pub icon: String,
}

/// Pick the first condition record, rejecting an empty list.
fn primary_condition<'a>(
    conditions: &'a [ConditionRecord],
    context: &str,
) -> Result<&'a ConditionRecord, FetchError> {
    conditions
        .first()
        .ok_or_else(|| FetchError::malformed(format!("{}: empty weather condition list", context)))
}

/// Current-conditions document (`/weather`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditionsDocument {
    pub name: String,
    pub main: MainReadings,
    pub weather: Vec<ConditionRecord>,
}

impl CurrentConditionsDocument {
    pub fn primary_condition(&self) -> Result<&ConditionRecord, FetchError> {
        primary_condition(&self.weather, "current conditions")
    }
}

/// One 3-hour forecast sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastItem {
    /// Local timestamp text, e.g. "2024-03-04 12:00:00"
    pub dt_txt: String,
    pub main: MainReadings,
    pub weather: Vec<ConditionRecord>,
}

impl ForecastItem {
    pub fn primary_condition(&self) -> Result<&ConditionRecord, FetchError> {
        primary_condition(&self.weather, &self.dt_txt)
    }
}

/// Forecast document (`/forecast`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDocument {
    pub list: Vec<ForecastItem>,
}

/// Both documents for one city, as returned by a successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherBundle {
    pub current: CurrentConditionsDocument,
    pub forecast: ForecastDocument,
}

/// Current conditions view model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub city_name: String,
    pub temperature_celsius: i32,
    pub description: String,
    pub icon_url: String,
}

impl CurrentConditions {
    pub fn from_document(
        doc: &CurrentConditionsDocument,
        icon_base_url: &str,
    ) -> Result<Self, FetchError> {
        let condition = doc.primary_condition()?;
        Ok(Self {
            city_name: doc.name.clone(),
            temperature_celsius: round_temperature(doc.main.temp),
            description: condition.description.clone(),
            icon_url: icon_url(icon_base_url, &condition.icon),
        })
    }
}

/// One day of the normalized forecast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Short weekday name ("Mon", "Tue", ...)
    pub day_label: String,
    pub temperature_celsius: i32,
    pub description: String,
    pub icon_url: String,
}

/// Round to the nearest whole degree, halves toward positive infinity.
pub fn round_temperature(celsius: f64) -> i32 {
    (celsius + 0.5).floor() as i32
}

/// Icon image URL for an OpenWeatherMap icon code
pub fn icon_url(icon_base_url: &str, icon: &str) -> String {
    format!("{}/{}@2x.png", icon_base_url.trim_end_matches('/'), icon)
}
