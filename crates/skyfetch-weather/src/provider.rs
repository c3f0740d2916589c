//! OpenWeatherMap client and the `WeatherSource` seam.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::error::FetchError;
use crate::types::{CurrentConditionsDocument, ForecastDocument, WeatherBundle};

const UNITS: &str = "metric";

/// Remote source of the two weather documents for a city.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current_conditions(
        &self,
        city: &str,
    ) -> Result<CurrentConditionsDocument, FetchError>;

    async fn forecast(&self, city: &str) -> Result<ForecastDocument, FetchError>;
}

/// Fetch both documents concurrently. Fails as soon as either request fails.
pub async fn fetch_weather(
    source: &dyn WeatherSource,
    city: &str,
) -> Result<WeatherBundle, FetchError> {
    let (current, forecast) =
        tokio::try_join!(source.current_conditions(city), source.forecast(city))?;
    Ok(WeatherBundle { current, forecast })
}

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenWeatherProvider {
    pub fn with_base_url(
        api_key: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET `{base}/{endpoint}?q=..&appid=..&units=metric` and decode the body.
    async fn get_document<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        city: &str,
    ) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", UNITS)])
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            tracing::debug!("{} lookup for '{}' returned 404", endpoint, city);
            return Err(FetchError::NotFound(city.to_string()));
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!("{} lookup failed with status {}", endpoint, status);
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| FetchError::malformed(format!("{} document: {}", endpoint, e)))
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherProvider {
    #[instrument(skip(self), level = "info")]
    async fn current_conditions(
        &self,
        city: &str,
    ) -> Result<CurrentConditionsDocument, FetchError> {
        self.get_document("weather", city).await
    }

    #[instrument(skip(self), level = "info")]
    async fn forecast(&self, city: &str) -> Result<ForecastDocument, FetchError> {
        self.get_document("forecast", city).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::error::FetchErrorKind;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> OpenWeatherProvider {
        OpenWeatherProvider::with_base_url("test_key", &server.uri(), Duration::from_secs(5))
            .unwrap()
    }

    fn current_body() -> serde_json::Value {
        serde_json::json!({
            "name": "London",
            "main": {"temp": 9.4},
            "weather": [{"description": "light rain", "icon": "10d"}]
        })
    }

    fn forecast_body() -> serde_json::Value {
        serde_json::json!({
            "cnt": 2,
            "list": [
                {"dt_txt": "2024-03-04 09:00:00", "main": {"temp": 7.0}, "weather": [{"description": "mist", "icon": "50d"}]},
                {"dt_txt": "2024-03-04 12:00:00", "main": {"temp": 9.5}, "weather": [{"description": "light rain", "icon": "10d"}]}
            ]
        })
    }

    #[tokio::test]
    async fn test_current_conditions_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "Lon"))
            .and(query_param("appid", "test_key"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let doc = provider(&mock_server).current_conditions("Lon").await.unwrap();
        assert_eq!(doc.name, "London");
        assert_eq!(doc.weather[0].icon, "10d");
    }

    #[tokio::test]
    async fn test_fetch_weather_both_documents() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .mount(&mock_server)
            .await;

        let provider = provider(&mock_server);
        let bundle = fetch_weather(&provider, "London").await.unwrap();

        assert_eq!(bundle.current.name, "London");
        assert_eq!(bundle.forecast.list.len(), 2);
    }

    #[tokio::test]
    async fn test_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"cod": "404", "message": "city not found"})),
            )
            .mount(&mock_server)
            .await;

        let provider = provider(&mock_server);
        let err = fetch_weather(&provider, "Zzzqq").await.unwrap_err();

        assert_eq!(err.kind(), FetchErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_one_failed_request_fails_the_lookup() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&mock_server)
            .await;

        let provider = provider(&mock_server);
        let err = fetch_weather(&provider, "London").await.unwrap_err();

        assert!(matches!(err, FetchError::Api { status: 503, .. }));
        assert_eq!(err.kind(), FetchErrorKind::TransientFailure);
    }

    #[tokio::test]
    async fn test_missing_field_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "main": {"temp": 9.4},
                "weather": []
            })))
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server)
            .current_conditions("London")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FetchErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transient() {
        let provider = OpenWeatherProvider::with_base_url(
            "test_key",
            "http://127.0.0.1:1",
            Duration::from_secs(2),
        )
        .unwrap();

        let err = provider.forecast("London").await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
        assert_eq!(err.kind(), FetchErrorKind::TransientFailure);
    }
}
