use crate::services::search_service::SearchError;
use skyfetch_core::{AppError, StorageError, WeatherError};
use skyfetch_services::KvError;
use skyfetch_weather::FetchErrorKind;

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::Validation(v) => AppError::Validation(v),
            SearchError::Fetch(f) => {
                let detail = f.to_string();
                match f.kind() {
                    FetchErrorKind::NotFound => AppError::Weather(WeatherError::CityNotFound(detail)),
                    FetchErrorKind::TransientFailure => {
                        AppError::Weather(WeatherError::ServiceUnavailable(detail))
                    }
                    FetchErrorKind::MalformedResponse => {
                        AppError::Weather(WeatherError::MalformedResponse(detail))
                    }
                }
            }
            SearchError::Storage(s @ KvError::Corrupt { .. }) => {
                AppError::Storage(StorageError::Corruption(s.to_string()))
            }
            SearchError::Storage(s) => AppError::Storage(StorageError::Unavailable(s.to_string())),
        }
    }
}
