//! Weather provider port.

use std::future::Future;

use weatherbell_domain::error::WeatherbellError;
use weatherbell_domain::weather::WeatherReport;

/// Fetches current weather for a coordinate.
pub trait WeatherProvider {
    /// Fetch current conditions for `(lat, lon)`.
    ///
    /// Network failures surface as [`WeatherbellError::Provider`].
    fn fetch(
        &self,
        lat: f64,
        lon: f64,
    ) -> impl Future<Output = Result<WeatherReport, WeatherbellError>> + Send;
}

impl<T: WeatherProvider + Send + Sync> WeatherProvider for std::sync::Arc<T> {
    fn fetch(
        &self,
        lat: f64,
        lon: f64,
    ) -> impl Future<Output = Result<WeatherReport, WeatherbellError>> + Send {
        (**self).fetch(lat, lon)
    }
}
