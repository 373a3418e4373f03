//! Open-Meteo implementation of [`WeatherProvider`].

use std::time::Duration;

use serde::Deserialize;

use weatherbell_app::ports::WeatherProvider;
use weatherbell_domain::error::WeatherbellError;
use weatherbell_domain::weather::WeatherReport;

use crate::error::WeatherError;

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";

/// Configuration for the Open-Meteo provider.
#[derive(Debug, Clone)]
pub struct Config {
    /// Service root, without the `/v1/forecast` path.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Build the provider, constructing the shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherError::Client`] when the client cannot be built.
    pub fn build(self) -> Result<OpenMeteoProvider, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(WeatherError::Client)?;
        Ok(OpenMeteoProvider {
            client,
            base_url: self.base_url,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: CurrentWeather,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: f64,
    windspeed: f64,
    weathercode: i32,
}

impl From<CurrentWeather> for WeatherReport {
    fn from(current: CurrentWeather) -> Self {
        Self {
            temperature: current.temperature,
            wind_speed: current.windspeed,
            condition_code: current.weathercode,
        }
    }
}

/// Weather provider backed by the Open-Meteo forecast API.
pub struct OpenMeteoProvider {
    client: reqwest::Client,
    base_url: String,
}

impl WeatherProvider for OpenMeteoProvider {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self, lat: f64, lon: f64) -> Result<WeatherReport, WeatherbellError> {
        let url = format!("{}/v1/forecast", self.base_url);
        let response: ForecastResponse = self
            .client
            .get(&url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("current_weather", "true".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .map_err(WeatherError::from)?
            .error_for_status()
            .map_err(WeatherError::from)?
            .json()
            .await
            .map_err(WeatherError::from)?;

        let report = WeatherReport::from(response.current_weather);
        tracing::debug!(
            temperature = report.temperature,
            code = report.condition_code,
            "weather fetched"
        );
        Ok(report)
    }
}
