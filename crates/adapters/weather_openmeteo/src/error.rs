//! Provider-specific error type wrapping HTTP errors.

use weatherbell_domain::error::WeatherbellError;

/// Errors originating from the Open-Meteo provider.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// The request failed or the service answered with an error status.
    #[error("http error")]
    Http(#[from] reqwest::Error),

    /// Building the HTTP client failed.
    #[error("client configuration error")]
    Client(#[source] reqwest::Error),
}

impl From<WeatherError> for WeatherbellError {
    fn from(err: WeatherError) -> Self {
        Self::Provider(Box::new(err))
    }
}
