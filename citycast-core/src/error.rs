use thiserror::Error;

/// Failure talking to the weather provider. Never produced by the pure
/// normalization functions, only by a [`crate::WeatherSource`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request to weather provider timed out")]
    Timeout,

    #[error("weather provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("network error talking to weather provider: {0}")]
    Network(String),
}

/// Outcome of a weather lookup that did not produce a value.
///
/// Every variant is an expected, user-facing result; none of them indicates a
/// bug in the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The provider reported that the location does not exist.
    #[error("location not found")]
    NotFound,

    /// The forecast contained no usable samples.
    #[error("forecast contained no usable samples")]
    Empty,

    /// The payload violated a structural assumption no default can repair.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("city name is empty")]
    BlankCity,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl LookupError {
    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedResponse(detail.into())
    }

    /// Short message suitable for showing to the person who asked.
    pub fn user_message(&self, city: &str) -> String {
        match self {
            LookupError::NotFound => {
                format!("City '{city}' not found. Please check the spelling and try again.")
            }
            LookupError::Empty => format!("No forecast data available for '{city}'."),
            LookupError::MalformedResponse(_) => {
                "The weather provider sent an unexpected response. Please try again later."
                    .to_string()
            }
            LookupError::BlankCity => "Please enter a city name!".to_string(),
            LookupError::Transport(TransportError::Timeout) => {
                "The weather provider took too long to answer. Please try again.".to_string()
            }
            LookupError::Transport(TransportError::Http { status, .. }) => {
                format!("The weather provider rejected the request (HTTP {status}).")
            }
            LookupError::Transport(TransportError::Network(_)) => {
                "Unable to reach the weather provider. Please check your connection.".to_string()
            }
        }
    }
}
