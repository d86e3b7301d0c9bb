use thiserror::Error;

/// Classified failures of a daily series fetch.
///
/// The display strings are shown to the player as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Failed to fetch stock data: {0}")]
    Network(String),

    #[error("Invalid stock ticker symbol {0}. Please enter a valid ticker.")]
    InvalidTicker(String),

    #[error("API rate limit exceeded. Please try again in a moment. ({0})")]
    RateLimited(String),

    #[error("No stock data available for {0}.")]
    EmptyResult(String),

    /// Non-throttle refusal from the provider, e.g. a premium-only request
    #[error("Alpha Vantage: {0}")]
    ProviderNotice(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err.to_string())
    }
}
