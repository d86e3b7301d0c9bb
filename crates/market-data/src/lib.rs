//! Market Data
//!
//! Daily price history for the prediction game: the bar model, the
//! fetch error taxonomy and the Alpha Vantage daily time-series client.

pub mod alpha_vantage;
pub mod error;
pub mod source;
pub mod types;

pub use alpha_vantage::{parse_daily_series, AlphaVantageClient};
pub use error::FetchError;
pub use source::DailySeriesSource;
pub use types::DailyBar;
