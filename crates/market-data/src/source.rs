use async_trait::async_trait;

use crate::{DailyBar, FetchError};

/// Anything that can produce a full daily history for a ticker.
///
/// Implementations return bars in ascending date order with unique dates.
#[async_trait]
pub trait DailySeriesSource: Send + Sync {
    async fn fetch_daily(&self, ticker: &str) -> Result<Vec<DailyBar>, FetchError>;
}

#[async_trait]
impl<T: DailySeriesSource + ?Sized> DailySeriesSource for std::sync::Arc<T> {
    async fn fetch_daily(&self, ticker: &str) -> Result<Vec<DailyBar>, FetchError> {
        (**self).fetch_daily(ticker).await
    }
}
