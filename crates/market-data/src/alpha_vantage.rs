use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;

use crate::{DailyBar, DailySeriesSource, FetchError};

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const TIME_SERIES_KEY: &str = "Time Series (Daily)";

#[derive(Clone)]
pub struct AlphaVantageClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl AlphaVantageClient {
    pub fn new(api_key: String) -> Self {
        Self::with_options(
            api_key,
            DEFAULT_BASE_URL.to_string(),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Build a client against a custom endpoint (proxies, local stubs).
    pub fn with_options(api_key: String, base_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "HTTP client build failed, using defaults without timeout");
                Client::new()
            });

        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the full daily history for a symbol, oldest bar first.
    pub async fn get_daily_series(&self, symbol: &str) -> Result<Vec<DailyBar>, FetchError> {
        let url = format!("{}/query", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
                ("outputsize", "full"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Network(format!("HTTP {}", response.status())));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| FetchError::Network(format!("invalid response body: {}", e)))?;

        let bars = parse_daily_series(symbol, &json)?;
        tracing::debug!(symbol, records = bars.len(), "Fetched daily series");

        Ok(bars)
    }
}

#[async_trait]
impl DailySeriesSource for AlphaVantageClient {
    async fn fetch_daily(&self, ticker: &str) -> Result<Vec<DailyBar>, FetchError> {
        self.get_daily_series(ticker).await
    }
}

/// Classify a TIME_SERIES_DAILY payload and turn it into ascending bars.
///
/// Entries with an unparsable date or price are skipped.
pub fn parse_daily_series(symbol: &str, json: &Value) -> Result<Vec<DailyBar>, FetchError> {
    if json.get("Error Message").is_some() {
        return Err(FetchError::InvalidTicker(symbol.to_string()));
    }

    if let Some(note) = json.get("Note") {
        let note = note.as_str().unwrap_or_default();
        tracing::warn!(symbol, "Alpha Vantage rate limit: {}", note);
        return Err(FetchError::RateLimited(note.to_string()));
    }

    // "Information" carries both throttling and premium-only notices
    if let Some(info) = json.get("Information") {
        let info = info.as_str().unwrap_or_default();
        if is_throttle_notice(info) {
            tracing::warn!(symbol, "Alpha Vantage rate limit: {}", info);
            return Err(FetchError::RateLimited(info.to_string()));
        }
        tracing::warn!(symbol, "Alpha Vantage refused request: {}", info);
        return Err(FetchError::ProviderNotice(info.to_string()));
    }

    let series = json
        .get(TIME_SERIES_KEY)
        .and_then(|v| v.as_object())
        .ok_or_else(|| FetchError::EmptyResult(symbol.to_string()))?;

    let mut bars = Vec::with_capacity(series.len());
    for (date, values) in series {
        match parse_bar(date, values) {
            Some(bar) => bars.push(bar),
            None => tracing::warn!(symbol, date = %date, "Skipping malformed daily record"),
        }
    }

    if bars.is_empty() {
        return Err(FetchError::EmptyResult(symbol.to_string()));
    }

    bars.sort_by(|a, b| a.date.cmp(&b.date));
    bars.dedup_by(|a, b| a.date == b.date);

    Ok(bars)
}

fn is_throttle_notice(text: &str) -> bool {
    let text = text.to_lowercase();
    ["rate limit", "per second", "per minute", "per day", "sparingly"]
        .iter()
        .any(|marker| text.contains(marker))
}

fn parse_bar(date: &str, values: &Value) -> Option<DailyBar> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let field = |key: &str| values.get(key).and_then(|v| v.as_str());
    let price = |key: &str| field(key).and_then(|s| s.parse::<f64>().ok());

    Some(DailyBar {
        date,
        open: price("1. open")?,
        high: price("2. high")?,
        low: price("3. low")?,
        close: price("4. close")?,
        volume: field("5. volume").and_then(|s| s.parse::<u64>().ok())?,
    })
}
