use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

#[derive(Clone)]
pub struct ServerConfig {
    // Market data provider
    pub alpha_vantage_api_key: String,
    pub alpha_vantage_base_url: String,
    pub http_timeout_seconds: u64,

    // Listener
    pub bind_addr: String,
    pub port: u16,

    // Frontend result banner duration
    pub result_message_ms: u64,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            alpha_vantage_api_key: lookup("ALPHA_VANTAGE_API_KEY")
                .filter(|v| !v.trim().is_empty())
                .context("ALPHA_VANTAGE_API_KEY not set")?,
            alpha_vantage_base_url: lookup("ALPHA_VANTAGE_BASE_URL")
                .unwrap_or_else(|| market_data::alpha_vantage::DEFAULT_BASE_URL.to_string()),
            http_timeout_seconds: parse_or(&lookup, "HTTP_TIMEOUT_SECONDS", 30)?,

            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 3000)?,

            result_message_ms: parse_or(&lookup, "RESULT_MESSAGE_MS", 3000)?,
        };

        Ok(config)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// API key safe for logs: first and last four characters only
    pub fn masked_api_key(&self) -> String {
        mask_api_key(&self.alpha_vantage_api_key)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has invalid value {:?}", key, raw)),
        None => Ok(default),
    }
}

fn mask_api_key(key: &str) -> String {
    if key.chars().count() <= 8 {
        return "****".to_string();
    }
    let head: String = key.chars().take(4).collect();
    let mut tail: Vec<char> = key.chars().rev().take(4).collect();
    tail.reverse();
    format!("{}...{}", head, tail.into_iter().collect::<String>())
}
