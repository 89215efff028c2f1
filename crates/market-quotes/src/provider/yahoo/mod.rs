//! Yahoo Finance batch quote provider (primary tier).
//!
//! Resolves a whole symbol batch in one HTTP GET against the v7 quote
//! endpoint with a comma-joined symbol list.
//!
//! # API Endpoint
//!
//! - Batch quotes: `https://query1.finance.yahoo.com/v7/finance/quote?symbols={s1,s2,...}`
//!
//! # Response Format
//!
//! A `quoteResponse` envelope holding a `result` array and an `error` field.
//! The payload is untrusted: every field is optional and defaulted, never
//! assumed present.
//!
//! # Failure Granularity
//!
//! The batch is all-or-nothing on failure: a transport error, non-success
//! status, parse failure, or provider-reported error payload discards the
//! whole batch, because partial failure cannot be attributed to individual
//! symbols in the aggregate response. A successful response that covers only
//! some symbols is a partial result; the rest fall through the chain.

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::QuoteError;
use crate::models::{
    finite_or_zero, lenient_f64, sanitize_market_cap, sanitize_volume, Quote, QuoteSource,
};
use crate::provider::QuoteProvider;

const BASE_URL: &str = "https://query1.finance.yahoo.com/v7/finance";
const PROVIDER_ID: &str = "YAHOO";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Top-level envelope of the batch quote endpoint.
#[derive(Debug, Deserialize)]
struct QuoteEnvelope {
    #[serde(rename = "quoteResponse")]
    quote_response: Option<QuoteResponse>,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    result: Vec<RawQuote>,
    /// Provider-reported error payload; presence fails the whole batch.
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// A single untrusted quote record from the batch response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuote {
    symbol: Option<String>,
    short_name: Option<String>,
    long_name: Option<String>,
    // Numeric fields are lenient: a string or placeholder value coerces
    // per field instead of failing the whole batch.
    #[serde(default, deserialize_with = "lenient_f64")]
    regular_market_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    regular_market_change: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    regular_market_change_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    regular_market_volume: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    market_cap: Option<f64>,
}

impl RawQuote {
    /// Normalize into the canonical quote shape, coercing missing numerics
    /// to zero and a missing name to the raw symbol.
    fn normalize(self) -> Option<Quote> {
        let symbol = self.symbol?;
        let name = self
            .short_name
            .or(self.long_name)
            .unwrap_or_else(|| symbol.clone());

        Some(Quote {
            name,
            price: finite_or_zero(self.regular_market_price),
            change: finite_or_zero(self.regular_market_change),
            change_percent: finite_or_zero(self.regular_market_change_percent),
            volume: sanitize_volume(self.regular_market_volume),
            market_cap: sanitize_market_cap(self.market_cap),
            timestamp: Utc::now(),
            source: QuoteSource::LivePrimary,
            symbol,
        })
    }
}

/// Yahoo Finance provider for batch quote lookups.
pub struct YahooQuoteProvider {
    client: Client,
    base_url: String,
}

impl YahooQuoteProvider {
    /// Create a new provider against the public Yahoo endpoint.
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Override the endpoint base URL. Intended for tests and proxies.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn transport_error(e: reqwest::Error) -> QuoteError {
        if e.is_timeout() {
            QuoteError::Timeout {
                provider: PROVIDER_ID.to_string(),
            }
        } else {
            QuoteError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            }
        }
    }
}

impl Default for YahooQuoteProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteProvider for YahooQuoteProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn resolve(&self, symbols: &[String]) -> Result<Vec<Quote>, QuoteError> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/quote?symbols={}", self.base_url, symbols.join(","));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status().is_success() {
            return Err(QuoteError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP error: {}", response.status()),
            });
        }

        let envelope: QuoteEnvelope =
            response
                .json()
                .await
                .map_err(|e| QuoteError::MalformedPayload {
                    provider: PROVIDER_ID.to_string(),
                    message: e.to_string(),
                })?;

        let body = envelope
            .quote_response
            .ok_or_else(|| QuoteError::MalformedPayload {
                provider: PROVIDER_ID.to_string(),
                message: "missing quoteResponse".to_string(),
            })?;

        if let Some(error) = body.error {
            return Err(QuoteError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("API returned error: {}", error),
            });
        }

        let quotes: Vec<Quote> = body
            .result
            .into_iter()
            .filter_map(RawQuote::normalize)
            .collect();

        debug!(
            "Yahoo resolved {} of {} requested symbols",
            quotes.len(),
            symbols.len()
        );

        Ok(quotes)
    }
}
