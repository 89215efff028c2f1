//! Financial Modeling Prep per-symbol quote provider (secondary tier).
//!
//! Resolves one symbol per HTTP GET. Per-symbol failures are independent:
//! each failed symbol is logged and dropped while its siblings still
//! resolve, so this tier always returns whatever partial set succeeded.
//!
//! # API Endpoint
//!
//! - Single quote: `https://financialmodelingprep.com/api/v3/quote/{symbol}`
//!
//! # Response Format
//!
//! A JSON array with at most one element. An empty array means the symbol
//! is unknown to the provider. All fields are optional and defaulted.

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::QuoteError;
use crate::models::{
    finite_or_zero, lenient_f64, sanitize_market_cap, sanitize_volume, Quote, QuoteSource,
};
use crate::provider::QuoteProvider;

const BASE_URL: &str = "https://financialmodelingprep.com/api/v3";
const PROVIDER_ID: &str = "FMP";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A single untrusted quote record from the per-symbol endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuote {
    symbol: Option<String>,
    name: Option<String>,
    // Numeric fields are lenient: a string or placeholder value coerces
    // per field instead of dropping the symbol.
    #[serde(default, deserialize_with = "lenient_f64")]
    price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    change: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    changes_percentage: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    volume: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    market_cap: Option<f64>,
}

impl RawQuote {
    /// Normalize into the canonical quote shape.
    ///
    /// The requested symbol is kept as the key even when the payload omits
    /// or rewrites its own `symbol` field.
    fn normalize(self, requested: &str) -> Quote {
        Quote {
            symbol: requested.to_string(),
            name: self.name.unwrap_or_else(|| requested.to_string()),
            price: finite_or_zero(self.price),
            change: finite_or_zero(self.change),
            change_percent: finite_or_zero(self.changes_percentage),
            volume: sanitize_volume(self.volume),
            market_cap: sanitize_market_cap(self.market_cap),
            timestamp: Utc::now(),
            source: QuoteSource::LiveSecondary,
        }
    }
}

/// Financial Modeling Prep provider for per-symbol quote lookups.
pub struct FmpQuoteProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl FmpQuoteProvider {
    /// Create a new provider. The API key, when present, is passed through
    /// as a query parameter on every request.
    pub fn new(api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: BASE_URL.to_string(),
            api_key,
        }
    }

    /// Override the endpoint base URL. Intended for tests and proxies.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch and normalize a single symbol.
    async fn fetch_symbol(&self, symbol: &str) -> Result<Quote, QuoteError> {
        let mut url = format!("{}/quote/{}", self.base_url, symbol);
        if let Some(key) = &self.api_key {
            url.push_str(&format!("?apikey={}", key));
        }

        let response = self.client.get(&url).send().await.map_err(|e| {
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
        })?;

        if !response.status().is_success() {
            return Err(QuoteError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP error: {}", response.status()),
            });
        }

        let records: Vec<RawQuote> =
            response
                .json()
                .await
                .map_err(|e| QuoteError::MalformedPayload {
                    provider: PROVIDER_ID.to_string(),
                    message: e.to_string(),
                })?;

        let record = records
            .into_iter()
            .next()
            .ok_or_else(|| QuoteError::SymbolNotFound(symbol.to_string()))?;

        Ok(record.normalize(symbol))
    }
}

#[async_trait]
impl QuoteProvider for FmpQuoteProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn resolve(&self, symbols: &[String]) -> Result<Vec<Quote>, QuoteError> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }

        let futures: Vec<_> = symbols
            .iter()
            .map(|symbol| async move {
                match self.fetch_symbol(symbol).await {
                    Ok(quote) => Ok(quote),
                    Err(e) => Err((symbol.clone(), e)),
                }
            })
            .collect();

        let results = join_all(futures).await;

        let mut quotes = Vec::with_capacity(symbols.len());
        for result in results {
            match result {
                Ok(quote) => quotes.push(quote),
                Err((symbol, error)) => {
                    warn!("FMP failed to resolve '{}': {}", symbol, error);
                }
            }
        }

        debug!(
            "FMP resolved {} of {} requested symbols",
            quotes.len(),
            symbols.len()
        );

        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id() {
        let provider = FmpQuoteProvider::new(None);
        assert_eq!(provider.id(), "FMP");
    }

    #[test]
    fn test_record_deserialization() {
        let json = r#"[
            {
                "symbol": "AAPL",
                "name": "Apple Inc.",
                "price": 178.5,
                "change": 1.25,
                "changesPercentage": 0.71,
                "volume": 52000000,
                "marketCap": 2800000000000
            }
        ]"#;

        let records: Vec<RawQuote> = serde_json::from_str(json).unwrap();
        let quote = records.into_iter().next().unwrap().normalize("AAPL");

        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.name, "Apple Inc.");
        assert_eq!(quote.price, 178.5);
        assert_eq!(quote.change_percent, 0.71);
        assert_eq!(quote.source, QuoteSource::LiveSecondary);
    }

    #[test]
    fn test_empty_array_deserializes() {
        let records: Vec<RawQuote> = serde_json::from_str("[]").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_missing_fields_default() {
        let json = r#"[ { "symbol": "TSLA" } ]"#;
        let records: Vec<RawQuote> = serde_json::from_str(json).unwrap();
        let quote = records.into_iter().next().unwrap().normalize("TSLA");

        assert_eq!(quote.name, "TSLA");
        assert_eq!(quote.price, 0.0);
        assert_eq!(quote.change, 0.0);
        assert_eq!(quote.volume, 0);
        assert!(quote.market_cap.is_none());
    }

    #[test]
    fn test_non_numeric_price_coerces_to_zero() {
        // A present-but-wrong-typed numeric field must coerce per field,
        // not drop the symbol.
        let json = r#"[
            {
                "symbol": "TSLA",
                "price": "N/A",
                "change": -2.1,
                "volume": "31000000"
            }
        ]"#;

        let records: Vec<RawQuote> = serde_json::from_str(json).unwrap();
        let quote = records.into_iter().next().unwrap().normalize("TSLA");

        assert_eq!(quote.price, 0.0);
        assert_eq!(quote.change, -2.1);
        // Numeric strings still parse.
        assert_eq!(quote.volume, 31_000_000);
    }

    #[test]
    fn test_requested_symbol_wins_over_payload_symbol() {
        // Some endpoints echo a canonicalized symbol; the requested one is
        // the cache and result-set key.
        let json = r#"[ { "symbol": "BTCUSD", "price": 65000.0 } ]"#;
        let records: Vec<RawQuote> = serde_json::from_str(json).unwrap();
        let quote = records.into_iter().next().unwrap().normalize("BTC-USD");

        assert_eq!(quote.symbol, "BTC-USD");
    }

    #[tokio::test]
    async fn test_empty_symbol_list_short_circuits() {
        let provider = FmpQuoteProvider::new(None);
        let quotes = provider.resolve(&[]).await.unwrap();
        assert!(quotes.is_empty());
    }

    #[tokio::test]
    async fn test_failed_symbols_are_dropped_not_raised() {
        // Grab a free local port, then drop the listener so each connect
        // is refused immediately. Every symbol fails independently and
        // the partial result is simply empty.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let provider =
            FmpQuoteProvider::new(None).with_base_url(format!("http://127.0.0.1:{}/api/v3", port));
        let quotes = provider
            .resolve(&["AAPL".to_string(), "MSFT".to_string()])
            .await
            .unwrap();

        assert!(quotes.is_empty());
    }
}
