//! Last-resort synthetic quote generation.
//!
//! When no live provider can resolve a symbol, a plausible quote is
//! generated locally so the result set stays total over the requested
//! symbols. Known symbols draw from a static base-price table; unknown ones
//! get a pseudo-random base in [100, 300).
//!
//! This is the only place where `price`, `change` and `change_percent` are
//! guaranteed arithmetically consistent; live providers carry no such
//! guarantee.

use std::collections::HashMap;

use chrono::Utc;
use lazy_static::lazy_static;
use rand::Rng;

use crate::models::{Quote, QuoteSource};

/// Percent-change bounds, inclusive low, exclusive high.
const CHANGE_PERCENT_RANGE: (f64, f64) = (-4.0, 4.0);

/// Base-price bounds for unknown symbols, inclusive low, exclusive high.
const UNKNOWN_BASE_PRICE_RANGE: (f64, f64) = (100.0, 300.0);

/// Volume bounds, inclusive low, exclusive high.
const VOLUME_RANGE: (u64, u64) = (1_000_000, 11_000_000);

lazy_static! {
    /// Base prices and display names for common symbols.
    static ref BASE_PRICES: HashMap<&'static str, (&'static str, f64)> = {
        let mut m = HashMap::new();
        m.insert("AAPL", ("Apple Inc.", 178.50));
        m.insert("MSFT", ("Microsoft Corporation", 420.10));
        m.insert("GOOGL", ("Alphabet Inc.", 165.30));
        m.insert("AMZN", ("Amazon.com, Inc.", 185.75));
        m.insert("NVDA", ("NVIDIA Corporation", 875.25));
        m.insert("META", ("Meta Platforms, Inc.", 495.60));
        m.insert("TSLA", ("Tesla, Inc.", 248.40));
        m.insert("JPM", ("JPMorgan Chase & Co.", 198.85));
        m.insert("V", ("Visa Inc.", 275.90));
        m.insert("^GSPC", ("S&P 500", 5230.00));
        m.insert("^IXIC", ("NASDAQ Composite", 16400.00));
        m.insert("^DJI", ("Dow Jones Industrial Average", 39100.00));
        m.insert("BTC-USD", ("Bitcoin USD", 65000.00));
        m.insert("ETH-USD", ("Ethereum USD", 3500.00));
        m.insert("EURUSD=X", ("EUR/USD", 1.08));
        m
    };
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Generator for plausible fallback quotes.
///
/// Strictly last-resort, per symbol: the service only invokes it for
/// symbols no live provider could resolve in the current call.
#[derive(Clone, Copy, Debug, Default)]
pub struct SyntheticQuoteGenerator;

impl SyntheticQuoteGenerator {
    /// Create a generator. Stateless; every call draws fresh randomness.
    pub fn new() -> Self {
        Self
    }

    /// Generate a synthetic quote for a symbol with no live data.
    ///
    /// The values satisfy `change = base * change_percent / 100` and
    /// `price = base + change` (before two-decimal rounding), with the
    /// percent drawn uniformly from [-4, +4).
    pub fn generate(&self, symbol: &str) -> Quote {
        let mut rng = rand::thread_rng();

        let (name, base) = match BASE_PRICES.get(symbol) {
            Some((name, base)) => (name.to_string(), *base),
            None => (
                symbol.to_string(),
                rng.gen_range(UNKNOWN_BASE_PRICE_RANGE.0..UNKNOWN_BASE_PRICE_RANGE.1),
            ),
        };

        let change_percent = rng.gen_range(CHANGE_PERCENT_RANGE.0..CHANGE_PERCENT_RANGE.1);
        let change = base * change_percent / 100.0;
        let price = base + change;

        Quote {
            symbol: symbol.to_string(),
            name,
            price: round2(price),
            change: round2(change),
            change_percent: round2(change_percent),
            volume: rng.gen_range(VOLUME_RANGE.0..VOLUME_RANGE.1),
            market_cap: None,
            timestamp: Utc::now(),
            source: QuoteSource::Synthetic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_symbol_price_in_range() {
        let generator = SyntheticQuoteGenerator::new();

        for _ in 0..100 {
            let quote = generator.generate("ZZZZ");
            // Base in [100, 300), change within ±4% of base.
            assert!(quote.price >= 100.0 * 0.96, "price {}", quote.price);
            assert!(quote.price < 300.0 * 1.04, "price {}", quote.price);
        }
    }

    #[test]
    fn test_change_percent_in_range() {
        let generator = SyntheticQuoteGenerator::new();

        for _ in 0..100 {
            let quote = generator.generate("ZZZZ");
            assert!(quote.change_percent >= -4.0);
            assert!(quote.change_percent < 4.0);
        }
    }

    #[test]
    fn test_volume_in_range() {
        let generator = SyntheticQuoteGenerator::new();

        for _ in 0..100 {
            let quote = generator.generate("ZZZZ");
            assert!(quote.volume >= 1_000_000);
            assert!(quote.volume < 11_000_000);
        }
    }

    #[test]
    fn test_arithmetic_consistency() {
        let generator = SyntheticQuoteGenerator::new();

        for _ in 0..100 {
            let quote = generator.generate("ZZZZ");
            let base = quote.price - quote.change;
            // Rounding to two decimals leaves at most a cent of drift on
            // each of the three fields.
            let expected_change = base * quote.change_percent / 100.0;
            assert!(
                (quote.change - expected_change).abs() < 0.05,
                "change {} vs expected {}",
                quote.change,
                expected_change
            );
        }
    }

    #[test]
    fn test_known_symbol_uses_table() {
        let generator = SyntheticQuoteGenerator::new();
        let quote = generator.generate("AAPL");

        assert_eq!(quote.name, "Apple Inc.");
        // Price stays within ±4% of the tabled base.
        assert!(quote.price >= 178.50 * 0.96);
        assert!(quote.price < 178.50 * 1.04);
    }

    #[test]
    fn test_values_are_rounded_to_cents() {
        let generator = SyntheticQuoteGenerator::new();
        let quote = generator.generate("AAPL");

        for value in [quote.price, quote.change, quote.change_percent] {
            assert!(((value * 100.0).round() - value * 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_source_is_synthetic_and_no_market_cap() {
        let generator = SyntheticQuoteGenerator::new();
        let quote = generator.generate("ZZZZ");

        assert_eq!(quote.source, QuoteSource::Synthetic);
        assert!(quote.market_cap.is_none());
    }
}
