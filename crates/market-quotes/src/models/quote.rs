use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provenance of a quote.
///
/// Live quotes come from one of the provider tiers; synthetic quotes are
/// generated locally when every live provider failed for a symbol. Consumers
/// can use this tag to render trust indicators.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuoteSource {
    /// Resolved by the primary (batch) provider.
    LivePrimary,
    /// Resolved by the secondary (per-symbol) provider.
    LiveSecondary,
    /// Generated locally after all live providers failed.
    Synthetic,
}

impl std::fmt::Display for QuoteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LivePrimary => write!(f, "live-primary"),
            Self::LiveSecondary => write!(f, "live-secondary"),
            Self::Synthetic => write!(f, "synthetic"),
        }
    }
}

/// A price/volume quote for a single symbol.
///
/// This is the canonical unit of output for the subsystem. All numeric
/// fields are sanitized at construction: `price`, `change` and
/// `change_percent` are always finite, and `volume` is non-negative.
/// `change_percent` is reported independently by providers and is not
/// required to be arithmetically derived from `change`/`price`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Ticker symbol, normalized uppercase (e.g. "AAPL", "BTC-USD").
    pub symbol: String,

    /// Display name; falls back to the symbol when the provider has none.
    pub name: String,

    /// Last traded price.
    pub price: f64,

    /// Absolute change since previous close.
    pub change: f64,

    /// Percent change since previous close.
    pub change_percent: f64,

    /// Traded units.
    pub volume: u64,

    /// Market capitalization, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,

    /// When this subsystem accepted the value, not the upstream quote time.
    pub timestamp: DateTime<Utc>,

    /// Where the quote came from.
    pub source: QuoteSource,
}

/// Deserialize an untrusted numeric field leniently.
///
/// Providers sometimes report numbers as strings or placeholders like
/// "N/A". Accept a JSON number, a parsable numeric string, or null;
/// anything else becomes `None` so a single bad field cannot fail the
/// whole payload. Pair with `#[serde(default)]` for missing fields.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Coerce an optional, untrusted numeric field to a finite value.
///
/// Missing, NaN and infinite values all become `0.0` so they never surface
/// to callers.
pub fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Coerce an optional, untrusted volume field to a non-negative integer.
pub fn sanitize_volume(value: Option<f64>) -> u64 {
    value
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v as u64)
        .unwrap_or(0)
}

/// Keep a market cap only when it is a finite, non-negative number.
pub fn sanitize_market_cap(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Lenient {
        #[serde(default, deserialize_with = "lenient_f64")]
        value: Option<f64>,
    }

    fn lenient(json: &str) -> Option<f64> {
        serde_json::from_str::<Lenient>(json).unwrap().value
    }

    #[test]
    fn test_lenient_f64_accepts_numbers() {
        assert_eq!(lenient(r#"{ "value": 178.5 }"#), Some(178.5));
        assert_eq!(lenient(r#"{ "value": 52000000 }"#), Some(52_000_000.0));
    }

    #[test]
    fn test_lenient_f64_parses_numeric_strings() {
        assert_eq!(lenient(r#"{ "value": "178.5" }"#), Some(178.5));
        assert_eq!(lenient(r#"{ "value": " 1.08 " }"#), Some(1.08));
    }

    #[test]
    fn test_lenient_f64_coerces_junk_to_none() {
        assert_eq!(lenient(r#"{ "value": "N/A" }"#), None);
        assert_eq!(lenient(r#"{ "value": null }"#), None);
        assert_eq!(lenient(r#"{ "value": true }"#), None);
        assert_eq!(lenient(r#"{ "value": {} }"#), None);
        assert_eq!(lenient(r#"{}"#), None);
    }

    #[test]
    fn test_finite_or_zero_passes_finite_values() {
        assert_eq!(finite_or_zero(Some(150.25)), 150.25);
        assert_eq!(finite_or_zero(Some(-3.2)), -3.2);
    }

    #[test]
    fn test_finite_or_zero_coerces_missing_and_non_finite() {
        assert_eq!(finite_or_zero(None), 0.0);
        assert_eq!(finite_or_zero(Some(f64::NAN)), 0.0);
        assert_eq!(finite_or_zero(Some(f64::INFINITY)), 0.0);
        assert_eq!(finite_or_zero(Some(f64::NEG_INFINITY)), 0.0);
    }

    #[test]
    fn test_sanitize_volume() {
        assert_eq!(sanitize_volume(Some(1_234_567.0)), 1_234_567);
        assert_eq!(sanitize_volume(Some(-5.0)), 0);
        assert_eq!(sanitize_volume(Some(f64::NAN)), 0);
        assert_eq!(sanitize_volume(None), 0);
    }

    #[test]
    fn test_sanitize_market_cap() {
        assert_eq!(sanitize_market_cap(Some(2.5e12)), Some(2.5e12));
        assert_eq!(sanitize_market_cap(Some(-1.0)), None);
        assert_eq!(sanitize_market_cap(Some(f64::NAN)), None);
        assert_eq!(sanitize_market_cap(None), None);
    }

    #[test]
    fn test_quote_serializes_camel_case() {
        let quote = Quote {
            symbol: "AAPL".to_string(),
            name: "Apple Inc.".to_string(),
            price: 178.5,
            change: 1.25,
            change_percent: 0.71,
            volume: 52_000_000,
            market_cap: Some(2.8e12),
            timestamp: Utc::now(),
            source: QuoteSource::LivePrimary,
        };

        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["changePercent"], 0.71);
        assert_eq!(json["marketCap"], 2.8e12);
        assert_eq!(json["source"], "live-primary");
    }

    #[test]
    fn test_quote_source_display() {
        assert_eq!(QuoteSource::LivePrimary.to_string(), "live-primary");
        assert_eq!(QuoteSource::LiveSecondary.to_string(), "live-secondary");
        assert_eq!(QuoteSource::Synthetic.to_string(), "synthetic");
    }
}
