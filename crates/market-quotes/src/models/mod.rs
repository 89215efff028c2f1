//! Data models for market quotes.

mod quote;

pub use quote::{
    finite_or_zero, lenient_f64, sanitize_market_cap, sanitize_volume, Quote, QuoteSource,
};
