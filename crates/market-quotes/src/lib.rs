//! Stockdeck Market Quotes Crate
//!
//! Turns a list of ticker symbols into fresh price/volume quotes using a
//! short-lived cache, a chain of fallback providers, and synthetic data
//! generation when every live provider fails. Screener, portfolio and chart
//! collaborators consume [`QuoteService::fetch_quotes`] and render its
//! output; nothing in this crate renders or persists anything.
//!
//! # Architecture
//!
//! ```text
//! caller
//!   |
//!   v
//! +-----------------+     read      +----------------+
//! |  QuoteService   | ------------> |   QuoteCache   |  (30s freshness)
//! +-----------------+               +----------------+
//!   | misses                               ^ write
//!   v                                      |
//! +-----------------+                      |
//! |  ProviderChain  | ---------------------+
//! +-----------------+
//!   |  YAHOO (batch, all-or-nothing)
//!   |  FMP   (per-symbol, partial)
//!   v
//! +-----------------------+
//! | SyntheticGenerator    |  (last resort, per symbol)
//! +-----------------------+
//! ```
//!
//! The result set is always total over the requested symbols and sorted
//! ascending by symbol. Provider failures are logged and absorbed; the only
//! fatal error is a structurally invalid symbol list.
//!
//! # Core Types
//!
//! - [`Quote`] - Canonical quote with provenance tag
//! - [`QuoteSource`] - `live-primary` / `live-secondary` / `synthetic`
//! - [`QuoteCache`] - Freshness-windowed in-memory cache
//! - [`QuoteProvider`] - Pluggable live-source trait
//! - [`ProviderChain`] - Ordered fallback over providers
//! - [`QuoteService`] - Orchestrator and sole contract surface

pub mod cache;
pub mod chain;
pub mod errors;
pub mod models;
pub mod provider;
pub mod service;
pub mod synthetic;

// Re-export the public surface
pub use cache::{QuoteCache, DEFAULT_FRESHNESS_WINDOW};
pub use chain::{ChainConfig, ProviderChain};
pub use errors::QuoteError;
pub use models::{Quote, QuoteSource};
pub use provider::{FmpQuoteProvider, QuoteProvider, YahooQuoteProvider};
pub use service::QuoteService;
pub use synthetic::SyntheticQuoteGenerator;
