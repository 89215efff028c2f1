//! Quote provider trait and implementations.
//!
//! A provider turns a batch of symbols into a partial quote list. Providers
//! are queried in order by the [`ProviderChain`](crate::chain::ProviderChain)
//! until every symbol is resolved or the chain runs out of providers.

pub mod fmp;
pub mod yahoo;

use async_trait::async_trait;

use crate::errors::QuoteError;
use crate::models::Quote;

pub use fmp::FmpQuoteProvider;
pub use yahoo::YahooQuoteProvider;

/// Trait for live quote sources.
///
/// Implement this trait to add a new provider to the chain. `resolve`
/// returns whatever subset of the requested symbols the provider could
/// answer; the chain hands the remainder to the next provider.
///
/// A provider that treats its upstream call as all-or-nothing (such as a
/// batch endpoint whose error payload cannot be attributed to individual
/// symbols) should return `Err` on any failure, which defers the entire
/// batch to the next provider.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "YAHOO" or "FMP". Used for logging
    /// and error attribution.
    fn id(&self) -> &'static str;

    /// Resolve quotes for a batch of symbols.
    ///
    /// # Returns
    ///
    /// A possibly partial list of quotes, at most one per requested symbol.
    /// Symbols absent from the result are unresolved, not errors.
    async fn resolve(&self, symbols: &[String]) -> Result<Vec<Quote>, QuoteError>;
}
