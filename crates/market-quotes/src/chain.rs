//! Ordered provider fallback chain.
//!
//! Walks providers in order, handing each one the symbols that are still
//! unresolved. Provider errors are logged and absorbed; the chain itself
//! never fails. Symbols left over after the last provider are the caller's
//! problem (the service fills them synthetically).

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::models::Quote;
use crate::provider::QuoteProvider;

/// Retry behavior for each provider in the chain.
#[derive(Clone, Debug)]
pub struct ChainConfig {
    /// Attempts per provider before falling through to the next one.
    /// 1 means no retry.
    pub attempts_per_provider: u32,

    /// Delay between attempts to the same provider.
    pub retry_backoff: Duration,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            attempts_per_provider: 1,
            retry_backoff: Duration::from_millis(250),
        }
    }
}

/// Ordered chain of quote providers.
///
/// New providers can be appended without changing orchestration logic; each
/// one only sees the symbols its predecessors could not resolve.
pub struct ProviderChain {
    providers: Vec<Arc<dyn QuoteProvider>>,
    config: ChainConfig,
}

impl ProviderChain {
    /// Create a chain over the given providers, queried in order.
    pub fn new(providers: Vec<Arc<dyn QuoteProvider>>) -> Self {
        Self {
            providers,
            config: ChainConfig::default(),
        }
    }

    /// Create a chain with a custom retry configuration.
    pub fn with_config(providers: Vec<Arc<dyn QuoteProvider>>, config: ChainConfig) -> Self {
        Self { providers, config }
    }

    /// Append a provider as a further fallback tier.
    pub fn push(&mut self, provider: Arc<dyn QuoteProvider>) {
        self.providers.push(provider);
    }

    /// The registered providers, in query order.
    pub fn providers(&self) -> &[Arc<dyn QuoteProvider>] {
        &self.providers
    }

    /// Resolve as many of the requested symbols as the providers can.
    ///
    /// Returns a partial quote list with at most one quote per symbol.
    /// Never fails; unresolvable symbols are simply absent from the result.
    pub async fn resolve(&self, symbols: &[String]) -> Vec<Quote> {
        let mut remaining: Vec<String> = symbols.to_vec();
        let mut resolved: Vec<Quote> = Vec::with_capacity(symbols.len());

        for provider in &self.providers {
            if remaining.is_empty() {
                break;
            }

            match self.resolve_with_retry(provider.as_ref(), &remaining).await {
                Some(quotes) => {
                    // Keep one quote per still-outstanding symbol, so a
                    // provider echoing extras or duplicates cannot break
                    // result-set uniqueness.
                    let mut wanted: HashSet<String> = remaining.iter().cloned().collect();
                    for quote in quotes {
                        if wanted.remove(&quote.symbol) {
                            resolved.push(quote);
                        }
                    }
                    remaining.retain(|s| wanted.contains(s));

                    debug!(
                        "Provider '{}' left {} symbols unresolved",
                        provider.id(),
                        remaining.len()
                    );
                }
                None => {
                    // Already logged; whole remainder falls through.
                }
            }
        }

        if !remaining.is_empty() {
            info!(
                "{} symbols unresolved after all providers: {:?}",
                remaining.len(),
                remaining
            );
        }

        resolved
    }

    /// Call one provider with the configured number of attempts.
    ///
    /// Returns `None` when every attempt failed.
    async fn resolve_with_retry(
        &self,
        provider: &dyn QuoteProvider,
        symbols: &[String],
    ) -> Option<Vec<Quote>> {
        let attempts = self.config.attempts_per_provider.max(1);

        for attempt in 1..=attempts {
            match provider.resolve(symbols).await {
                Ok(quotes) => return Some(quotes),
                Err(e) => {
                    warn!(
                        "Provider '{}' failed for {} symbols (attempt {}/{}): {}",
                        provider.id(),
                        symbols.len(),
                        attempt,
                        attempts,
                        e
                    );

                    if attempt < attempts {
                        tokio::time::sleep(self.config.retry_backoff).await;
                    }
                }
            }
        }

        None
    }
}
