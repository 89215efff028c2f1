//! Quote service orchestration.
//!
//! Coordinates the cache, the provider chain and the synthetic generator so
//! that a symbol list always comes back as a complete, sorted quote set.

use std::collections::HashSet;

use log::{debug, info};

use crate::cache::QuoteCache;
use crate::chain::ProviderChain;
use crate::errors::QuoteError;
use crate::models::Quote;
use crate::synthetic::SyntheticQuoteGenerator;

/// Orchestrator for quote retrieval.
///
/// Owns its cache explicitly; construct one service (and one cache) at
/// application wiring time rather than sharing global state, so tests get
/// isolated instances.
pub struct QuoteService {
    cache: QuoteCache,
    chain: ProviderChain,
    synthetic: SyntheticQuoteGenerator,
}

impl QuoteService {
    /// Create a service over the given cache and provider chain.
    pub fn new(cache: QuoteCache, chain: ProviderChain) -> Self {
        Self {
            cache,
            chain,
            synthetic: SyntheticQuoteGenerator::new(),
        }
    }

    /// Fetch quotes for a list of symbols.
    ///
    /// Cache hits within the freshness window are served directly unless
    /// `force_refresh` is set, in which case every symbol is re-resolved
    /// (results are still written back to the cache). Symbols no live
    /// provider can answer are filled synthetically, so the result covers
    /// every distinct requested symbol. The output is sorted ascending by
    /// symbol regardless of input or provider order.
    ///
    /// # Errors
    ///
    /// Only `QuoteError::InvalidSymbols` when the input contains a blank
    /// symbol. Provider failures never surface here.
    pub async fn fetch_quotes(
        &self,
        symbols: &[String],
        force_refresh: bool,
    ) -> Result<Vec<Quote>, QuoteError> {
        let requested = normalize_symbols(symbols)?;
        if requested.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<Quote> = Vec::new();
        let mut misses: Vec<String> = Vec::new();

        for symbol in &requested {
            if !force_refresh {
                if let Some(quote) = self.cache.get(symbol) {
                    hits.push(quote);
                    continue;
                }
            }
            misses.push(symbol.clone());
        }

        debug!(
            "fetch_quotes: {} hits, {} misses (force_refresh={})",
            hits.len(),
            misses.len(),
            force_refresh
        );

        let mut fetched = if misses.is_empty() {
            Vec::new()
        } else {
            self.chain.resolve(&misses).await
        };

        // Fill anything the chain could not answer, per symbol.
        let live: HashSet<String> = fetched.iter().map(|q| q.symbol.clone()).collect();
        for symbol in &misses {
            if !live.contains(symbol) {
                info!("Generating synthetic quote for '{}'", symbol);
                fetched.push(self.synthetic.generate(symbol));
            }
        }

        for quote in &fetched {
            self.cache.put(quote.clone());
        }

        let mut result = hits;
        result.extend(fetched);
        result.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        Ok(result)
    }

    /// Drop every cached quote. Subsequent fetches go back to the providers.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

/// Normalize and de-duplicate a symbol list.
///
/// Symbols are trimmed and uppercased. A symbol that is blank after
/// trimming means the caller built the list wrong, which is fatal.
fn normalize_symbols(symbols: &[String]) -> Result<Vec<String>, QuoteError> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(symbols.len());

    for symbol in symbols {
        let upper = symbol.trim().to_uppercase();
        if upper.is_empty() {
            return Err(QuoteError::InvalidSymbols(
                "symbol list contains a blank entry".to_string(),
            ));
        }
        if seen.insert(upper.clone()) {
            normalized.push(upper);
        }
    }

    Ok(normalized)
}
