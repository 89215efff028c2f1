//! Time-bounded in-memory quote cache.
//!
//! Maps symbol to the last accepted quote plus its fetch time. Entries are
//! never purged on a timer; an entry older than the freshness window simply
//! behaves as absent on read until it is overwritten or the cache is
//! cleared. Memory is bounded by the number of distinct symbols requested
//! over the process lifetime, which is small.
//!
//! The cache is in-memory only and does not survive a restart.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::warn;

use crate::models::Quote;

/// Default freshness window for cached quotes.
pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(30);

/// A cached quote and the time it was accepted.
///
/// Entries are immutable once written; a new fetch for the same symbol
/// creates a replacement entry.
#[derive(Debug)]
struct CacheEntry {
    quote: Quote,
    fetched_at: Instant,
}

/// Freshness-windowed quote cache.
///
/// Thread-safe via a single mutex over the map, so a half-written entry is
/// never observable. Construct one instance at application wiring time and
/// hand it to the quote service; tests can instantiate isolated caches with
/// short windows.
pub struct QuoteCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    freshness_window: Duration,
}

impl QuoteCache {
    /// Create a cache with the default 30-second freshness window.
    pub fn new() -> Self {
        Self::with_freshness_window(DEFAULT_FRESHNESS_WINDOW)
    }

    /// Create a cache with a custom freshness window.
    pub fn with_freshness_window(freshness_window: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            freshness_window,
        }
    }

    /// Lock the entries mutex, recovering from poison if necessary.
    ///
    /// The worst case after recovery is serving or overwriting a quote that
    /// a panicking thread was about to replace, which the last-writer-wins
    /// model already permits.
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Quote cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Get the cached quote for a symbol if it is still fresh.
    ///
    /// Returns `None` for unknown symbols and for entries older than the
    /// freshness window, even though stale entries stay resident.
    pub fn get(&self, symbol: &str) -> Option<Quote> {
        let entries = self.lock_entries();

        entries
            .get(symbol)
            .filter(|entry| entry.fetched_at.elapsed() < self.freshness_window)
            .map(|entry| entry.quote.clone())
    }

    /// Store a quote, unconditionally replacing any existing entry for its
    /// symbol and stamping the entry at the current time.
    pub fn put(&self, quote: Quote) {
        let mut entries = self.lock_entries();

        entries.insert(
            quote.symbol.clone(),
            CacheEntry {
                quote,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Remove all entries. Used for explicit invalidation by the caller.
    pub fn clear(&self) {
        let mut entries = self.lock_entries();
        entries.clear();
    }

    /// Number of resident entries, fresh or stale.
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    /// Whether the cache holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new()
    }
}
