//! Error types for quote retrieval.
//!
//! Provider-level failures are absorbed by the fallback chain and never
//! cross the service boundary; only caller-programming errors are fatal.

use thiserror::Error;

/// Errors that can occur while resolving quotes.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// The provider had no data for the symbol.
    /// The symbol is deferred to the next tier (ultimately synthetic).
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The request to the provider timed out.
    /// Treated like any other provider failure by the chain.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A transport-level or provider-reported error.
    /// Network unreachable, non-success HTTP status, or an error payload.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider returned a payload that did not match the expected shape.
    #[error("Malformed payload from {provider}: {message}")]
    MalformedPayload {
        /// The provider that produced the payload
        provider: String,
        /// Description of the parse failure
        message: String,
    },

    /// The symbol list itself was invalid (e.g. a blank symbol).
    /// This is a caller-programming error and is surfaced immediately.
    #[error("Invalid symbols: {0}")]
    InvalidSymbols(String),
}

impl QuoteError {
    /// Whether this error must be surfaced to the caller.
    ///
    /// Everything except `InvalidSymbols` is a runtime provider condition
    /// that the fallback chain handles.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidSymbols(_))
    }
}
