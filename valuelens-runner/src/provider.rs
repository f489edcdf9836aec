//! Quote provider trait and structured error types.
//!
//! The QuoteProvider trait abstracts over live quote sources so the feed can
//! swap implementations and tests can script failures. Providers return
//! prices only; fundamentals come from the watchlist or from synthesis.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Live price snapshot for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveQuote {
    pub symbol: String,
    pub current_price: f64,
    pub previous_close: Option<f64>,
}

/// Structured error types for quote fetching.
///
/// None of these ever reach the engine: the feed drops the symbol or falls
/// back to synthetic data instead.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("no usable price for symbol: {symbol}")]
    NoPrice { symbol: String },

    #[error("hard stop: quote provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("feed error: {0}")]
    Other(String),
}

/// Where a record's price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    Live,
    Synthetic,
}

/// Trait for live quote providers.
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the latest price for a symbol.
    fn fetch(&self, symbol: &str) -> Result<LiveQuote, FeedError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool;
}
