//! ValueLens Runner: market feed, evaluation cycles, polling, report export.
//!
//! This crate builds on `valuelens-core` to provide:
//! - TOML watch configuration with built-in US and CN watchlists
//! - Live quotes from Finnhub behind a circuit breaker
//! - Synthetic fallback data drawn from the seeded RNG hierarchy
//! - Parallel evaluation cycles with a market thermometer and board
//! - Fixed-cadence polling
//! - JSON, CSV, and Markdown report artifacts

pub mod board;
pub mod circuit_breaker;
pub mod config;
pub mod cycle;
pub mod export;
pub mod feed;
pub mod finnhub;
pub mod poller;
pub mod provider;
pub mod synthetic;
pub mod thermometer;

pub use board::{Board, BoardEntry};
pub use circuit_breaker::CircuitBreaker;
pub use config::{ConfigError, WatchConfig, WatchEntry, Watchlists};
pub use cycle::{evaluate_records, run_cycle, CycleError, CycleReport, Skipped};
pub use export::{load_report, save_report};
pub use feed::{FeedSnapshot, MarketFeed};
pub use finnhub::FinnhubProvider;
pub use poller::Poller;
pub use provider::{DataSource, FeedError, LiveQuote, QuoteProvider};
pub use thermometer::{MarketThermometer, Mood};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn cycle_report_is_send_sync() {
        assert_send::<CycleReport>();
        assert_sync::<CycleReport>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<WatchConfig>();
        assert_sync::<WatchConfig>();
    }

    #[test]
    fn feed_is_send_sync() {
        assert_send::<MarketFeed>();
        assert_sync::<MarketFeed>();
        assert_send::<FeedSnapshot>();
        assert_sync::<FeedSnapshot>();
    }

    #[test]
    fn providers_are_send_sync() {
        assert_send::<FinnhubProvider>();
        assert_sync::<FinnhubProvider>();
        assert_send::<CircuitBreaker>();
        assert_sync::<CircuitBreaker>();
    }

    #[test]
    fn feed_error_is_send_sync() {
        assert_send::<FeedError>();
        assert_sync::<FeedError>();
    }
}
