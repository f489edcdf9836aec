//! Finnhub quote provider.
//!
//! Fetches the latest price from Finnhub's `/quote` endpoint. Handles rate
//! limiting, retries with exponential backoff, response parsing, and the
//! circuit breaker. Finnhub answers unknown symbols with an all-zero quote
//! rather than an error status, so a zero price counts as a failed fetch.
//!
//! The token travels in the `X-Finnhub-Token` header, never in the URL, so
//! request errors can be logged and reported as-is.

use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::circuit_breaker::CircuitBreaker;
use crate::provider::{FeedError, LiveQuote, QuoteProvider};

pub const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";
const TOKEN_HEADER: &str = "X-Finnhub-Token";

/// Finnhub `/quote` response. Only the fields we use.
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    /// Current price.
    c: Option<f64>,
    /// Previous close.
    pc: Option<f64>,
}

pub struct FinnhubProvider {
    client: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl FinnhubProvider {
    pub fn new(api_key: String, circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, FeedError> {
        if api_key.trim().is_empty() {
            return Err(FeedError::AuthenticationRequired("empty Finnhub API key".into()));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| FeedError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            circuit_breaker,
            max_retries: 2,
            base_delay: Duration::from_millis(250),
        })
    }

    /// Build a provider from the token stored in `var`.
    pub fn from_env(var: &str, circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, FeedError> {
        let key = std::env::var(var)
            .map_err(|_| FeedError::AuthenticationRequired(format!("{var} is not set")))?;
        Self::new(key, circuit_breaker)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn quote_url(&self) -> String {
        format!("{}/quote", self.base_url.trim_end_matches('/'))
    }

    fn parse_response(symbol: &str, resp: QuoteResponse) -> Result<LiveQuote, FeedError> {
        let current_price = match resp.c {
            Some(c) if c.is_finite() && c > 0.0 => c,
            _ => {
                return Err(FeedError::NoPrice {
                    symbol: symbol.to_string(),
                })
            }
        };
        let previous_close = resp.pc.filter(|pc| pc.is_finite() && *pc > 0.0);

        Ok(LiveQuote {
            symbol: symbol.to_string(),
            current_price,
            previous_close,
        })
    }

    fn fetch_with_retry(&self, symbol: &str) -> Result<LiveQuote, FeedError> {
        let url = self.quote_url();
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                std::thread::sleep(self.base_delay * 2u32.pow(attempt - 1));
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(FeedError::CircuitBreakerTripped);
            }

            let request = self
                .client
                .get(&url)
                .query(&[("symbol", symbol)])
                .header(TOKEN_HEADER, &self.api_key);

            let resp = match request.send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    self.circuit_breaker.record_failure();
                    last_error = Some(FeedError::NetworkUnreachable(
                        e.without_url().to_string(),
                    ));
                    continue;
                }
                Err(e) => {
                    return Err(FeedError::NetworkUnreachable(
                        e.without_url().to_string(),
                    ))
                }
            };

            let status = resp.status();

            if status == reqwest::StatusCode::FORBIDDEN {
                self.circuit_breaker.trip();
                return Err(FeedError::CircuitBreakerTripped);
            }

            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(FeedError::AuthenticationRequired(
                    "Finnhub rejected the API key".into(),
                ));
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                last_error = Some(FeedError::RateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }

            if !status.is_success() {
                self.circuit_breaker.record_failure();
                last_error = Some(FeedError::Other(format!("HTTP {status} for {symbol}")));
                continue;
            }

            let body: QuoteResponse = resp.json().map_err(|e| {
                FeedError::ResponseFormatChanged(format!(
                    "failed to parse quote for {symbol}: {}",
                    e.without_url()
                ))
            })?;

            let quote = Self::parse_response(symbol, body)?;
            self.circuit_breaker.record_success();
            return Ok(quote);
        }

        Err(last_error.unwrap_or_else(|| FeedError::Other("max retries exceeded".into())))
    }
}

impl QuoteProvider for FinnhubProvider {
    fn name(&self) -> &str {
        "finnhub"
    }

    fn fetch(&self, symbol: &str) -> Result<LiveQuote, FeedError> {
        self.fetch_with_retry(symbol)
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}
