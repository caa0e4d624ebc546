//! Provider contracts and request/response types.
//!
//! Three collaborators feed the pipeline, each behind its own trait:
//!
//! | Trait | Request | Response | Description |
//! |-------|---------|----------|-------------|
//! | [`UniverseSource`] | [`ListingFeed`] | `Vec<Security>` | Exchange listing files |
//! | [`MarketDataSource`] | [`BarsRequest`] / [`BarsBatchRequest`] | [`BarSeries`] / [`BarsBatch`] | OHLCV history |
//! | [`IpoCalendarSource`] | year + month | `Vec<IpoListing>` | Priced IPOs |
//!
//! "No data" is a successful, empty result. Only genuine provider failures
//! surface as [`SourceError`], so callers can decide per stage whether a
//! failure is fatal.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{BarSeries, Interval, IpoListing, ProviderId, Security, Ticker};

/// Boxed future returned by provider trait methods.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    MalformedResponse,
    Internal,
}

/// Structured provider error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::MalformedResponse,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::MalformedResponse => "source.malformed_response",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Listing file published by an exchange symbol directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingFeed {
    /// Securities listed on NASDAQ.
    Nasdaq,
    /// NYSE, NYSE American, Arca and other non-NASDAQ venues.
    Other,
}

impl ListingFeed {
    pub const ALL: [Self; 2] = [Self::Nasdaq, Self::Other];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nasdaq => "nasdaq",
            Self::Other => "other",
        }
    }
}

impl Display for ListingFeed {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload for a single ticker's recent bars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarsRequest {
    pub ticker: Ticker,
    pub interval: Interval,
    pub lookback_days: u32,
}

impl BarsRequest {
    pub fn new(ticker: Ticker, interval: Interval, lookback_days: u32) -> Result<Self, SourceError> {
        validate_lookback(interval, lookback_days)?;
        Ok(Self {
            ticker,
            interval,
            lookback_days,
        })
    }
}

/// Request payload for several tickers sharing one interval and window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarsBatchRequest {
    pub tickers: Vec<Ticker>,
    pub interval: Interval,
    pub lookback_days: u32,
}

impl BarsBatchRequest {
    pub fn new(
        tickers: Vec<Ticker>,
        interval: Interval,
        lookback_days: u32,
    ) -> Result<Self, SourceError> {
        if tickers.is_empty() {
            return Err(SourceError::invalid_request(
                "bars batch request must include at least one ticker",
            ));
        }
        validate_lookback(interval, lookback_days)?;
        Ok(Self {
            tickers,
            interval,
            lookback_days,
        })
    }

    fn single(&self, ticker: Ticker) -> BarsRequest {
        BarsRequest {
            ticker,
            interval: self.interval,
            lookback_days: self.lookback_days,
        }
    }
}

fn validate_lookback(interval: Interval, lookback_days: u32) -> Result<(), SourceError> {
    if lookback_days == 0 {
        return Err(SourceError::invalid_request(
            "bars request lookback must be greater than zero days",
        ));
    }
    if let Some(max) = interval.max_lookback_days() {
        if lookback_days > max {
            return Err(SourceError::invalid_request(format!(
                "{interval} bars are only available for the last {max} days"
            )));
        }
    }
    Ok(())
}

/// Per-ticker outcome of a batch fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct BarsBatch {
    pub series: Vec<BarSeries>,
    pub failures: Vec<(Ticker, SourceError)>,
}

/// Ticker universe provider contract.
pub trait UniverseSource: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Listing feeds this source can serve, fetched independently.
    fn feeds(&self) -> Vec<ListingFeed>;

    /// Fetches and parses one listing feed.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the feed cannot be downloaded or its header
    /// does not carry the expected columns.
    fn listings<'a>(&'a self, feed: ListingFeed) -> SourceFuture<'a, Vec<Security>>;
}

/// Historical bar provider contract.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; validation batches share one source.
pub trait MarketDataSource: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Fetches recent bars for one ticker. Unknown or delisted tickers yield an
    /// empty series.
    fn bars<'a>(&'a self, req: BarsRequest) -> SourceFuture<'a, BarSeries>;

    /// Fetches recent bars for a group of tickers.
    ///
    /// The default walks the group one ticker at a time. The batch as a whole
    /// fails only when every ticker failed with a retryable error, which is
    /// how a provider outage looks from here.
    fn bars_batch<'a>(&'a self, req: BarsBatchRequest) -> SourceFuture<'a, BarsBatch> {
        Box::pin(async move {
            let mut series = Vec::with_capacity(req.tickers.len());
            let mut failures = Vec::new();

            for ticker in &req.tickers {
                match self.bars(req.single(ticker.clone())).await {
                    Ok(bars) => series.push(bars),
                    Err(error) => failures.push((ticker.clone(), error)),
                }
            }

            if series.is_empty() && failures.iter().all(|(_, error)| error.retryable()) {
                if let Some((_, error)) = failures.first() {
                    return Err(SourceError::unavailable(format!(
                        "all {} tickers in batch failed: {}",
                        failures.len(),
                        error.message()
                    )));
                }
            }

            Ok(BarsBatch { series, failures })
        })
    }
}

/// IPO calendar provider contract.
pub trait IpoCalendarSource: Send + Sync {
    fn id(&self) -> ProviderId;

    /// IPOs priced during the given calendar month (1-12).
    fn priced_ipos<'a>(&'a self, year: i32, month: u8) -> SourceFuture<'a, Vec<IpoListing>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_batch_is_rejected() {
        let err = BarsBatchRequest::new(Vec::new(), Interval::OneDay, 5).expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::InvalidRequest);
        assert!(err.message().contains("ticker"));
    }

    #[test]
    fn minute_bars_cannot_reach_past_a_week() {
        let ticker = Ticker::parse("TSLA").expect("ticker");
        assert!(BarsRequest::new(ticker.clone(), Interval::OneMinute, 7).is_ok());
        let err = BarsRequest::new(ticker, Interval::OneMinute, 30).expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::InvalidRequest);
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(SourceError::unavailable("x").code(), "source.unavailable");
        assert_eq!(
            SourceError::malformed_response("x").code(),
            "source.malformed_response"
        );
        assert!(!SourceError::malformed_response("x").retryable());
        assert!(SourceError::rate_limited("x").retryable());
    }
}
