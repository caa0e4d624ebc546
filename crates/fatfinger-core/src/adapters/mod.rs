//! Provider adapters.
//!
//! | Adapter | Contract | Upstream |
//! |---------|----------|----------|
//! | [`NasdaqTraderAdapter`] | `UniverseSource` | NASDAQ Trader symbol directory |
//! | [`YahooAdapter`] | `MarketDataSource` | Yahoo Finance v8 chart |
//! | [`NasdaqIpoAdapter`] | `IpoCalendarSource` | NASDAQ IPO calendar API |
//! | [`StaticUniverse`], [`StaticMarketData`], [`StaticIpoCalendar`] | all three | in memory |

mod fixture;
mod nasdaq_ipo;
mod nasdaq_trader;
mod yahoo;

pub use fixture::{
    demo_ipo_calendar, demo_market_data, demo_universe, StaticIpoCalendar, StaticMarketData,
    StaticUniverse,
};
pub use nasdaq_ipo::NasdaqIpoAdapter;
pub use nasdaq_trader::NasdaqTraderAdapter;
pub use yahoo::YahooAdapter;

use crate::data_source::SourceError;
use crate::http_client::{HttpError, HttpResponse};
use crate::ProviderId;

fn transport_error(provider: ProviderId, error: &HttpError) -> SourceError {
    if error.retryable() {
        SourceError::unavailable(format!("{provider} transport error: {}", error.message()))
    } else {
        SourceError::internal(format!("{provider} request could not be sent: {}", error.message()))
    }
}

/// Maps a non-success status to the matching error kind.
fn status_error(provider: ProviderId, response: &HttpResponse) -> SourceError {
    match response.status {
        429 => SourceError::rate_limited(format!("{provider} rate limited the request")),
        status => SourceError::unavailable(format!("{provider} returned status {status}")),
    }
}
