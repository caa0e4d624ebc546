//! In-memory sources for tests and offline runs.

use std::collections::{BTreeMap, BTreeSet};

use time::macros::date;
use time::Date;
use tracing::debug;

use crate::data_source::{
    BarsRequest, IpoCalendarSource, ListingFeed, MarketDataSource, SourceError, SourceFuture,
    UniverseSource,
};
use crate::{Bar, BarSeries, IpoListing, ProviderId, Security, Ticker, UtcDateTime};

/// 2024-01-02T00:00:00Z, the first synthetic trading day.
const FIRST_BAR_EPOCH: i64 = 1_704_153_600;
const SECONDS_PER_DAY: i64 = 86_400;

fn parse_or_log(raw: &str) -> Option<Ticker> {
    Ticker::parse(raw)
        .map_err(|error| debug!(raw, error = %error, "ignoring fixture ticker"))
        .ok()
}

/// Listing feeds held in memory. Feeds can be marked as failing.
#[derive(Debug, Clone, Default)]
pub struct StaticUniverse {
    feeds: Vec<(ListingFeed, Vec<Security>)>,
    failing: Vec<ListingFeed>,
}

impl StaticUniverse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything on the NASDAQ feed, built from `(ticker, name)` pairs.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self::new().with_feed(ListingFeed::Nasdaq, pairs)
    }

    pub fn with_feed(mut self, feed: ListingFeed, pairs: &[(&str, &str)]) -> Self {
        let securities = pairs
            .iter()
            .filter_map(|(ticker, name)| parse_or_log(ticker).map(|t| Security::new(t, *name)))
            .collect();
        self.feeds.retain(|(existing, _)| *existing != feed);
        self.feeds.push((feed, securities));
        self
    }

    pub fn failing_feed(mut self, feed: ListingFeed) -> Self {
        if !self.feeds.iter().any(|(existing, _)| *existing == feed) {
            self.feeds.push((feed, Vec::new()));
        }
        self.failing.push(feed);
        self
    }
}

impl UniverseSource for StaticUniverse {
    fn id(&self) -> ProviderId {
        ProviderId::Static
    }

    fn feeds(&self) -> Vec<ListingFeed> {
        self.feeds.iter().map(|(feed, _)| *feed).collect()
    }

    fn listings<'a>(&'a self, feed: ListingFeed) -> SourceFuture<'a, Vec<Security>> {
        Box::pin(async move {
            if self.failing.contains(&feed) {
                return Err(SourceError::unavailable(format!("{feed} feed is down")));
            }
            Ok(self
                .feeds
                .iter()
                .find(|(existing, _)| *existing == feed)
                .map(|(_, securities)| securities.clone())
                .unwrap_or_default())
        })
    }
}

/// Synthetic daily bars keyed by ticker. Unknown tickers have no data.
#[derive(Debug, Clone, Default)]
pub struct StaticMarketData {
    volumes: BTreeMap<Ticker, Vec<u64>>,
    failing: BTreeSet<Ticker>,
}

impl StaticMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// One flat-priced daily bar per volume value, oldest first.
    pub fn with_daily_volumes(mut self, ticker: &str, volumes: &[u64]) -> Self {
        if let Some(ticker) = parse_or_log(ticker) {
            self.volumes.insert(ticker, volumes.to_vec());
        }
        self
    }

    /// Every request for this ticker fails as if the provider were down.
    pub fn failing_for(mut self, ticker: &str) -> Self {
        if let Some(ticker) = parse_or_log(ticker) {
            self.failing.insert(ticker);
        }
        self
    }

    fn series(&self, req: &BarsRequest) -> Result<BarSeries, SourceError> {
        let Some(volumes) = self.volumes.get(&req.ticker) else {
            return Ok(BarSeries::empty(req.ticker.clone(), req.interval));
        };

        let window = usize::try_from(req.lookback_days).unwrap_or(usize::MAX);
        let skip = volumes.len().saturating_sub(window);
        let bars = volumes
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(day, volume)| {
                let offset = i64::try_from(day).unwrap_or(i64::MAX / SECONDS_PER_DAY);
                let ts = UtcDateTime::from_unix_timestamp(FIRST_BAR_EPOCH + offset * SECONDS_PER_DAY)
                    .map_err(|error| SourceError::internal(error.to_string()))?;
                Bar::new(ts, 10.0, 10.0, 10.0, 10.0, Some(*volume))
                    .map_err(|error| SourceError::internal(error.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BarSeries::new(req.ticker.clone(), req.interval, bars))
    }
}

impl MarketDataSource for StaticMarketData {
    fn id(&self) -> ProviderId {
        ProviderId::Static
    }

    fn bars<'a>(&'a self, req: BarsRequest) -> SourceFuture<'a, BarSeries> {
        Box::pin(async move {
            if self.failing.contains(&req.ticker) {
                return Err(SourceError::unavailable(format!(
                    "no route to market data for {}",
                    req.ticker
                )));
            }
            self.series(&req)
        })
    }
}

/// Priced IPOs held in memory; months can be marked as failing.
#[derive(Debug, Clone, Default)]
pub struct StaticIpoCalendar {
    listings: Vec<IpoListing>,
    failing: BTreeSet<(i32, u8)>,
}

impl StaticIpoCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ipo(mut self, ticker: &str, company_name: &str, priced_date: Date) -> Self {
        if let Some(ticker) = parse_or_log(ticker) {
            self.listings
                .push(IpoListing::new(ticker, company_name, priced_date));
        }
        self
    }

    pub fn failing_month(mut self, year: i32, month: u8) -> Self {
        self.failing.insert((year, month));
        self
    }
}

impl IpoCalendarSource for StaticIpoCalendar {
    fn id(&self) -> ProviderId {
        ProviderId::Static
    }

    fn priced_ipos<'a>(&'a self, year: i32, month: u8) -> SourceFuture<'a, Vec<IpoListing>> {
        Box::pin(async move {
            if self.failing.contains(&(year, month)) {
                return Err(SourceError::unavailable(format!(
                    "ipo calendar for {year}-{month:02} is unavailable"
                )));
            }
            Ok(self
                .listings
                .iter()
                .filter(|listing| {
                    listing.priced_date.year() == year && u8::from(listing.priced_date.month()) == month
                })
                .cloned()
                .collect())
        })
    }
}

const DEMO_SECURITIES: [(&str, &str, u64); 17] = [
    ("AAPL", "Apple Inc. - Common Stock", 52_000_000),
    ("APPL", "Appleton Partners Holdings", 12_000),
    ("ARL", "American Realty Investors, Inc.", 9_000),
    ("ARM", "Arm Holdings plc - American Depositary Shares", 6_400_000),
    ("ARMK", "Aramark Common Stock", 2_100_000),
    ("ETHA", "iShares Ethereum Trust ETF", 9_800_000),
    ("ETHE", "Grayscale Ethereum Trust ETF", 4_300_000),
    ("NVDA", "NVIDIA Corporation - Common Stock", 240_000_000),
    ("NVDL", "GraniteShares 2x Long NVDA Daily ETF", 3_600_000),
    ("SPT", "Sprout Social, Inc. - Class A Common Stock", 700_000),
    ("SPXL", "Direxion Daily S&P 500 Bull 3X Shares", 4_100_000),
    ("SPY", "SPDR S&P 500 ETF Trust", 61_000_000),
    ("SPYG", "SPDR Portfolio S&P 500 Growth ETF", 2_900_000),
    ("TALA", "Taland Corp", 1_250),
    ("TSLA", "Tesla, Inc. - Common Stock", 98_000_000),
    ("TSLL", "Direxion Daily TSLA Bull 2X Shares", 27_000_000),
    ("TSLS", "Shellbay Resources Corp", 0),
];

/// Small universe exercising every suppression and proximity rule.
pub fn demo_universe() -> StaticUniverse {
    let (nasdaq, other): (Vec<_>, Vec<_>) = DEMO_SECURITIES
        .iter()
        .map(|(ticker, name, _)| (*ticker, *name))
        .partition(|(_, name)| name.contains("Common Stock") || name.contains("Shares"));
    StaticUniverse::new()
        .with_feed(ListingFeed::Nasdaq, &nasdaq)
        .with_feed(ListingFeed::Other, &other)
}

/// Five flat days per demo ticker at its typical volume.
pub fn demo_market_data() -> StaticMarketData {
    DEMO_SECURITIES
        .iter()
        .fold(StaticMarketData::new(), |data, (ticker, _, volume)| {
            data.with_daily_volumes(ticker, &[*volume; 5])
        })
}

pub fn demo_ipo_calendar() -> StaticIpoCalendar {
    StaticIpoCalendar::new()
        .with_ipo("ARM", "Arm Holdings plc", date!(2023 - 09 - 14))
        .with_ipo("ETHA", "iShares Ethereum Trust ETF", date!(2024 - 07 - 23))
}
