use std::sync::Arc;

use tracing::debug;

use super::{status_error, transport_error};
use crate::data_source::{ListingFeed, SourceError, SourceFuture, UniverseSource};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::provider_policy::ProviderPolicy;
use crate::throttling::Throttle;
use crate::{ProviderId, Security, Ticker};

const NASDAQ_LISTED_URL: &str = "https://www.nasdaqtrader.com/dynamic/SymDir/nasdaqlisted.txt";
const OTHER_LISTED_URL: &str = "https://www.nasdaqtrader.com/dynamic/SymDir/otherlisted.txt";
const NAME_COLUMN: &str = "Security Name";
const FOOTER_PREFIX: &str = "File Creation Time";

/// Symbol directory files published by NASDAQ Trader.
#[derive(Clone)]
pub struct NasdaqTraderAdapter {
    http_client: Arc<dyn HttpClient>,
    policy: ProviderPolicy,
    throttle: Throttle,
}

impl Default for NasdaqTraderAdapter {
    fn default() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()))
    }
}

impl NasdaqTraderAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        let policy = ProviderPolicy::nasdaq_trader_default();
        Self {
            http_client,
            throttle: Throttle::from_policy(&policy),
            policy,
        }
    }

    fn url(feed: ListingFeed) -> &'static str {
        match feed {
            ListingFeed::Nasdaq => NASDAQ_LISTED_URL,
            ListingFeed::Other => OTHER_LISTED_URL,
        }
    }

    fn ticker_column(feed: ListingFeed) -> &'static str {
        match feed {
            ListingFeed::Nasdaq => "Symbol",
            ListingFeed::Other => "ACT Symbol",
        }
    }

    async fn fetch(&self, feed: ListingFeed) -> Result<Vec<Security>, SourceError> {
        self.throttle.wait().await;

        let request = HttpRequest::get(Self::url(feed)).with_timeout_ms(self.policy.timeout_ms());
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| transport_error(ProviderId::NasdaqTrader, &error))?;

        if !response.is_success() {
            return Err(status_error(ProviderId::NasdaqTrader, &response));
        }

        parse_listing_file(&response.body, Self::ticker_column(feed))
    }
}

impl UniverseSource for NasdaqTraderAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::NasdaqTrader
    }

    fn feeds(&self) -> Vec<ListingFeed> {
        ListingFeed::ALL.to_vec()
    }

    fn listings<'a>(&'a self, feed: ListingFeed) -> SourceFuture<'a, Vec<Security>> {
        Box::pin(async move { self.fetch(feed).await })
    }
}

/// Parses a pipe-delimited listing file.
///
/// The header must name both the ticker column and `Security Name`. The
/// trailing creation-time footer, short rows and unparseable tickers are
/// skipped.
pub(crate) fn parse_listing_file(
    body: &str,
    ticker_column: &str,
) -> Result<Vec<Security>, SourceError> {
    let mut lines = body.lines().filter(|line| !line.trim().is_empty());
    let header: Vec<&str> = lines
        .next()
        .ok_or_else(|| SourceError::malformed_response("listing file is empty"))?
        .split('|')
        .map(str::trim)
        .collect();

    let column = |name: &str| {
        header.iter().position(|field| *field == name).ok_or_else(|| {
            SourceError::malformed_response(format!("listing header has no '{name}' column"))
        })
    };
    let ticker_index = column(ticker_column)?;
    let name_index = column(NAME_COLUMN)?;
    let min_fields = ticker_index.max(name_index) + 1;

    let mut securities = Vec::new();
    for line in lines {
        if line.starts_with(FOOTER_PREFIX) {
            continue;
        }

        let fields: Vec<&str> = line.split('|').collect();
        if fields.len() < min_fields {
            debug!(line, "skipping short listing row");
            continue;
        }

        match Ticker::parse(fields[ticker_index]) {
            Ok(ticker) => securities.push(Security::new(ticker, fields[name_index].trim())),
            Err(error) => debug!(raw = fields[ticker_index], error = %error, "skipping listing row"),
        }
    }

    Ok(securities)
}
