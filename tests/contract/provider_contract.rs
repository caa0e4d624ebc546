//! Provider adapters against canned upstream payloads.
//!
//! A recording stub stands in for the network: each test feeds the adapter a
//! response body and then checks both the parsed result and the request that
//! was sent.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use fatfinger_core::data_source::{IpoCalendarSource, ListingFeed, MarketDataSource, UniverseSource};
use fatfinger_core::{
    BarsBatchRequest, BarsRequest, HttpClient, HttpError, HttpRequest, HttpResponse, Interval,
    NasdaqIpoAdapter, NasdaqTraderAdapter, SourceErrorKind, Ticker, YahooAdapter,
};

/// Answers every request with the first route whose pattern occurs in the URL.
#[derive(Default)]
struct RecordingHttpClient {
    routes: Vec<(String, Result<HttpResponse, HttpError>)>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingHttpClient {
    fn route(mut self, pattern: &str, response: HttpResponse) -> Self {
        self.routes.push((pattern.to_owned(), Ok(response)));
        self
    }

    fn failing_route(mut self, pattern: &str, error: HttpError) -> Self {
        self.routes.push((pattern.to_owned(), Err(error)));
        self
    }

    fn urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.iter().map(|request| request.url.clone()).collect())
            .unwrap_or_default()
    }

    fn header(&self, index: usize, name: &str) -> Option<String> {
        self.requests
            .lock()
            .ok()
            .and_then(|requests| requests.get(index).and_then(|r| r.headers.get(name).cloned()))
    }
}

impl HttpClient for RecordingHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let answer = self
                .routes
                .iter()
                .find(|(pattern, _)| request.url.contains(pattern.as_str()))
                .map(|(_, answer)| answer.clone())
                .unwrap_or_else(|| Ok(HttpResponse::with_status(404, "")));
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(request);
            }
            answer
        })
    }
}

fn ticker(value: &str) -> Ticker {
    Ticker::parse(value).expect("ticker")
}

// =============================================================================
// NASDAQ Trader symbol directory
// =============================================================================

const NASDAQ_LISTED: &str = "Symbol|Security Name|Market Category|Test Issue|Financial Status|Round Lot Size|ETF|NextShares\n\
TSLA|Tesla, Inc. - Common Stock|Q|N|N|100|N|N\n\
TSLL|Direxion Daily TSLA Bull 2X Shares|G|N|N|100|Y|N\n\
File Creation Time: 0105202418:01|||||||\n";

const OTHER_LISTED: &str = "ACT Symbol|Security Name|Exchange|CQS Symbol|ETF|Round Lot Size|Test Issue|NASDAQ Symbol\n\
SPY|SPDR S&P 500 ETF Trust|P|SPY|Y|100|N|SPY\n\
File Creation Time: 0105202418:01|||||||\n";

#[tokio::test]
async fn listing_files_parse_into_securities_per_feed() {
    // Given: both symbol directory files are served
    let http = Arc::new(
        RecordingHttpClient::default()
            .route("nasdaqlisted.txt", HttpResponse::ok(NASDAQ_LISTED))
            .route("otherlisted.txt", HttpResponse::ok(OTHER_LISTED)),
    );
    let adapter = NasdaqTraderAdapter::with_http_client(http.clone());

    // When: each feed is fetched
    let nasdaq = adapter.listings(ListingFeed::Nasdaq).await.expect("nasdaq feed");
    let other = adapter.listings(ListingFeed::Other).await.expect("other feed");

    // Then: rows map to securities and the footer is dropped
    assert_eq!(adapter.feeds(), vec![ListingFeed::Nasdaq, ListingFeed::Other]);
    assert_eq!(nasdaq.len(), 2);
    assert_eq!(nasdaq[1].name, "Direxion Daily TSLA Bull 2X Shares");
    assert_eq!(other.len(), 1);
    assert_eq!(other[0].ticker.as_str(), "SPY");
    assert_eq!(http.urls().len(), 2);
}

#[tokio::test]
async fn listing_file_with_unexpected_header_is_malformed() {
    // Given: the directory serves an HTML error page
    let http = Arc::new(
        RecordingHttpClient::default().route("nasdaqlisted.txt", HttpResponse::ok("<html>maintenance</html>")),
    );
    let adapter = NasdaqTraderAdapter::with_http_client(http);

    // When
    let err = adapter.listings(ListingFeed::Nasdaq).await.expect_err("must fail");

    // Then
    assert_eq!(err.kind(), SourceErrorKind::MalformedResponse);
    assert!(!err.retryable());
}

#[tokio::test]
async fn listing_download_failure_is_unavailable() {
    // Given: the connection drops
    let http = Arc::new(
        RecordingHttpClient::default().failing_route("otherlisted.txt", HttpError::new("connection reset")),
    );
    let adapter = NasdaqTraderAdapter::with_http_client(http);

    // When
    let err = adapter.listings(ListingFeed::Other).await.expect_err("must fail");

    // Then
    assert_eq!(err.kind(), SourceErrorKind::Unavailable);
    assert!(err.message().contains("connection reset"));
}

// =============================================================================
// Yahoo chart
// =============================================================================

const TALA_CHART: &str = r#"{"chart":{"result":[{"meta":{"symbol":"TALA"},
"timestamp":[1704153600,1704240000,1704326400],
"indicators":{"quote":[{"open":[1.0,1.1,null],"high":[1.2,1.3,1.2],"low":[0.9,1.0,1.0],
"close":[1.1,1.2,1.1],"volume":[1200,0,400]}]}}],"error":null}}"#;

#[tokio::test]
async fn chart_payload_becomes_daily_bars() {
    // Given
    let http = Arc::new(RecordingHttpClient::default().route("/chart/TALA", HttpResponse::ok(TALA_CHART)));
    let adapter = YahooAdapter::with_http_client(http.clone());

    // When
    let request = BarsRequest::new(ticker("TALA"), Interval::OneDay, 5).expect("request");
    let series = adapter.bars(request).await.expect("bars");

    // Then: the bar with a missing open is skipped
    assert_eq!(series.bars.len(), 2);
    assert_eq!(series.total_volume(), 1200);
    let urls = http.urls();
    assert!(urls[0].ends_with("/TALA?range=5d&interval=1d"));
    assert_eq!(http.header(0, "referer").as_deref(), Some("https://finance.yahoo.com/"));
}

#[tokio::test]
async fn unknown_ticker_is_an_empty_series_not_an_error() {
    // Given: Yahoo answers 404 for a delisted symbol
    let http = Arc::new(RecordingHttpClient::default());
    let adapter = YahooAdapter::with_http_client(http);

    // When
    let request = BarsRequest::new(ticker("GONE"), Interval::OneDay, 5).expect("request");
    let series = adapter.bars(request).await.expect("no data is not an error");

    // Then
    assert!(series.is_empty());
}

#[tokio::test]
async fn throttled_chart_request_is_rate_limited() {
    // Given
    let http = Arc::new(
        RecordingHttpClient::default().route("/chart/", HttpResponse::with_status(429, "Too Many Requests")),
    );
    let adapter = YahooAdapter::with_http_client(http);

    // When
    let request = BarsRequest::new(ticker("TSLA"), Interval::OneDay, 5).expect("request");
    let err = adapter.bars(request).await.expect_err("must fail");

    // Then
    assert_eq!(err.kind(), SourceErrorKind::RateLimited);
    assert!(err.retryable());
}

#[tokio::test]
async fn batch_fails_only_when_every_ticker_failed() {
    // Given: one ticker answers, one hits a server error
    let http = Arc::new(
        RecordingHttpClient::default()
            .route("/chart/TALA", HttpResponse::ok(TALA_CHART))
            .route("/chart/TSLA", HttpResponse::with_status(503, "")),
    );
    let adapter = YahooAdapter::with_http_client(http);

    // When
    let request = BarsBatchRequest::new(vec![ticker("TALA"), ticker("TSLA")], Interval::OneDay, 5)
        .expect("request");
    let batch = adapter.bars_batch(request).await.expect("partial batch");

    // Then
    assert_eq!(batch.series.len(), 1);
    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.failures[0].0.as_str(), "TSLA");
    assert_eq!(batch.failures[0].1.kind(), SourceErrorKind::Unavailable);
}

// =============================================================================
// NASDAQ IPO calendar
// =============================================================================

const MARCH_2024: &str = r#"{"data":{"priced":{"headers":{},"rows":[
{"dealID":"1","proposedTickerSymbol":"RDDT","companyName":"Reddit, Inc.","proposedExchange":"NYSE","proposedSharePrice":"34.00","pricedDate":"3/20/2024"},
{"dealID":"2","proposedTickerSymbol":"ALAB","companyName":"Astera Labs, Inc.","proposedExchange":"NASDAQ Global Select","proposedSharePrice":"36.00","pricedDate":"03/19/2024"}
]}},"message":null,"status":{"rCode":200}}"#;

#[tokio::test]
async fn priced_rows_become_ipo_listings() {
    // Given
    let http = Arc::new(RecordingHttpClient::default().route("date=2024-03", HttpResponse::ok(MARCH_2024)));
    let adapter = NasdaqIpoAdapter::with_http_client(http.clone());

    // When
    let listings = adapter.priced_ipos(2024, 3).await.expect("calendar");

    // Then
    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].ticker.as_str(), "RDDT");
    assert_eq!(listings[1].priced_date.to_string(), "2024-03-19");
    assert_eq!(http.header(0, "origin").as_deref(), Some("https://www.nasdaq.com"));
}

#[tokio::test]
async fn month_outside_calendar_is_invalid() {
    let adapter = NasdaqIpoAdapter::with_http_client(Arc::new(RecordingHttpClient::default()));

    let err = adapter.priced_ipos(2024, 13).await.expect_err("must fail");

    assert_eq!(err.kind(), SourceErrorKind::InvalidRequest);
}
