use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use super::{status_error, transport_error};
use crate::data_source::{BarsRequest, MarketDataSource, SourceError, SourceFuture};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::provider_policy::ProviderPolicy;
use crate::throttling::Throttle;
use crate::{Bar, BarSeries, ProviderId, Ticker, UtcDateTime};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const NOT_FOUND_CODE: &str = "Not Found";

/// Recent OHLCV history from the Yahoo Finance chart endpoint.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    policy: ProviderPolicy,
    throttle: Throttle,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()))
    }
}

impl YahooAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        let policy = ProviderPolicy::yahoo_default();
        Self {
            http_client,
            throttle: Throttle::from_policy(&policy),
            policy,
        }
    }

    fn endpoint(req: &BarsRequest) -> String {
        format!(
            "{CHART_URL}/{}?range={}d&interval={}",
            urlencoding::encode(req.ticker.as_str()),
            req.lookback_days,
            req.interval.as_str()
        )
    }

    async fn fetch_bars(&self, req: BarsRequest) -> Result<BarSeries, SourceError> {
        self.throttle.wait().await;

        let request = HttpRequest::get(Self::endpoint(&req))
            .with_header("referer", "https://finance.yahoo.com/")
            .with_timeout_ms(self.policy.timeout_ms());
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| transport_error(ProviderId::Yahoo, &error))?;

        if response.status == 404 {
            debug!(ticker = %req.ticker, "yahoo has no chart for ticker");
            return Ok(BarSeries::empty(req.ticker, req.interval));
        }
        if !response.is_success() {
            return Err(status_error(ProviderId::Yahoo, &response));
        }

        let bars = parse_chart(&response.body, &req.ticker)?;
        Ok(BarSeries::new(req.ticker, req.interval, bars))
    }
}

impl MarketDataSource for YahooAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn bars<'a>(&'a self, req: BarsRequest) -> SourceFuture<'a, BarSeries> {
        Box::pin(async move { self.fetch_bars(req).await })
    }
}

/// Decodes a chart payload. A "Not Found" chart error or a result without
/// timestamps means no data.
fn parse_chart(body: &str, ticker: &Ticker) -> Result<Vec<Bar>, SourceError> {
    let response: YahooChartResponse = serde_json::from_str(body).map_err(|error| {
        SourceError::malformed_response(format!("failed to parse yahoo chart: {error}"))
    })?;

    if let Some(error) = response.chart.error {
        if error.code == NOT_FOUND_CODE {
            return Ok(Vec::new());
        }
        return Err(SourceError::unavailable(format!(
            "yahoo chart error for {ticker}: {} {}",
            error.code,
            error.description.unwrap_or_default()
        )));
    }

    let Some(result) = response.chart.result.and_then(|results| results.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let Some(timestamps) = result.timestamp else {
        return Ok(Vec::new());
    };
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Ok(Vec::new());
    };

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &seconds) in timestamps.iter().enumerate() {
        let (Some(Some(open)), Some(Some(high)), Some(Some(low)), Some(Some(close))) = (
            quote.open.get(i),
            quote.high.get(i),
            quote.low.get(i),
            quote.close.get(i),
        ) else {
            continue;
        };

        let ts = UtcDateTime::from_unix_timestamp(seconds).map_err(|error| {
            SourceError::malformed_response(format!("invalid yahoo timestamp {seconds}: {error}"))
        })?;
        let volume = quote
            .volume
            .get(i)
            .copied()
            .flatten()
            .and_then(|value| u64::try_from(value).ok());

        match Bar::new(ts, *open, *high, *low, *close, volume) {
            Ok(bar) => bars.push(bar),
            Err(error) => debug!(ticker = %ticker, error = %error, "skipping yahoo bar"),
        }
    }

    Ok(bars)
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Deserialize)]
struct YahooChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}
