use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use super::{status_error, transport_error};
use crate::data_source::{IpoCalendarSource, SourceError, SourceFuture};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::provider_policy::ProviderPolicy;
use crate::throttling::Throttle;
use crate::{parse_listing_date, IpoListing, ProviderId, Ticker};

const CALENDAR_URL: &str = "https://api.nasdaq.com/api/ipo/calendar";

/// Priced IPOs from the NASDAQ IPO calendar.
#[derive(Clone)]
pub struct NasdaqIpoAdapter {
    http_client: Arc<dyn HttpClient>,
    policy: ProviderPolicy,
    throttle: Throttle,
}

impl Default for NasdaqIpoAdapter {
    fn default() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()))
    }
}

impl NasdaqIpoAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        let policy = ProviderPolicy::nasdaq_ipo_default();
        Self {
            http_client,
            throttle: Throttle::from_policy(&policy),
            policy,
        }
    }

    fn endpoint(year: i32, month: u8) -> String {
        format!("{CALENDAR_URL}?date={year:04}-{month:02}")
    }

    async fn fetch_month(&self, year: i32, month: u8) -> Result<Vec<IpoListing>, SourceError> {
        if !(1..=12).contains(&month) {
            return Err(SourceError::invalid_request(format!(
                "month must be 1-12, got {month}"
            )));
        }

        self.throttle.wait().await;

        let request = HttpRequest::get(Self::endpoint(year, month))
            .with_header("origin", "https://www.nasdaq.com")
            .with_header("referer", "https://www.nasdaq.com/")
            .with_timeout_ms(self.policy.timeout_ms());
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| transport_error(ProviderId::NasdaqIpo, &error))?;

        if !response.is_success() {
            return Err(status_error(ProviderId::NasdaqIpo, &response));
        }

        parse_calendar(&response.body)
    }
}

impl IpoCalendarSource for NasdaqIpoAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::NasdaqIpo
    }

    fn priced_ipos<'a>(&'a self, year: i32, month: u8) -> SourceFuture<'a, Vec<IpoListing>> {
        Box::pin(async move { self.fetch_month(year, month).await })
    }
}

fn parse_calendar(body: &str) -> Result<Vec<IpoListing>, SourceError> {
    let response: CalendarResponse = serde_json::from_str(body).map_err(|error| {
        SourceError::malformed_response(format!("failed to parse ipo calendar: {error}"))
    })?;

    let rows = response
        .data
        .and_then(|data| data.priced)
        .and_then(|priced| priced.rows)
        .unwrap_or_default();

    let listings = rows
        .into_iter()
        .filter_map(|row| {
            let raw_ticker = row.proposed_ticker_symbol.filter(|value| !value.trim().is_empty())?;
            let raw_date = row.priced_date.filter(|value| !value.trim().is_empty())?;

            let ticker = Ticker::parse(&raw_ticker)
                .map_err(|error| debug!(raw = %raw_ticker, error = %error, "skipping ipo row"))
                .ok()?;
            let priced_date = parse_listing_date(&raw_date)
                .map_err(|error| debug!(raw = %raw_date, error = %error, "skipping ipo row"))
                .ok()?;

            Some(IpoListing::new(
                ticker,
                row.company_name.unwrap_or_default(),
                priced_date,
            ))
        })
        .collect();

    Ok(listings)
}

#[derive(Debug, Deserialize)]
struct CalendarResponse {
    #[serde(default)]
    data: Option<CalendarData>,
}

#[derive(Debug, Deserialize)]
struct CalendarData {
    #[serde(default)]
    priced: Option<PricedSection>,
}

#[derive(Debug, Deserialize)]
struct PricedSection {
    #[serde(default)]
    rows: Option<Vec<PricedRow>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PricedRow {
    #[serde(default)]
    proposed_ticker_symbol: Option<String>,
    #[serde(default)]
    company_name: Option<String>,
    #[serde(default)]
    priced_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use time::macros::date;

    #[test]
    fn endpoint_pads_month() {
        assert_eq!(
            NasdaqIpoAdapter::endpoint(2024, 5),
            "https://api.nasdaq.com/api/ipo/calendar?date=2024-05"
        );
    }

    #[test]
    fn reads_priced_rows() {
        let body = r#"{"data":{"priced":{"rows":[
            {"proposedTickerSymbol":"rddt","companyName":"Reddit, Inc.","pricedDate":"03/20/2024"},
            {"proposedTickerSymbol":"","companyName":"Blank","pricedDate":"03/21/2024"},
            {"proposedTickerSymbol":"ALAB","companyName":"Astera Labs, Inc."}
        ]}}}"#;
        let listings = parse_calendar(body).expect("parse");
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].ticker.as_str(), "RDDT");
        assert_eq!(listings[0].priced_date, date!(2024 - 03 - 20));
    }

    #[test]
    fn missing_priced_section_is_an_empty_month() {
        assert!(parse_calendar(r#"{"data":{"upcoming":{}}}"#).expect("parse").is_empty());
        assert!(parse_calendar(r#"{"data":null}"#).expect("parse").is_empty());
    }

    #[test]
    fn non_json_is_malformed() {
        let err = parse_calendar("Access Denied").expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::MalformedResponse);
    }
}
