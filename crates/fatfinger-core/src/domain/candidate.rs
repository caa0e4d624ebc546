use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::Date;

use crate::{Security, Ticker, ValidationError};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// A universe ticker within the edit-distance threshold of a target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Match {
    pub ticker: Ticker,
    pub distance: usize,
}

/// Principal pipeline output: one target and one plausible mistyped neighbour.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypoCandidatePair {
    pub target_ticker: Ticker,
    pub target_name: String,
    pub candidate_ticker: Ticker,
    pub candidate_name: String,
    pub edit_distance: usize,
    pub keyboard_proximate: bool,
}

impl TypoCandidatePair {
    pub fn new(
        target: &Security,
        candidate: &Security,
        edit_distance: usize,
        keyboard_proximate: bool,
    ) -> Self {
        Self {
            target_ticker: target.ticker.clone(),
            target_name: target.name.clone(),
            candidate_ticker: candidate.ticker.clone(),
            candidate_name: candidate.name.clone(),
            edit_distance,
            keyboard_proximate,
        }
    }

    /// Column names used when pairs are persisted as rows.
    pub const COLUMNS: [&'static str; 6] = [
        "target_ticker",
        "target_name",
        "candidate_ticker",
        "candidate_name",
        "edit_distance",
        "keyboard_proximate",
    ];
}

/// A priced IPO taken from an IPO calendar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IpoListing {
    pub ticker: Ticker,
    pub company_name: String,
    #[serde(with = "iso_date")]
    pub priced_date: Date,
}

impl IpoListing {
    pub fn new(ticker: Ticker, company_name: impl Into<String>, priced_date: Date) -> Self {
        Self {
            ticker,
            company_name: company_name.into(),
            priced_date,
        }
    }

    pub fn security(&self) -> Security {
        Security::new(self.ticker.clone(), self.company_name.clone())
    }
}

/// A typo pair whose target ticker went public on `ipo_date`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IpoTypoCandidate {
    #[serde(with = "iso_date")]
    pub ipo_date: Date,
    #[serde(flatten)]
    pub pair: TypoCandidatePair,
}

/// Parses calendar dates in either `MM/DD/YYYY` or `YYYY-MM-DD` form.
pub fn parse_listing_date(input: &str) -> Result<Date, ValidationError> {
    let trimmed = input.trim();
    let us_format = format_description!("[month padding:none]/[day padding:none]/[year]");
    let iso_format = format_description!("[year]-[month]-[day]");

    Date::parse(trimmed, &us_format)
        .or_else(|_| Date::parse(trimmed, &iso_format))
        .map_err(|_| ValidationError::InvalidDate {
            value: input.to_owned(),
        })
}
