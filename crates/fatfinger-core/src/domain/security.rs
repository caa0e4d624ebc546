use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Ticker;

/// A listed security as published by a ticker universe provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Security {
    pub ticker: Ticker,
    pub name: String,
}

impl Security {
    pub fn new(ticker: Ticker, name: impl Into<String>) -> Self {
        Self {
            ticker,
            name: name.into(),
        }
    }
}

/// Ticker-keyed snapshot of every known security for one pipeline run.
///
/// Iteration order is by ticker so that repeated runs visit candidates identically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Universe {
    securities: BTreeMap<Ticker, Security>,
}

impl Universe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry for the security's ticker.
    pub fn insert(&mut self, security: Security) {
        self.securities.insert(security.ticker.clone(), security);
    }

    pub fn get(&self, ticker: &Ticker) -> Option<&Security> {
        self.securities.get(ticker)
    }

    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.securities.contains_key(ticker)
    }

    /// Name for the ticker, or an empty string when it is not listed.
    pub fn name_of(&self, ticker: &Ticker) -> &str {
        self.get(ticker)
            .map(|security| security.name.as_str())
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.securities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.securities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Security> {
        self.securities.values()
    }

    pub fn tickers(&self) -> impl Iterator<Item = &Ticker> {
        self.securities.keys()
    }
}

impl Extend<Security> for Universe {
    fn extend<I: IntoIterator<Item = Security>>(&mut self, iter: I) {
        for security in iter {
            self.insert(security);
        }
    }
}

impl FromIterator<Security> for Universe {
    fn from_iter<I: IntoIterator<Item = Security>>(iter: I) -> Self {
        let mut universe = Self::new();
        universe.extend(iter);
        universe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn security(ticker: &str, name: &str) -> Security {
        Security::new(Ticker::parse(ticker).expect("ticker"), name)
    }

    #[test]
    fn later_listing_replaces_earlier_one() {
        let universe: Universe = vec![
            security("ABC", "First Listing"),
            security("ABC", "Second Listing"),
        ]
        .into_iter()
        .collect();

        assert_eq!(universe.len(), 1);
        assert_eq!(
            universe.name_of(&Ticker::parse("ABC").expect("ticker")),
            "Second Listing"
        );
    }

    #[test]
    fn unknown_ticker_has_empty_name() {
        let universe = Universe::new();
        assert_eq!(universe.name_of(&Ticker::parse("NOPE").expect("ticker")), "");
    }
}
