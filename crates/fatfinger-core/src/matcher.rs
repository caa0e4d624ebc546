//! Bounded Damerau-Levenshtein matching of a target against the universe.

use crate::{Match, Security, Universe};

/// Damerau-Levenshtein distance with unit cost for insertion, deletion,
/// substitution and adjacent transposition.
pub fn edit_distance(a: &str, b: &str) -> usize {
    strsim::damerau_levenshtein(a, b)
}

/// Finds every universe ticker within `threshold` edits of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditDistanceMatcher {
    threshold: usize,
}

impl Default for EditDistanceMatcher {
    fn default() -> Self {
        Self { threshold: 1 }
    }
}

impl EditDistanceMatcher {
    pub const fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub const fn threshold(&self) -> usize {
        self.threshold
    }

    /// Matches in universe (ticker) order. The target itself is never returned.
    pub fn find_matches(&self, target: &Security, universe: &Universe) -> Vec<Match> {
        let target_ticker = target.ticker.as_str();
        let target_len = target.ticker.len();

        universe
            .tickers()
            .filter(|candidate| **candidate != target.ticker)
            // The distance can never be below the length difference.
            .filter(|candidate| candidate.len().abs_diff(target_len) <= self.threshold)
            .filter_map(|candidate| {
                let distance = edit_distance(target_ticker, candidate.as_str());
                (distance <= self.threshold).then(|| Match {
                    ticker: candidate.clone(),
                    distance,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Ticker;

    fn security(ticker: &str) -> Security {
        Security::new(Ticker::parse(ticker).expect("ticker"), "")
    }

    fn universe(tickers: &[&str]) -> Universe {
        tickers.iter().map(|ticker| security(ticker)).collect()
    }

    #[test]
    fn counts_each_edit_kind_as_one() {
        assert_eq!(edit_distance("TSLA", "TSLL"), 1);
        assert_eq!(edit_distance("TSLA", "TSLAX"), 1);
        assert_eq!(edit_distance("TSLA", "TSA"), 1);
        assert_eq!(edit_distance("NVDA", "NVAD"), 1);
        assert_eq!(edit_distance("", ""), 0);
    }

    #[test]
    fn finds_single_edit_neighbours() {
        let matcher = EditDistanceMatcher::default();
        let found = matcher.find_matches(
            &security("TSLA"),
            &universe(&["TSLA", "TSLL", "TALA", "TSLAX", "AAPL", "TS"]),
        );

        let tickers: Vec<&str> = found.iter().map(|m| m.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["TALA", "TSLAX", "TSLL"]);
        assert!(found.iter().all(|m| m.distance == 1));
    }

    #[test]
    fn excludes_the_target_itself() {
        let matcher = EditDistanceMatcher::new(2);
        let found = matcher.find_matches(&security("SPY"), &universe(&["SPY"]));
        assert!(found.is_empty());
    }

    #[test]
    fn length_gap_beyond_threshold_is_never_matched() {
        let matcher = EditDistanceMatcher::new(1);
        let found = matcher.find_matches(&security("F"), &universe(&["FOO", "FO", "G"]));
        let tickers: Vec<&str> = found.iter().map(|m| m.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["FO", "G"]);
    }

    #[test]
    fn zero_threshold_matches_nothing_but_duplicates() {
        let matcher = EditDistanceMatcher::new(0);
        let found = matcher.find_matches(&security("AMD"), &universe(&["AMD", "AMX"]));
        assert!(found.is_empty());
    }
}
