//! Suppression of pairs that are related by product design rather than by typing.
//!
//! A leveraged ETF on TSLA, a trust holding ether next to an ether ticker, or an
//! issuer's fund wrapper sharing its stem all sit one edit away from their
//! underlying on purpose. Volume moving between them says nothing about typos.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Tickers up to this length only count as a whole word inside a name.
const SHORT_TICKER_LEN: usize = 3;

/// Prefix length two tickers must share for the fund-family rule.
const FAMILY_PREFIX_LEN: usize = 2;

pub const ASSET_KEYWORDS: [&str; 10] = [
    "BITCOIN", "ETHER", "ETHEREUM", "CRYPTO", "GOLD", "SILVER", "OIL", "VIX", "TREASURY", "BOND",
];

pub const FUND_KEYWORDS: [&str; 8] = [
    "ETF", "TRUST", "FUND", "SHARES", "STRATEGY", "ETN", "NOTE", "COIN",
];

/// Keyword lists the filter matches against uppercased names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignKeywords {
    /// Underlying assets; two names mentioning the same one are related.
    pub asset: Vec<String>,
    /// Fund-wrapper words; a candidate carrying one next to a shared ticker
    /// stem is related.
    pub fund: Vec<String>,
}

impl Default for DesignKeywords {
    fn default() -> Self {
        Self {
            asset: ASSET_KEYWORDS.iter().map(|k| (*k).to_owned()).collect(),
            fund: FUND_KEYWORDS.iter().map(|k| (*k).to_owned()).collect(),
        }
    }
}

impl DesignKeywords {
    /// Uppercases every keyword so matching is case-insensitive.
    pub fn normalized(self) -> Self {
        let upper = |list: Vec<String>| {
            list.into_iter()
                .map(|keyword| keyword.trim().to_uppercase())
                .collect()
        };
        Self {
            asset: upper(self.asset),
            fund: upper(self.fund),
        }
    }
}

/// Which rule suppressed a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignRule {
    TickerInCandidateName,
    SharedAssetKeyword,
    FundFamilyPrefix,
}

impl DesignRule {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TickerInCandidateName => "ticker_in_candidate_name",
            Self::SharedAssetKeyword => "shared_asset_keyword",
            Self::FundFamilyPrefix => "fund_family_prefix",
        }
    }
}

/// Heuristic classifier for intentional product relationships.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesignCorrelationFilter {
    keywords: DesignKeywords,
}

impl DesignCorrelationFilter {
    pub fn new(keywords: DesignKeywords) -> Self {
        Self {
            keywords: keywords.normalized(),
        }
    }

    /// `true` means the pair should be dropped as a non-typo relationship.
    pub fn is_correlated_by_design(
        &self,
        target_ticker: &str,
        candidate_ticker: &str,
        target_name: &str,
        candidate_name: &str,
    ) -> bool {
        self.matching_rule(target_ticker, candidate_ticker, target_name, candidate_name)
            .is_some()
    }

    /// The first rule that fires, if any. Rules are independent, so the order
    /// only affects which one gets reported.
    pub fn matching_rule(
        &self,
        target_ticker: &str,
        candidate_ticker: &str,
        target_name: &str,
        candidate_name: &str,
    ) -> Option<DesignRule> {
        let target_ticker = target_ticker.trim().to_uppercase();
        let candidate_ticker = candidate_ticker.trim().to_uppercase();
        let target_name = target_name.to_uppercase();
        let candidate_name = candidate_name.to_uppercase();

        if ticker_in_name(&target_ticker, &candidate_name) {
            return Some(DesignRule::TickerInCandidateName);
        }

        if self.shares_asset_keyword(&target_name, &candidate_name) {
            return Some(DesignRule::SharedAssetKeyword);
        }

        if self.is_fund_family(&target_ticker, &candidate_ticker, &candidate_name) {
            return Some(DesignRule::FundFamilyPrefix);
        }

        None
    }

    fn shares_asset_keyword(&self, target_name: &str, candidate_name: &str) -> bool {
        self.keywords
            .asset
            .iter()
            .any(|keyword| target_name.contains(keyword.as_str()) && candidate_name.contains(keyword.as_str()))
    }

    fn is_fund_family(&self, target_ticker: &str, candidate_ticker: &str, candidate_name: &str) -> bool {
        let is_fund = self
            .keywords
            .fund
            .iter()
            .any(|keyword| candidate_name.contains(keyword.as_str()));

        is_fund
            && target_ticker
                .chars()
                .take(FAMILY_PREFIX_LEN)
                .eq(candidate_ticker.chars().take(FAMILY_PREFIX_LEN))
    }
}

/// Long tickers match as substrings; short ones need word boundaries so that
/// "M" does not match inside "MGM".
fn ticker_in_name(ticker: &str, name: &str) -> bool {
    if ticker.is_empty() {
        return false;
    }

    if ticker.chars().count() > SHORT_TICKER_LEN {
        return name.contains(ticker);
    }

    Regex::new(&format!(r"\b{}\b", regex::escape(ticker)))
        .map(|pattern| pattern.is_match(name))
        .unwrap_or(false)
}
