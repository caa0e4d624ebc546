//! Activity check for candidate tickers.
//!
//! A listing file can lag behind delistings, so a close match may name a symbol
//! nobody can trade. Candidates are kept only when they printed volume in the
//! recent window.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::bar_batches::{fetch_daily_bars, BatchFailure, BatchPlan};
use crate::data_source::MarketDataSource;
use crate::Ticker;

pub const DEFAULT_VALIDATION_WINDOW_DAYS: u32 = 5;
pub const DEFAULT_VALIDATION_BATCH_SIZE: usize = 100;
pub const DEFAULT_MAX_CONCURRENT_BATCHES: usize = 4;

/// Outcome of one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Tickers with strictly positive volume in the window.
    pub active: BTreeSet<Ticker>,
    /// Requested tickers that were not confirmed active, for any reason.
    pub inactive: BTreeSet<Ticker>,
    pub failed_batches: usize,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_active(&self, ticker: &Ticker) -> bool {
        self.active.contains(ticker)
    }
}

/// Confirms that candidate tickers traded recently.
#[derive(Clone)]
pub struct ActiveTickerValidator {
    source: Arc<dyn MarketDataSource>,
    plan: BatchPlan,
}

impl ActiveTickerValidator {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self {
            source,
            plan: BatchPlan {
                batch_size: DEFAULT_VALIDATION_BATCH_SIZE,
                window_days: DEFAULT_VALIDATION_WINDOW_DAYS,
                max_concurrent: DEFAULT_MAX_CONCURRENT_BATCHES,
            },
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.plan.batch_size = batch_size.max(1);
        self
    }

    pub fn with_window_days(mut self, window_days: u32) -> Self {
        self.plan.window_days = window_days;
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.plan.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Returns the subset of `candidates` with nonzero recent volume.
    ///
    /// No data, per-ticker errors and whole-batch failures all drop the
    /// affected tickers; nothing here aborts the pass.
    pub async fn validate(&self, candidates: &BTreeSet<Ticker>) -> ValidationReport {
        let tickers: Vec<Ticker> = candidates.iter().cloned().collect();
        let outcome = fetch_daily_bars(Arc::clone(&self.source), &tickers, self.plan).await;

        let active: BTreeSet<Ticker> = outcome
            .series
            .iter()
            .filter(|series| candidates.contains(&series.ticker) && series.total_volume() > 0)
            .map(|series| series.ticker.clone())
            .collect();
        let inactive: BTreeSet<Ticker> = candidates.difference(&active).cloned().collect();
        let warnings = outcome.failures.iter().map(describe_failure).collect();

        info!(
            requested = candidates.len(),
            active = active.len(),
            failed_batches = outcome.failures.len(),
            "activity validation finished"
        );

        ValidationReport {
            active,
            inactive,
            failed_batches: outcome.failures.len(),
            warnings,
        }
    }
}

fn describe_failure(failure: &BatchFailure) -> String {
    format!(
        "validation batch {} ({} tickers) failed: {}",
        failure.index,
        failure.tickers.len(),
        failure.error
    )
}
