//! Top-N target selection by recent mean volume.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::bar_batches::{fetch_daily_bars, BatchFailure, BatchPlan};
use crate::data_source::MarketDataSource;
use crate::Ticker;

pub const DEFAULT_TOP_N: usize = 100;
pub const DEFAULT_RANKING_WINDOW_DAYS: u32 = 5;
pub const DEFAULT_RANKING_BATCH_SIZE: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTicker {
    pub ticker: Ticker,
    pub mean_volume: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeRanking {
    /// Highest mean volume first.
    pub top: Vec<RankedTicker>,
    pub batches: usize,
    pub failures: Vec<BatchFailure>,
}

impl VolumeRanking {
    pub fn all_batches_failed(&self) -> bool {
        self.batches > 0 && self.failures.len() == self.batches
    }
}

/// Ranks a ticker list by mean daily volume over a short window.
#[derive(Clone)]
pub struct VolumeRanker {
    source: Arc<dyn MarketDataSource>,
    plan: BatchPlan,
}

impl VolumeRanker {
    pub fn new(source: Arc<dyn MarketDataSource>, plan: BatchPlan) -> Self {
        Self { source, plan }
    }

    pub fn with_defaults(source: Arc<dyn MarketDataSource>) -> Self {
        Self::new(
            source,
            BatchPlan {
                batch_size: DEFAULT_RANKING_BATCH_SIZE,
                window_days: DEFAULT_RANKING_WINDOW_DAYS,
                max_concurrent: crate::validator::DEFAULT_MAX_CONCURRENT_BATCHES,
            },
        )
    }

    /// The `limit` most traded tickers. Ties are broken by ticker so the
    /// selection is stable across runs.
    pub async fn top_by_volume(&self, tickers: &[Ticker], limit: usize) -> VolumeRanking {
        let outcome = fetch_daily_bars(Arc::clone(&self.source), tickers, self.plan).await;

        let mut ranked: Vec<RankedTicker> = outcome
            .series
            .iter()
            .filter_map(|series| {
                series.mean_volume().map(|mean_volume| RankedTicker {
                    ticker: series.ticker.clone(),
                    mean_volume,
                })
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.mean_volume
                .partial_cmp(&a.mean_volume)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.ticker.cmp(&b.ticker))
        });
        ranked.truncate(limit);

        info!(
            ranked = ranked.len(),
            batches = outcome.batches,
            failed_batches = outcome.failures.len(),
            "volume ranking finished"
        );

        VolumeRanking {
            top: ranked,
            batches: outcome.batches,
            failures: outcome.failures,
        }
    }
}
