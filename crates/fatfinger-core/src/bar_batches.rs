//! Concurrent batch fetching of recent daily bars.
//!
//! Both target ranking and activity validation walk a ticker list in fixed-size
//! groups. Groups share no state, so they run as independent tasks bounded by a
//! semaphore, and one group failing leaves the others untouched.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::data_source::{BarsBatchRequest, MarketDataSource, SourceError};
use crate::{BarSeries, Interval, Ticker};

/// Shape of one batched fetch pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlan {
    pub batch_size: usize,
    pub window_days: u32,
    pub max_concurrent: usize,
}

/// A group whose fetch failed as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    pub index: usize,
    pub tickers: Vec<Ticker>,
    pub error: SourceError,
}

/// Merged result of every group in a pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub batches: usize,
    pub series: Vec<BarSeries>,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn all_failed(&self) -> bool {
        self.batches > 0 && self.failures.len() == self.batches
    }
}

/// Fetches `window_days` of daily bars for every ticker, `batch_size` at a time.
///
/// Series come back sorted by ticker and failures by batch index, regardless of
/// the order in which tasks finished.
pub async fn fetch_daily_bars(
    source: Arc<dyn MarketDataSource>,
    tickers: &[Ticker],
    plan: BatchPlan,
) -> BatchOutcome {
    let chunks: Vec<Vec<Ticker>> = tickers
        .chunks(plan.batch_size.max(1))
        .map(<[Ticker]>::to_vec)
        .collect();
    let permits = Arc::new(Semaphore::new(plan.max_concurrent.max(1)));
    let mut tasks = JoinSet::new();

    for (index, chunk) in chunks.iter().cloned().enumerate() {
        let source = Arc::clone(&source);
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await;
            let result = match BarsBatchRequest::new(chunk, Interval::OneDay, plan.window_days) {
                Ok(request) => source.bars_batch(request).await,
                Err(error) => Err(error),
            };
            (index, result)
        });
    }

    let mut outcome = BatchOutcome {
        batches: chunks.len(),
        ..BatchOutcome::default()
    };
    let mut reported = vec![false; chunks.len()];

    while let Some(joined) = tasks.join_next().await {
        let (index, result) = match joined {
            Ok(done) => done,
            Err(error) => {
                warn!(error = %error, "bar batch task aborted");
                continue;
            }
        };
        reported[index] = true;

        match result {
            Ok(batch) => {
                for (ticker, error) in &batch.failures {
                    debug!(ticker = %ticker, error = %error, "ticker dropped from batch");
                }
                outcome.series.extend(batch.series);
            }
            Err(error) => {
                warn!(batch = index, size = chunks[index].len(), error = %error, "bar batch failed");
                outcome.failures.push(BatchFailure {
                    index,
                    tickers: chunks[index].clone(),
                    error,
                });
            }
        }
    }

    // Aborted tasks never report back; count their groups as failed.
    for (index, chunk) in chunks.into_iter().enumerate() {
        if !reported[index] {
            outcome.failures.push(BatchFailure {
                index,
                tickers: chunk,
                error: SourceError::internal("bar batch task aborted"),
            });
        }
    }

    outcome.series.sort_by(|a, b| a.ticker.cmp(&b.ticker));
    outcome.failures.sort_by_key(|failure| failure.index);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::StaticMarketData;

    fn tickers(values: &[&str]) -> Vec<Ticker> {
        values
            .iter()
            .map(|value| Ticker::parse(value).expect("ticker"))
            .collect()
    }

    fn plan(batch_size: usize) -> BatchPlan {
        BatchPlan {
            batch_size,
            window_days: 5,
            max_concurrent: 2,
        }
    }

    #[tokio::test]
    async fn splits_into_batches_and_sorts_series() {
        let source = StaticMarketData::new()
            .with_daily_volumes("MSFT", &[10, 20])
            .with_daily_volumes("AAPL", &[5])
            .with_daily_volumes("TSLA", &[7]);

        let outcome = fetch_daily_bars(Arc::new(source), &tickers(&["TSLA", "MSFT", "AAPL"]), plan(2)).await;

        assert_eq!(outcome.batches, 2);
        assert!(outcome.failures.is_empty());
        let order: Vec<&str> = outcome.series.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(order, vec!["AAPL", "MSFT", "TSLA"]);
    }

    #[tokio::test]
    async fn failed_batch_does_not_cancel_siblings() {
        let source = StaticMarketData::new()
            .with_daily_volumes("AAA", &[1])
            .with_daily_volumes("BBB", &[1])
            .with_daily_volumes("CCC", &[1])
            .failing_for("AAA")
            .failing_for("BBB");

        let outcome = fetch_daily_bars(Arc::new(source), &tickers(&["AAA", "BBB", "CCC"]), plan(2)).await;

        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].index, 0);
        assert_eq!(outcome.failures[0].tickers, tickers(&["AAA", "BBB"]));
        assert_eq!(outcome.series.len(), 1);
        assert!(!outcome.all_failed());
    }

    #[tokio::test]
    async fn empty_ticker_list_runs_no_batches() {
        let outcome = fetch_daily_bars(Arc::new(StaticMarketData::new()), &[], plan(10)).await;
        assert_eq!(outcome.batches, 0);
        assert!(!outcome.all_failed());
    }
}
