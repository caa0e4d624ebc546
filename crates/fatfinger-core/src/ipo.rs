//! Typo candidates for freshly listed tickers.
//!
//! An IPO is an event the typo ticker has nothing to do with, which makes it a
//! clean window for spotting misdirected orders. This module only produces the
//! pairs; what happens to their prices afterwards is someone else's problem.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use time::Date;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::data_source::{IpoCalendarSource, MarketDataSource, UniverseSource};
use crate::pipeline::{CandidateGenerator, PipelineError, RunStats, Targets};
use crate::{IpoListing, IpoTypoCandidate, Security, Ticker, ValidationError};

/// Shortest IPO ticker worth matching; one-letter symbols match too much.
pub const IPO_MIN_TARGET_LEN: usize = 2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IpoStudyError {
    #[error(transparent)]
    InvalidRange(#[from] ValidationError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl IpoStudyError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidRange(_) => "ipo.invalid_range",
            Self::Pipeline(error) => error.code(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IpoStudyReport {
    pub ipos: Vec<IpoListing>,
    /// Sorted by IPO date, then target and candidate ticker.
    pub candidates: Vec<IpoTypoCandidate>,
    pub stats: RunStats,
    pub failed_months: usize,
    pub warnings: Vec<String>,
}

/// Runs the candidate pipeline with priced IPOs as targets.
#[derive(Clone)]
pub struct IpoStudy {
    calendar: Arc<dyn IpoCalendarSource>,
    generator: CandidateGenerator,
}

impl IpoStudy {
    /// `config` is used as given except that short targets are rejected and
    /// only keyboard-proximate pairs are kept.
    pub fn new(
        calendar: Arc<dyn IpoCalendarSource>,
        universe_source: Arc<dyn UniverseSource>,
        market_data: Arc<dyn MarketDataSource>,
        config: PipelineConfig,
    ) -> Self {
        let config = PipelineConfig {
            min_target_len: IPO_MIN_TARGET_LEN,
            keyboard_proximate_only: true,
            ..config
        };
        Self {
            calendar,
            generator: CandidateGenerator::new(universe_source, market_data, config),
        }
    }

    /// Priced IPOs for every month of `start_year..=end_year`, in calendar
    /// order. Months that fail are skipped and reported as warnings.
    pub async fn collect_ipos(
        &self,
        start_year: i32,
        end_year: i32,
    ) -> Result<(Vec<IpoListing>, Vec<String>), ValidationError> {
        if start_year > end_year {
            return Err(ValidationError::InvalidYearRange {
                start: start_year,
                end: end_year,
            });
        }

        let mut ipos = Vec::new();
        let mut warnings = Vec::new();
        for year in start_year..=end_year {
            for month in 1..=12_u8 {
                match self.calendar.priced_ipos(year, month).await {
                    Ok(listings) => ipos.extend(listings),
                    Err(error) => {
                        warn!(year, month, error = %error, "ipo calendar month failed");
                        warnings.push(format!("ipo calendar {year}-{month:02} failed: {error}"));
                    }
                }
            }
        }

        info!(ipos = ipos.len(), failed_months = warnings.len(), "ipo calendar collected");
        Ok((ipos, warnings))
    }

    pub async fn run(&self, start_year: i32, end_year: i32) -> Result<IpoStudyReport, IpoStudyError> {
        let (ipos, warnings) = self.collect_ipos(start_year, end_year).await?;
        let mut report = IpoStudyReport {
            failed_months: warnings.len(),
            warnings,
            ..IpoStudyReport::default()
        };

        if ipos.is_empty() {
            report.warnings.push(format!("no priced ipos between {start_year} and {end_year}"));
            return Ok(report);
        }

        let mut dates: BTreeMap<Ticker, Vec<Date>> = BTreeMap::new();
        let mut targets: Vec<Security> = Vec::new();
        for ipo in &ipos {
            let entry = dates.entry(ipo.ticker.clone()).or_default();
            if entry.is_empty() {
                targets.push(ipo.security());
            }
            entry.push(ipo.priced_date);
        }

        let run = match self.generator.run(Targets::Securities(targets)).await {
            Ok(run) => run,
            // Every IPO ticker was too short to match.
            Err(PipelineError::NoTargets) => {
                report.ipos = ipos;
                report.warnings.push(String::from("no ipo ticker long enough to match"));
                return Ok(report);
            }
            Err(error) => return Err(error.into()),
        };

        let mut candidates: Vec<IpoTypoCandidate> = run
            .candidates
            .into_iter()
            .flat_map(|pair| {
                dates
                    .get(&pair.target_ticker)
                    .cloned()
                    .unwrap_or_default()
                    .into_iter()
                    .map(move |ipo_date| IpoTypoCandidate {
                        ipo_date,
                        pair: pair.clone(),
                    })
            })
            .collect();
        candidates.sort_by(|a, b| {
            a.ipo_date
                .cmp(&b.ipo_date)
                .then_with(|| a.pair.target_ticker.cmp(&b.pair.target_ticker))
                .then_with(|| a.pair.candidate_ticker.cmp(&b.pair.candidate_ticker))
        });

        report.ipos = ipos;
        report.candidates = candidates;
        report.stats = run.stats;
        report.warnings.extend(run.warnings);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{StaticIpoCalendar, StaticMarketData, StaticUniverse};
    use time::macros::date;

    fn study(calendar: StaticIpoCalendar) -> IpoStudy {
        let universe = StaticUniverse::from_pairs(&[
            ("ARL", "American Realty Investors"),
            ("ARMK", "Aramark"),
            ("X", "United States Steel"),
            ("Y", "Alleghany"),
        ]);
        let market = StaticMarketData::new()
            .with_daily_volumes("ARL", &[100])
            .with_daily_volumes("ARMK", &[100])
            .with_daily_volumes("Y", &[100]);
        IpoStudy::new(
            Arc::new(calendar),
            Arc::new(universe),
            Arc::new(market),
            PipelineConfig::default(),
        )
    }

    #[tokio::test]
    async fn keeps_only_proximate_pairs_for_ipo_targets() {
        let calendar = StaticIpoCalendar::new().with_ipo("ARM", "Arm Holdings plc", date!(2023 - 09 - 14));

        let report = study(calendar).run(2023, 2023).await.expect("study");

        assert_eq!(report.candidates.len(), 1);
        let found = &report.candidates[0];
        assert_eq!(found.ipo_date, date!(2023 - 09 - 14));
        assert_eq!(found.pair.candidate_ticker.as_str(), "ARL");
        assert_eq!(found.pair.target_name, "Arm Holdings plc");
        assert_eq!(report.stats.filtered_not_proximate, 1);
    }

    #[tokio::test]
    async fn failed_month_is_skipped() {
        let calendar = StaticIpoCalendar::new()
            .with_ipo("ARM", "Arm Holdings plc", date!(2023 - 09 - 14))
            .failing_month(2023, 3);

        let report = study(calendar).run(2023, 2023).await.expect("study");

        assert_eq!(report.failed_months, 1);
        assert_eq!(report.ipos.len(), 1);
        assert_eq!(report.candidates.len(), 1);
    }

    #[tokio::test]
    async fn single_letter_ipo_is_not_a_target() {
        let calendar = StaticIpoCalendar::new().with_ipo("X", "Single Letter Corp", date!(2024 - 02 - 01));

        let report = study(calendar).run(2024, 2024).await.expect("study");

        assert!(report.candidates.is_empty());
        assert_eq!(report.ipos.len(), 1);
    }

    #[tokio::test]
    async fn reversed_year_range_is_rejected() {
        let err = study(StaticIpoCalendar::new()).run(2025, 2024).await.expect_err("must fail");
        assert!(matches!(err, IpoStudyError::InvalidRange(_)));
    }
}
