//! End-to-end candidate generation.
//!
//! ```text
//! LOAD_UNIVERSE -> SELECT_TARGETS -> MATCH -> FILTER_DESIGN_CORRELATION
//!     -> CLASSIFY_PROXIMITY -> VALIDATE_ACTIVITY -> EMIT
//! ```
//!
//! The run is linear. Failures while loading the universe or selecting targets
//! abort it; later failures only shrink the output and add warnings.

use std::collections::{BTreeSet, HashSet};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::bar_batches::BatchPlan;
use crate::config::PipelineConfig;
use crate::data_source::{MarketDataSource, UniverseSource};
use crate::design_filter::DesignCorrelationFilter;
use crate::keyboard::{KeyboardLayout, KeyboardProximityClassifier};
use crate::matcher::EditDistanceMatcher;
use crate::ranking::VolumeRanker;
use crate::universe::load_universe;
use crate::validator::ActiveTickerValidator;
use crate::{Security, Ticker, TypoCandidatePair, Universe};

/// Fatal run errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("ticker universe unavailable: all {feeds} listing feeds failed ({detail})")]
    UniverseUnavailable { feeds: usize, detail: String },
    #[error("ticker universe is empty")]
    EmptyUniverse,
    #[error("target selection failed: all {batches} volume batches failed ({detail})")]
    TargetSelection { batches: usize, detail: String },
    #[error("no targets left to match")]
    NoTargets,
}

impl PipelineError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UniverseUnavailable { .. } => "pipeline.universe_unavailable",
            Self::EmptyUniverse => "pipeline.empty_universe",
            Self::TargetSelection { .. } => "pipeline.target_selection",
            Self::NoTargets => "pipeline.no_targets",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    LoadUniverse,
    SelectTargets,
    Match,
    FilterDesignCorrelation,
    ClassifyProximity,
    ValidateActivity,
    Emit,
}

impl PipelineStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LoadUniverse => "load_universe",
            Self::SelectTargets => "select_targets",
            Self::Match => "match",
            Self::FilterDesignCorrelation => "filter_design_correlation",
            Self::ClassifyProximity => "classify_proximity",
            Self::ValidateActivity => "validate_activity",
            Self::Emit => "emit",
        }
    }
}

impl Display for PipelineStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How targets are chosen from (or alongside) the universe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Targets {
    /// The `limit` most traded universe tickers.
    TopVolume { limit: usize },
    /// Explicit tickers, named from the universe when listed there.
    Tickers(Vec<Ticker>),
    /// Explicit securities that carry their own names.
    Securities(Vec<Security>),
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub universe_size: usize,
    pub targets: usize,
    pub rejected_targets: usize,
    pub matches: usize,
    pub suppressed_by_design: usize,
    pub filtered_not_proximate: usize,
    pub validated_tickers: usize,
    pub inactive_dropped: usize,
    pub failed_validation_batches: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CandidateReport {
    /// Sorted by target ticker, then candidate ticker.
    pub candidates: Vec<TypoCandidatePair>,
    pub stats: RunStats,
    pub warnings: Vec<String>,
}

/// Orchestrates matching, suppression, tagging and validation.
#[derive(Clone)]
pub struct CandidateGenerator {
    universe_source: Arc<dyn UniverseSource>,
    market_data: Arc<dyn MarketDataSource>,
    matcher: EditDistanceMatcher,
    classifier: KeyboardProximityClassifier,
    filter: DesignCorrelationFilter,
    config: PipelineConfig,
}

impl CandidateGenerator {
    pub fn new(
        universe_source: Arc<dyn UniverseSource>,
        market_data: Arc<dyn MarketDataSource>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            universe_source,
            market_data,
            matcher: EditDistanceMatcher::new(config.threshold),
            classifier: KeyboardProximityClassifier::new(KeyboardLayout::qwerty()),
            filter: DesignCorrelationFilter::new(config.keywords.clone()),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn run(&self, targets: Targets) -> Result<CandidateReport, PipelineError> {
        let mut report = CandidateReport::default();

        log_stage(PipelineStage::LoadUniverse);
        let loaded = load_universe(self.universe_source.as_ref()).await?;
        report.warnings.extend(loaded.warnings);
        let universe = loaded.universe;
        report.stats.universe_size = universe.len();

        log_stage(PipelineStage::SelectTargets);
        let targets = self.select_targets(&universe, targets, &mut report).await?;
        report.stats.targets = targets.len();
        info!(targets = targets.len(), rejected = report.stats.rejected_targets, "targets selected");

        log_stage(PipelineStage::Match);
        let matched: Vec<(Security, Security, usize)> = targets
            .iter()
            .flat_map(|target| {
                self.matcher
                    .find_matches(target, &universe)
                    .into_iter()
                    .filter_map(|found| {
                        universe
                            .get(&found.ticker)
                            .map(|candidate| (target.clone(), candidate.clone(), found.distance))
                    })
            })
            .collect();
        report.stats.matches = matched.len();

        log_stage(PipelineStage::FilterDesignCorrelation);
        let kept: Vec<(Security, Security, usize)> = matched
            .into_iter()
            .filter(|(target, candidate, _)| {
                let suppressed = self.filter.is_correlated_by_design(
                    target.ticker.as_str(),
                    candidate.ticker.as_str(),
                    &target.name,
                    &candidate.name,
                );
                if suppressed {
                    debug!(target = %target.ticker, candidate = %candidate.ticker, "suppressed by design");
                }
                !suppressed
            })
            .collect();
        report.stats.suppressed_by_design = report.stats.matches - kept.len();

        log_stage(PipelineStage::ClassifyProximity);
        let mut pairs: Vec<TypoCandidatePair> = kept
            .iter()
            .map(|(target, candidate, distance)| {
                let proximate = self
                    .classifier
                    .is_keyboard_proximate(target.ticker.as_str(), candidate.ticker.as_str());
                TypoCandidatePair::new(target, candidate, *distance, proximate)
            })
            .collect();
        if self.config.keyboard_proximate_only {
            let before = pairs.len();
            pairs.retain(|pair| pair.keyboard_proximate);
            report.stats.filtered_not_proximate = before - pairs.len();
        }

        if self.config.validate_activity {
            log_stage(PipelineStage::ValidateActivity);
            let candidates: BTreeSet<Ticker> =
                pairs.iter().map(|pair| pair.candidate_ticker.clone()).collect();
            let validation = self.validator().validate(&candidates).await;

            let before = pairs.len();
            pairs.retain(|pair| validation.is_active(&pair.candidate_ticker));
            report.stats.validated_tickers = validation.active.len();
            report.stats.inactive_dropped = before - pairs.len();
            report.stats.failed_validation_batches = validation.failed_batches;
            report.warnings.extend(validation.warnings);
        } else {
            debug!("activity validation disabled");
        }

        log_stage(PipelineStage::Emit);
        pairs.sort_by(|a, b| {
            a.target_ticker
                .cmp(&b.target_ticker)
                .then_with(|| a.candidate_ticker.cmp(&b.candidate_ticker))
        });
        info!(candidates = pairs.len(), warnings = report.warnings.len(), "candidate run finished");
        report.candidates = pairs;

        Ok(report)
    }

    async fn select_targets(
        &self,
        universe: &Universe,
        targets: Targets,
        report: &mut CandidateReport,
    ) -> Result<Vec<Security>, PipelineError> {
        let selected: Vec<Security> = match targets {
            Targets::TopVolume { limit } => {
                let tickers: Vec<Ticker> = universe.tickers().cloned().collect();
                let ranking = self.ranker().top_by_volume(&tickers, limit).await;

                if ranking.all_batches_failed() {
                    let detail = ranking
                        .failures
                        .first()
                        .map(|failure| failure.error.to_string())
                        .unwrap_or_default();
                    return Err(PipelineError::TargetSelection {
                        batches: ranking.batches,
                        detail,
                    });
                }
                report.warnings.extend(ranking.failures.iter().map(|failure| {
                    format!(
                        "ranking batch {} ({} tickers) failed: {}",
                        failure.index,
                        failure.tickers.len(),
                        failure.error
                    )
                }));

                ranking
                    .top
                    .into_iter()
                    .filter_map(|ranked| universe.get(&ranked.ticker).cloned())
                    .collect()
            }
            Targets::Tickers(tickers) => tickers
                .into_iter()
                .map(|ticker| {
                    let name = universe.name_of(&ticker).to_owned();
                    Security::new(ticker, name)
                })
                .collect(),
            Targets::Securities(securities) => securities,
        };

        let mut seen = HashSet::new();
        let mut accepted = Vec::with_capacity(selected.len());
        for target in selected {
            if !seen.insert(target.ticker.clone()) {
                continue;
            }
            if target.ticker.len() < self.config.min_target_len {
                debug!(target = %target.ticker, min = self.config.min_target_len, "target rejected");
                report.stats.rejected_targets += 1;
                continue;
            }
            accepted.push(target);
        }

        if accepted.is_empty() {
            return Err(PipelineError::NoTargets);
        }
        Ok(accepted)
    }

    fn ranker(&self) -> VolumeRanker {
        VolumeRanker::new(
            Arc::clone(&self.market_data),
            BatchPlan {
                batch_size: self.config.ranking_batch_size,
                window_days: self.config.ranking_window_days,
                max_concurrent: self.config.max_concurrent_batches,
            },
        )
    }

    fn validator(&self) -> ActiveTickerValidator {
        ActiveTickerValidator::new(Arc::clone(&self.market_data))
            .with_batch_size(self.config.validation_batch_size)
            .with_window_days(self.config.validation_window_days)
            .with_max_concurrent(self.config.max_concurrent_batches)
    }
}

fn log_stage(stage: PipelineStage) {
    info!(stage = stage.as_str(), "pipeline stage");
}
