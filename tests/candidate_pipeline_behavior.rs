//! Behavior-driven tests for candidate generation.
//!
//! These tests run the whole pipeline against in-memory providers and check
//! what ends up in the report: which pairs survive, how they are tagged, and
//! which failures abort the run.

use std::sync::Arc;

use fatfinger_core::data_source::ListingFeed;
use fatfinger_core::{
    CandidateGenerator, CandidateReport, IpoStudy, PipelineConfig, PipelineError,
    StaticIpoCalendar, StaticMarketData, StaticUniverse, Targets, Ticker,
};
use time::macros::date;

fn ticker(value: &str) -> Ticker {
    Ticker::parse(value).expect("ticker")
}

fn tesla_universe() -> StaticUniverse {
    StaticUniverse::from_pairs(&[
        ("TSLA", "Tesla Inc"),
        ("TSLL", "Direxion Daily TSLA Bull 2X Shares"),
        ("TALA", "Taland Corp"),
    ])
}

fn active_market() -> StaticMarketData {
    StaticMarketData::new()
        .with_daily_volumes("TSLA", &[90_000_000; 5])
        .with_daily_volumes("TSLL", &[20_000_000; 5])
        .with_daily_volumes("TALA", &[1_000; 5])
}

async fn run(
    universe: StaticUniverse,
    market: StaticMarketData,
    config: PipelineConfig,
    targets: Targets,
) -> Result<CandidateReport, PipelineError> {
    CandidateGenerator::new(Arc::new(universe), Arc::new(market), config)
        .run(targets)
        .await
}

fn pairs(report: &CandidateReport) -> Vec<(String, String)> {
    report
        .candidates
        .iter()
        .map(|pair| (pair.target_ticker.to_string(), pair.candidate_ticker.to_string()))
        .collect()
}

// =============================================================================
// Candidate generation: the Tesla scenario
// =============================================================================

#[tokio::test]
async fn when_leveraged_fund_names_its_underlying_only_the_accidental_neighbour_survives() {
    // Given: TSLA, its 2x fund TSLL and an unrelated TALA
    let universe = tesla_universe();

    // When: TSLA is the target at threshold 1
    let report = run(
        universe,
        active_market(),
        PipelineConfig::default(),
        Targets::Tickers(vec![ticker("TSLA")]),
    )
    .await
    .expect("run");

    // Then: both are matched, TSLL is suppressed, TALA is kept as proximate
    assert_eq!(report.stats.matches, 2);
    assert_eq!(report.stats.suppressed_by_design, 1);
    assert_eq!(pairs(&report), vec![("TSLA".to_owned(), "TALA".to_owned())]);
    let pair = &report.candidates[0];
    assert_eq!(pair.edit_distance, 1);
    assert!(pair.keyboard_proximate);
    assert_eq!(pair.candidate_name, "Taland Corp");
}

#[tokio::test]
async fn when_top_volume_selects_targets_the_run_starts_from_the_most_traded_ticker() {
    // Given: TSLA trades far more than the rest
    // When: only one target is requested
    let report = run(
        tesla_universe(),
        active_market(),
        PipelineConfig::default(),
        Targets::TopVolume { limit: 1 },
    )
    .await
    .expect("run");

    // Then
    assert_eq!(report.stats.targets, 1);
    assert_eq!(pairs(&report), vec![("TSLA".to_owned(), "TALA".to_owned())]);
}

#[tokio::test]
async fn when_the_pipeline_runs_twice_the_output_is_identical() {
    let first = run(
        tesla_universe(),
        active_market(),
        PipelineConfig::default(),
        Targets::TopVolume { limit: 3 },
    )
    .await
    .expect("first run");
    let second = run(
        tesla_universe(),
        active_market(),
        PipelineConfig::default(),
        Targets::TopVolume { limit: 3 },
    )
    .await
    .expect("second run");

    assert_eq!(first, second);
}

// =============================================================================
// Candidate generation: tagging and filtering
// =============================================================================

#[tokio::test]
async fn when_the_typo_is_an_insertion_the_pair_is_kept_but_not_proximate() {
    // Given: a candidate one character longer than the target
    let universe = StaticUniverse::from_pairs(&[("AMD", "Advanced Micro Devices"), ("AMDX", "Amdex Holdings")]);
    let market = StaticMarketData::new().with_daily_volumes("AMDX", &[10]);

    // When
    let report = run(
        universe,
        market,
        PipelineConfig::default(),
        Targets::Tickers(vec![ticker("AMD")]),
    )
    .await
    .expect("run");

    // Then
    assert_eq!(report.candidates.len(), 1);
    assert!(!report.candidates[0].keyboard_proximate);
}

#[tokio::test]
async fn when_proximate_only_is_set_non_adjacent_substitutions_are_dropped() {
    // Given: AAPL next to APPL (A->P, not adjacent) and AAOL (P->O, adjacent)
    let universe = StaticUniverse::from_pairs(&[
        ("AAPL", "Apple Inc"),
        ("APPL", "Appleton Holdings"),
        ("AAOL", "Aaol Ventures"),
    ]);
    let market = StaticMarketData::new()
        .with_daily_volumes("APPL", &[10])
        .with_daily_volumes("AAOL", &[10]);
    let config = PipelineConfig {
        keyboard_proximate_only: true,
        ..PipelineConfig::default()
    };

    // When
    let report = run(universe, market, config, Targets::Tickers(vec![ticker("AAPL")]))
        .await
        .expect("run");

    // Then
    assert_eq!(pairs(&report), vec![("AAPL".to_owned(), "AAOL".to_owned())]);
    assert_eq!(report.stats.filtered_not_proximate, 1);
}

#[tokio::test]
async fn when_a_candidate_has_no_recent_volume_it_is_dropped() {
    // Given: TALA has stopped trading
    let market = StaticMarketData::new()
        .with_daily_volumes("TSLA", &[100])
        .with_daily_volumes("TALA", &[0, 0, 0]);

    // When
    let report = run(
        tesla_universe(),
        market,
        PipelineConfig::default(),
        Targets::Tickers(vec![ticker("TSLA")]),
    )
    .await
    .expect("run");

    // Then
    assert!(report.candidates.is_empty());
    assert_eq!(report.stats.inactive_dropped, 1);
}

#[tokio::test]
async fn when_one_validation_batch_fails_other_batches_still_count() {
    // Given: three candidates validated one per batch, one of them unreachable
    let universe = StaticUniverse::from_pairs(&[
        ("ABC", "Target Co"),
        ("ABD", "First Neighbour"),
        ("ABE", "Second Neighbour"),
        ("ABF", "Third Neighbour"),
    ]);
    let market = StaticMarketData::new()
        .with_daily_volumes("ABD", &[10])
        .with_daily_volumes("ABE", &[10])
        .with_daily_volumes("ABF", &[10])
        .failing_for("ABE");
    let config = PipelineConfig {
        validation_batch_size: 1,
        ..PipelineConfig::default()
    };

    // When
    let report = run(universe, market, config, Targets::Tickers(vec![ticker("ABC")]))
        .await
        .expect("run");

    // Then
    assert_eq!(
        pairs(&report),
        vec![
            ("ABC".to_owned(), "ABD".to_owned()),
            ("ABC".to_owned(), "ABF".to_owned())
        ]
    );
    assert_eq!(report.stats.failed_validation_batches, 1);
    assert_eq!(report.warnings.len(), 1);
}

// =============================================================================
// Candidate generation: fatal and degraded providers
// =============================================================================

#[tokio::test]
async fn when_one_listing_feed_fails_the_run_continues_with_a_warning() {
    // Given
    let universe = tesla_universe().failing_feed(ListingFeed::Other);

    // When
    let report = run(
        universe,
        active_market(),
        PipelineConfig::default(),
        Targets::Tickers(vec![ticker("TSLA")]),
    )
    .await
    .expect("partial universe is enough");

    // Then
    assert_eq!(report.stats.universe_size, 3);
    assert!(report.warnings.iter().any(|warning| warning.contains("other")));
}

#[tokio::test]
async fn when_every_listing_feed_fails_the_run_aborts() {
    let universe = StaticUniverse::new()
        .failing_feed(ListingFeed::Nasdaq)
        .failing_feed(ListingFeed::Other);

    let err = run(
        universe,
        active_market(),
        PipelineConfig::default(),
        Targets::TopVolume { limit: 10 },
    )
    .await
    .expect_err("must fail");

    assert!(matches!(err, PipelineError::UniverseUnavailable { .. }));
}

#[tokio::test]
async fn when_every_ranking_batch_fails_target_selection_aborts() {
    // Given: market data is down for every universe ticker
    let market = StaticMarketData::new()
        .failing_for("TSLA")
        .failing_for("TSLL")
        .failing_for("TALA");

    // When
    let err = run(
        tesla_universe(),
        market,
        PipelineConfig::default(),
        Targets::TopVolume { limit: 10 },
    )
    .await
    .expect_err("must fail");

    // Then
    assert!(matches!(err, PipelineError::TargetSelection { batches: 1, .. }));
}

#[tokio::test]
async fn when_no_ticker_has_volume_there_are_no_targets() {
    let err = run(
        tesla_universe(),
        StaticMarketData::new(),
        PipelineConfig::default(),
        Targets::TopVolume { limit: 10 },
    )
    .await
    .expect_err("must fail");

    assert_eq!(err, PipelineError::NoTargets);
}

// =============================================================================
// IPO study
// =============================================================================

#[tokio::test]
async fn when_an_ipo_has_a_proximate_neighbour_the_pair_carries_the_ipo_date() {
    // Given: a priced IPO whose ticker sits one key away from a listed one,
    // plus a one-letter IPO that is too short to match
    let calendar = StaticIpoCalendar::new()
        .with_ipo("RDDT", "Reddit Inc", date!(2024 - 03 - 21))
        .with_ipo("X", "Single Letter Corp", date!(2024 - 05 - 02))
        .failing_month(2024, 11);
    let universe = StaticUniverse::from_pairs(&[
        ("RDDT", "Reddit Inc"),
        ("RDDY", "Ready Made Holdings"),
        ("RDXT", "Rodex Technologies"),
        ("X", "Single Letter Corp"),
    ]);
    let market = StaticMarketData::new()
        .with_daily_volumes("RDDY", &[100])
        .with_daily_volumes("RDXT", &[100]);
    let study = IpoStudy::new(
        Arc::new(calendar),
        Arc::new(universe),
        Arc::new(market),
        PipelineConfig::default(),
    );

    // When
    let report = study.run(2024, 2024).await.expect("study");

    // Then: RDDY (T->Y, adjacent) is kept, RDXT (D->X, adjacent) too,
    // the failing month is reported and X never becomes a target
    assert_eq!(report.ipos.len(), 2);
    assert_eq!(report.failed_months, 1);
    assert_eq!(report.stats.targets, 1);
    assert_eq!(report.stats.rejected_targets, 1);
    let found: Vec<(String, String)> = report
        .candidates
        .iter()
        .map(|c| (c.ipo_date.to_string(), c.pair.candidate_ticker.to_string()))
        .collect();
    assert_eq!(
        found,
        vec![
            ("2024-03-21".to_owned(), "RDDY".to_owned()),
            ("2024-03-21".to_owned(), "RDXT".to_owned())
        ]
    );
}

#[tokio::test]
async fn when_no_ipos_were_priced_the_study_is_empty_but_succeeds() {
    let study = IpoStudy::new(
        Arc::new(StaticIpoCalendar::new()),
        Arc::new(tesla_universe()),
        Arc::new(active_market()),
        PipelineConfig::default(),
    );

    let report = study.run(2023, 2023).await.expect("study");

    assert!(report.ipos.is_empty());
    assert!(report.candidates.is_empty());
    assert_eq!(report.warnings.len(), 1);
}
