//! # Fatfinger Core
//!
//! Finds tickers one keystroke away from heavily traded stocks and separates
//! plausible typos from products that sit next to their underlying on purpose.
//!
//! ## Overview
//!
//! - **Domain models** for tickers, securities, bars and candidate pairs
//! - **Provider contracts** for listing files, market data and IPO calendars
//! - **Adapters** for NASDAQ Trader, Yahoo Finance and the NASDAQ IPO calendar
//! - **Candidate pipeline**: matcher, keyboard classifier, design filter,
//!   activity validator and the generator that chains them
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters and in-memory sources |
//! | [`bar_batches`] | Concurrent batched bar fetching |
//! | [`config`] | TOML pipeline configuration |
//! | [`data_source`] | Provider traits and request/response types |
//! | [`design_filter`] | Suppression of intentional product relationships |
//! | [`domain`] | Domain models |
//! | [`error`] | Validation errors |
//! | [`http_client`] | HTTP client abstraction |
//! | [`ipo`] | IPO-targeted candidate study |
//! | [`keyboard`] | QWERTY adjacency and proximity classifier |
//! | [`matcher`] | Bounded Damerau-Levenshtein matching |
//! | [`pipeline`] | Candidate generator state machine |
//! | [`provider_policy`] | Per-provider politeness settings |
//! | [`ranking`] | Top-N target selection by volume |
//! | [`source`] | Provider identifiers |
//! | [`throttling`] | Rate limiting |
//! | [`universe`] | Universe snapshot loading |
//! | [`validator`] | Recent-volume activity check |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fatfinger_core::{
//!     CandidateGenerator, NasdaqTraderAdapter, PipelineConfig, Targets, YahooAdapter,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let generator = CandidateGenerator::new(
//!         Arc::new(NasdaqTraderAdapter::default()),
//!         Arc::new(YahooAdapter::default()),
//!         PipelineConfig::default(),
//!     );
//!
//!     let report = generator.run(Targets::TopVolume { limit: 100 }).await?;
//!     for pair in &report.candidates {
//!         println!("{} -> {}", pair.target_ticker, pair.candidate_ticker);
//!     }
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod bar_batches;
pub mod config;
pub mod data_source;
pub mod design_filter;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod ipo;
pub mod keyboard;
pub mod matcher;
pub mod pipeline;
pub mod provider_policy;
pub mod ranking;
pub mod source;
pub mod throttling;
pub mod universe;
pub mod validator;

pub use adapters::{
    NasdaqIpoAdapter, NasdaqTraderAdapter, StaticIpoCalendar, StaticMarketData, StaticUniverse,
    YahooAdapter,
};
pub use config::{ConfigError, PipelineConfig};
pub use data_source::{
    BarsBatch, BarsBatchRequest, BarsRequest, IpoCalendarSource, ListingFeed, MarketDataSource,
    SourceError, SourceErrorKind, UniverseSource,
};
pub use design_filter::{DesignCorrelationFilter, DesignKeywords, DesignRule};
pub use domain::*;
pub use error::ValidationError;
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use ipo::{IpoStudy, IpoStudyError, IpoStudyReport};
pub use keyboard::{KeyboardLayout, KeyboardProximityClassifier};
pub use matcher::{edit_distance, EditDistanceMatcher};
pub use pipeline::{
    CandidateGenerator, CandidateReport, PipelineError, PipelineStage, RunStats, Targets,
};
pub use provider_policy::ProviderPolicy;
pub use source::ProviderId;
pub use validator::{ActiveTickerValidator, ValidationReport};
