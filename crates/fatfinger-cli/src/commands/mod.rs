mod check;
mod ipo;
mod scan;
mod validate;

use std::sync::Arc;
use std::time::Instant;

use fatfinger_core::adapters::{demo_ipo_calendar, demo_market_data, demo_universe};
use fatfinger_core::{
    HttpClient, IpoCalendarSource, MarketDataSource, NasdaqIpoAdapter, NasdaqTraderAdapter,
    PipelineConfig, ProviderId, ReqwestHttpClient, TypoCandidatePair, UniverseSource,
    YahooAdapter,
};
use serde_json::Value;
use tracing::info;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::{Envelope, EnvelopeError, EnvelopeMeta};
use crate::output::Table;

pub struct CommandResult {
    pub data: Value,
    pub table: Option<Table>,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub source_chain: Vec<ProviderId>,
}

impl CommandResult {
    pub fn ok(data: Value, source_chain: Vec<ProviderId>) -> Self {
        Self {
            data,
            table: None,
            warnings: Vec::new(),
            errors: Vec::new(),
            source_chain,
        }
    }

    /// A run that ended in a reportable failure: no data, one error.
    pub fn failed(code: &str, message: impl Into<String>, source_chain: Vec<ProviderId>) -> Self {
        Self {
            errors: vec![EnvelopeError::new(code, message)],
            ..Self::ok(Value::Null, source_chain)
        }
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.table = Some(table);
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

/// Upstream collaborators for one invocation.
pub struct Providers {
    pub universe: Arc<dyn UniverseSource>,
    pub market_data: Arc<dyn MarketDataSource>,
    pub ipo_calendar: Arc<dyn IpoCalendarSource>,
}

impl Providers {
    pub fn live() -> Self {
        let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
        Self {
            universe: Arc::new(NasdaqTraderAdapter::with_http_client(Arc::clone(&http_client))),
            market_data: Arc::new(YahooAdapter::with_http_client(Arc::clone(&http_client))),
            ipo_calendar: Arc::new(NasdaqIpoAdapter::with_http_client(http_client)),
        }
    }

    pub fn mock() -> Self {
        Self {
            universe: Arc::new(demo_universe()),
            market_data: Arc::new(demo_market_data()),
            ipo_calendar: Arc::new(demo_ipo_calendar()),
        }
    }
}

/// Provider ids in call order, without repeats.
pub fn source_chain(ids: &[ProviderId]) -> Vec<ProviderId> {
    let mut chain = Vec::with_capacity(ids.len());
    for id in ids {
        if !chain.contains(id) {
            chain.push(*id);
        }
    }
    chain
}

pub fn pair_table(pairs: &[TypoCandidatePair]) -> Table {
    let mut table = Table::new(&TypoCandidatePair::COLUMNS);
    for pair in pairs {
        table.push_row(pair_row(pair));
    }
    table
}

pub fn pair_row(pair: &TypoCandidatePair) -> Vec<String> {
    vec![
        pair.target_ticker.to_string(),
        pair.target_name.clone(),
        pair.candidate_ticker.to_string(),
        pair.candidate_name.clone(),
        pair.edit_distance.to_string(),
        pair.keyboard_proximate.to_string(),
    ]
}

pub async fn run(cli: &Cli) -> Result<(Envelope<Value>, Option<Table>), CliError> {
    let started = Instant::now();
    let config = PipelineConfig::load_or_default(cli.config.as_deref())?;
    info!(command = cli.command.name(), mock = cli.mock, "running command");
    let providers = if cli.mock {
        Providers::mock()
    } else {
        Providers::live()
    };

    let result = match &cli.command {
        Command::Scan(args) => scan::run(args, config, &providers).await?,
        Command::Ipo(args) => ipo::run(args, config, &providers).await?,
        Command::Check(args) => check::run(args, &config)?,
        Command::Validate(args) => validate::run(args, &config, &providers).await?,
    };

    let CommandResult {
        data,
        table,
        warnings,
        errors,
        source_chain,
    } = result;

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let mut meta = EnvelopeMeta::new(source_chain, latency_ms);
    for warning in warnings {
        meta.push_warning(warning);
    }

    Ok((Envelope { meta, data, errors }, table))
}
