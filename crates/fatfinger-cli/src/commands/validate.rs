use std::collections::BTreeSet;

use fatfinger_core::{ActiveTickerValidator, PipelineConfig, Ticker};
use serde_json::json;

use crate::cli::ValidateArgs;
use crate::error::CliError;
use crate::output::Table;

use super::{CommandResult, Providers};

pub async fn run(
    args: &ValidateArgs,
    config: &PipelineConfig,
    providers: &Providers,
) -> Result<CommandResult, CliError> {
    let tickers = args
        .tickers
        .iter()
        .map(|raw| Ticker::parse(raw))
        .collect::<Result<BTreeSet<_>, _>>()?;

    let validator = ActiveTickerValidator::new(providers.market_data.clone())
        .with_batch_size(config.validation_batch_size)
        .with_window_days(config.validation_window_days)
        .with_max_concurrent(config.max_concurrent_batches);
    let report = validator.validate(&tickers).await;

    let mut table = Table::new(&["ticker", "active"]);
    for ticker in &tickers {
        table.push_row(vec![ticker.to_string(), report.is_active(ticker).to_string()]);
    }

    let data = json!({
        "active": report.active,
        "inactive": report.inactive,
        "failed_batches": report.failed_batches,
    });

    Ok(CommandResult::ok(data, vec![providers.market_data.id()])
        .with_table(table)
        .with_warnings(report.warnings))
}
