use fatfinger_core::{CandidateGenerator, PipelineConfig, Targets, Ticker};
use serde_json::json;

use crate::cli::ScanArgs;
use crate::error::CliError;

use super::{pair_table, source_chain, CommandResult, Providers};

pub async fn run(
    args: &ScanArgs,
    mut config: PipelineConfig,
    providers: &Providers,
) -> Result<CommandResult, CliError> {
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(top) = args.top {
        if top == 0 {
            return Err(CliError::Command(String::from("--top must be greater than zero")));
        }
        config.top_n = top;
    }
    if args.proximate_only {
        config.keyboard_proximate_only = true;
    }
    if args.skip_validation {
        config.validate_activity = false;
    }
    config.validate()?;

    let targets = if args.targets.is_empty() {
        Targets::TopVolume {
            limit: config.top_n,
        }
    } else {
        let tickers = args
            .targets
            .iter()
            .map(|raw| Ticker::parse(raw))
            .collect::<Result<Vec<_>, _>>()?;
        Targets::Tickers(tickers)
    };

    let chain = source_chain(&[providers.universe.id(), providers.market_data.id()]);
    let generator = CandidateGenerator::new(
        providers.universe.clone(),
        providers.market_data.clone(),
        config,
    );

    match generator.run(targets).await {
        Ok(report) => {
            let table = pair_table(&report.candidates);
            let data = json!({
                "candidates": report.candidates,
                "stats": report.stats,
            });
            Ok(CommandResult::ok(data, chain)
                .with_table(table)
                .with_warnings(report.warnings))
        }
        Err(error) => Ok(CommandResult::failed(error.code(), error.to_string(), chain)),
    }
}
