use fatfinger_core::{IpoStudy, IpoStudyError, PipelineConfig, TypoCandidatePair};
use serde_json::json;
use time::OffsetDateTime;

use crate::cli::IpoArgs;
use crate::error::CliError;
use crate::output::Table;

use super::{pair_row, source_chain, CommandResult, Providers};

pub async fn run(
    args: &IpoArgs,
    config: PipelineConfig,
    providers: &Providers,
) -> Result<CommandResult, CliError> {
    let this_year = OffsetDateTime::now_utc().year();
    let start_year = args.start_year.unwrap_or(this_year - 1);
    let end_year = args.end_year.unwrap_or(this_year);

    let chain = source_chain(&[
        providers.ipo_calendar.id(),
        providers.universe.id(),
        providers.market_data.id(),
    ]);
    let study = IpoStudy::new(
        providers.ipo_calendar.clone(),
        providers.universe.clone(),
        providers.market_data.clone(),
        config,
    );

    let report = match study.run(start_year, end_year).await {
        Ok(report) => report,
        Err(IpoStudyError::InvalidRange(error)) => return Err(error.into()),
        Err(error @ IpoStudyError::Pipeline(_)) => {
            return Ok(CommandResult::failed(error.code(), error.to_string(), chain));
        }
    };

    let mut columns = vec!["ipo_date"];
    columns.extend(TypoCandidatePair::COLUMNS);
    let mut table = Table::new(&columns);
    for candidate in &report.candidates {
        let mut row = vec![candidate.ipo_date.to_string()];
        row.extend(pair_row(&candidate.pair));
        table.push_row(row);
    }

    let data = json!({
        "start_year": start_year,
        "end_year": end_year,
        "ipo_count": report.ipos.len(),
        "failed_months": report.failed_months,
        "candidates": report.candidates,
        "stats": report.stats,
    });

    Ok(CommandResult::ok(data, chain)
        .with_table(table)
        .with_warnings(report.warnings))
}
