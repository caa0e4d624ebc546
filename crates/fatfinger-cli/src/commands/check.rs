use fatfinger_core::{
    edit_distance, DesignCorrelationFilter, KeyboardProximityClassifier, PipelineConfig, Ticker,
};
use serde_json::json;

use crate::cli::CheckArgs;
use crate::error::CliError;
use crate::output::Table;

use super::CommandResult;

/// Runs the three pair classifiers without touching any provider.
pub fn run(args: &CheckArgs, config: &PipelineConfig) -> Result<CommandResult, CliError> {
    let target = Ticker::parse(&args.target)?;
    let candidate = Ticker::parse(&args.candidate)?;

    let distance = edit_distance(target.as_str(), candidate.as_str());
    let proximate =
        KeyboardProximityClassifier::default().is_keyboard_proximate(target.as_str(), candidate.as_str());
    let design_rule = DesignCorrelationFilter::new(config.keywords.clone()).matching_rule(
        target.as_str(),
        candidate.as_str(),
        &args.target_name,
        &args.candidate_name,
    );
    let within_threshold = distance <= config.threshold;
    let is_candidate = target != candidate && within_threshold && design_rule.is_none();

    let mut table = Table::new(&[
        "target_ticker",
        "candidate_ticker",
        "edit_distance",
        "keyboard_proximate",
        "design_rule",
        "is_candidate",
    ]);
    table.push_row(vec![
        target.to_string(),
        candidate.to_string(),
        distance.to_string(),
        proximate.to_string(),
        design_rule.map(|rule| rule.as_str()).unwrap_or_default().to_owned(),
        is_candidate.to_string(),
    ]);

    let data = json!({
        "target_ticker": target,
        "candidate_ticker": candidate,
        "edit_distance": distance,
        "threshold": config.threshold,
        "within_threshold": within_threshold,
        "keyboard_proximate": proximate,
        "design_rule": design_rule,
        "is_candidate": is_candidate,
    });

    Ok(CommandResult::ok(data, Vec::new()).with_table(table))
}
