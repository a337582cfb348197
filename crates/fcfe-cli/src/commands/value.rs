use std::time::Duration;

use fcfe_core::{
    AggregateReport, ExecutionMode, ReportStatus, Ticker, ValuationOrchestrator, ValuationSettings,
};

use crate::cli::ValueArgs;
use crate::error::CliError;
use crate::snapshot;

use super::{apply_model_flags, CommandOutput, CommandResult};

pub async fn run(args: &ValueArgs) -> Result<CommandResult, CliError> {
    let ticker = Ticker::parse(&args.ticker)?;
    let settings = apply_flags(args, ValuationSettings::from_env()?);

    let path = args
        .snapshot
        .clone()
        .unwrap_or_else(|| snapshot::default_path(&ticker));
    let snapshot = snapshot::load(&path)?;
    let current_price = args.model.price.unwrap_or(snapshot.current_price);

    let orchestrator = snapshot
        .adapters()
        .into_iter()
        .fold(
            ValuationOrchestrator::builder().with_settings(&settings),
            |builder, adapter| builder.with_source(adapter),
        )
        .build()?;

    let report = orchestrator
        .run(
            &ticker,
            snapshot.company_name.clone(),
            current_price,
            &settings.assumptions(),
        )
        .await?;

    let warnings = report_warnings(&report);
    Ok(CommandResult::ok(CommandOutput::Valuation(report)).with_warnings(warnings))
}

fn apply_flags(args: &ValueArgs, settings: ValuationSettings) -> ValuationSettings {
    let mut settings = apply_model_flags(&args.model, settings);
    if let Some(growth) = args.growth {
        settings = settings.with_growth_rate(growth);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        settings = settings.with_source_timeout(Duration::from_millis(timeout_ms));
    }
    if args.concurrent {
        settings = settings.with_mode(ExecutionMode::Concurrent);
    }
    settings
}

fn report_warnings(report: &AggregateReport) -> Vec<String> {
    let mut warnings = report
        .failures
        .iter()
        .map(|failure| {
            if failure.detail.is_empty() {
                format!("source '{}' failed: {}", failure.source_name, failure.reason)
            } else {
                format!(
                    "source '{}' failed: {} ({})",
                    failure.source_name, failure.reason, failure.detail
                )
            }
        })
        .collect::<Vec<_>>();

    match report.status() {
        ReportStatus::Complete => {}
        ReportStatus::Partial => warnings.push(format!(
            "averages exclude {} failed source(s) of {}",
            report.failures.len(),
            report.sources_attempted()
        )),
        ReportStatus::Unavailable => {
            warnings.push(String::from("no source produced a valuation"));
        }
    }
    warnings
}
