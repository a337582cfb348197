use std::io::{self, Write};

use fcfe_core::{AggregateReport, SensitivityPoint, SensitivityReport};

use crate::cli::OutputFormat;
use crate::commands::CommandOutput;
use crate::error::CliError;
use crate::metadata::Envelope;

const UNAVAILABLE: &str = "unavailable";

pub fn render(
    envelope: &Envelope<CommandOutput>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Table => render_table(&mut out, envelope)?,
    }
    Ok(())
}

fn render_table(out: &mut impl Write, envelope: &Envelope<CommandOutput>) -> io::Result<()> {
    writeln!(out, "request_id  : {}", envelope.meta.request_id)?;
    writeln!(out, "trace_id    : {}", envelope.meta.trace_id)?;
    writeln!(out, "schema      : {}", envelope.meta.schema_version)?;
    writeln!(out, "latency_ms  : {}", envelope.meta.latency_ms)?;
    writeln!(out)?;

    match &envelope.data {
        CommandOutput::Valuation(report) => render_valuation(out, report)?,
        CommandOutput::Sensitivity(report) => render_sensitivity(out, report)?,
    }

    if !envelope.meta.warnings.is_empty() {
        writeln!(out)?;
        writeln!(out, "warnings:")?;
        for warning in &envelope.meta.warnings {
            writeln!(out, "  - {warning}")?;
        }
    }
    Ok(())
}

fn render_valuation(out: &mut impl Write, report: &AggregateReport) -> io::Result<()> {
    writeln!(out, "{} ({})", report.company_name, report.ticker)?;
    writeln!(out, "current price : {:.2}", report.current_price)?;
    writeln!(out, "status        : {:?}", report.status())?;
    writeln!(out)?;

    writeln!(
        out,
        "{:<24} {:>12} {:>10} {:>8} {:>8}",
        "source", "fair value", "upside %", "growth", "coe"
    )?;
    for result in &report.results {
        writeln!(
            out,
            "{:<24} {:>12.2} {:>10} {:>8.4} {:>8.4}",
            result.source_name.as_str(),
            result.fair_value_per_share,
            fmt_optional(result.upside_pct, 2),
            result.growth_rate,
            result.cost_of_equity,
        )?;
    }
    for failure in &report.failures {
        writeln!(
            out,
            "{:<24} {:>12} {}",
            failure.source_name.as_str(),
            "-",
            failure.reason
        )?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "average fair value : {}",
        fmt_optional(report.average_fair_value, 2)
    )?;
    writeln!(
        out,
        "average upside %   : {}",
        fmt_optional(report.average_upside_pct, 2)
    )?;
    if let Some(dispersion) = &report.dispersion {
        writeln!(
            out,
            "range              : {:.2} .. {:.2} (std dev {:.2})",
            dispersion.min_fair_value, dispersion.max_fair_value, dispersion.std_dev
        )?;
    }
    if !report.failures.is_empty() && report.has_valuation() {
        writeln!(
            out,
            "note: averages cover {} of {} sources; failed sources are excluded",
            report.results.len(),
            report.sources_attempted()
        )?;
    }
    Ok(())
}

fn render_sensitivity(out: &mut impl Write, report: &SensitivityReport) -> io::Result<()> {
    writeln!(out, "source: {}", report.source_name)?;
    writeln!(out)?;
    writeln!(out, "{:>8} {:>12} {:>10}", "growth", "fair value", "upside %")?;
    for point in &report.growth_sensitivity {
        render_point(out, point)?;
    }

    for row in &report.discount_rate_grid {
        writeln!(out)?;
        writeln!(out, "cost of equity {:.4}", row.cost_of_equity)?;
        for point in &row.points {
            render_point(out, point)?;
        }
    }
    Ok(())
}

fn render_point(out: &mut impl Write, point: &SensitivityPoint) -> io::Result<()> {
    writeln!(
        out,
        "{:>8.4} {:>12} {:>10}",
        point.growth_rate,
        fmt_optional(point.fair_value_per_share, 2),
        fmt_optional(point.upside_pct, 2),
    )
}

fn fmt_optional(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(value) => format!("{value:.decimals$}"),
        None => String::from(UNAVAILABLE),
    }
}

#[cfg(test)]
mod tests {
    use fcfe_core::{
        FinancialInputSet, SensitivityAnalysis, SourceError, SourceName, StaticSource, Ticker,
        ValuationAssumptions, ValuationOrchestrator,
    };

    use super::*;
    use crate::metadata::Metadata;

    fn inputs() -> FinancialInputSet {
        FinancialInputSet {
            net_income: 100.0,
            depreciation_amortization: 20.0,
            capital_expenditures: 30.0,
            working_capital_change: 5.0,
            net_borrowing: 10.0,
            shares_outstanding: 100,
            beta: 1.0,
            risk_free_rate: 0.04,
            market_risk_premium: 0.05,
            current_price: 0.0,
            historical_growth_rate: None,
        }
    }

    fn rendered(data: CommandOutput) -> String {
        let envelope = Envelope::new(Metadata::new(3), data);
        let mut buffer = Vec::new();
        render_table(&mut buffer, &envelope).expect("writes to memory");
        String::from_utf8(buffer).expect("utf-8")
    }

    #[tokio::test]
    async fn zero_success_table_says_unavailable() {
        let orchestrator = ValuationOrchestrator::builder()
            .with_source(StaticSource::failing(
                "Finviz",
                SourceError::data_unavailable("missing"),
            ))
            .build()
            .expect("valid");
        let report = orchestrator
            .run(
                &Ticker::parse("AAPL").expect("valid"),
                "Apple Inc.",
                10.0,
                &ValuationAssumptions::default(),
            )
            .await
            .expect("run completes");

        let table = rendered(CommandOutput::Valuation(report));
        assert!(table.contains("average fair value : unavailable"));
        assert!(table.contains("data unavailable"));
        assert!(!table.contains("note: averages cover"));
    }

    #[tokio::test]
    async fn partial_table_flags_excluded_sources() {
        let orchestrator = ValuationOrchestrator::builder()
            .with_source(StaticSource::new("Yahoo Finance", inputs()))
            .with_source(StaticSource::failing(
                "Finviz",
                SourceError::parse_failure("layout"),
            ))
            .build()
            .expect("valid");
        let report = orchestrator
            .run(
                &Ticker::parse("AAPL").expect("valid"),
                "Apple Inc.",
                10.0,
                &ValuationAssumptions::default(),
            )
            .await
            .expect("run completes");

        let table = rendered(CommandOutput::Valuation(report));
        assert!(table.contains("Yahoo Finance"));
        assert!(table.contains("note: averages cover 1 of 2 sources"));
    }

    #[test]
    fn sensitivity_table_lists_each_growth_rate() {
        let name = SourceName::new("Yahoo Finance").expect("valid");
        let report = SensitivityAnalysis::new().run(
            &name,
            &inputs().with_current_price(10.0),
            &ValuationAssumptions::default(),
        );

        let table = rendered(CommandOutput::Sensitivity(report));
        assert!(table.contains("source: Yahoo Finance"));
        assert!(table.contains("  0.1500"));
    }
}
