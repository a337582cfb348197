use fcfe_core::{ConfigurationError, SensitivityAnalysis, SourceName, Ticker, ValuationSettings};

use crate::cli::SensitivityArgs;
use crate::error::CliError;
use crate::snapshot;

use super::{apply_model_flags, CommandOutput, CommandResult};

pub fn run(args: &SensitivityArgs) -> Result<CommandResult, CliError> {
    let ticker = Ticker::parse(&args.ticker)?;
    let settings = apply_model_flags(&args.model, ValuationSettings::from_env()?);
    let assumptions = settings.assumptions();
    assumptions.check_horizon()?;

    let path = args
        .snapshot
        .clone()
        .unwrap_or_else(|| snapshot::default_path(&ticker));
    let snapshot = snapshot::load(&path)?;
    let current_price = args.model.price.unwrap_or(snapshot.current_price);
    if !current_price.is_finite() || current_price <= 0.0 {
        return Err(ConfigurationError::InvalidCurrentPrice {
            value: current_price,
        }
        .into());
    }

    let (name, inputs) = snapshot
        .inputs_for(args.source.as_deref())
        .ok_or_else(|| match &args.source {
            Some(wanted) => CliError::Command(format!(
                "source '{wanted}' has no usable figures in the snapshot"
            )),
            None => {
                CliError::Command(String::from("no source in the snapshot has usable figures"))
            }
        })?;
    let source_name = SourceName::new(name)?;
    let inputs = inputs.with_current_price(current_price);

    let mut analysis = SensitivityAnalysis::new();
    if !args.growth_rates.is_empty() {
        analysis = analysis.with_growth_rates(args.growth_rates.clone());
    }
    if !args.discount_rates.is_empty() {
        analysis = analysis.with_discount_rates(args.discount_rates.clone());
    }

    let report = analysis.run(&source_name, &inputs, &assumptions);

    let rejected = report
        .growth_sensitivity
        .iter()
        .chain(report.discount_rate_grid.iter().flat_map(|row| row.points.iter()))
        .filter(|point| point.error.is_some())
        .count();
    let mut result = CommandResult::ok(CommandOutput::Sensitivity(report));
    if rejected > 0 {
        result = result.with_warning(format!(
            "{rejected} grid point(s) rejected by the model; see 'error' fields"
        ));
    }
    Ok(result)
}
