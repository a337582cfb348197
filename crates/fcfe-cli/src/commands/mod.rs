mod sensitivity;
mod value;

use std::time::Instant;

use fcfe_core::{AggregateReport, SensitivityReport, ValuationSettings};
use serde::Serialize;

use crate::cli::{Cli, Command, ModelArgs};
use crate::error::CliError;
use crate::metadata::{Envelope, Metadata};

/// Typed payload of a command, rendered as JSON or as a table.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    Valuation(AggregateReport),
    Sensitivity(SensitivityReport),
}

#[derive(Debug)]
pub struct CommandResult {
    pub data: CommandOutput,
    pub warnings: Vec<String>,
}

impl CommandResult {
    pub fn ok(data: CommandOutput) -> Self {
        Self {
            data,
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

/// Model flags override whatever the environment provided.
fn apply_model_flags(model: &ModelArgs, mut settings: ValuationSettings) -> ValuationSettings {
    if let Some(years) = model.years {
        settings = settings.with_projection_years(years);
    }
    if let Some(terminal_growth) = model.terminal_growth {
        settings = settings.with_terminal_growth_rate(terminal_growth);
    }
    if let Some(cost_of_equity) = model.cost_of_equity {
        settings = settings.with_cost_of_equity(cost_of_equity);
    }
    settings
}

pub async fn run(cli: &Cli) -> Result<Envelope<CommandOutput>, CliError> {
    let started = Instant::now();

    let command_result = match &cli.command {
        Command::Value(args) => value::run(args).await?,
        Command::Sensitivity(args) => sensitivity::run(args)?,
    };

    let CommandResult { data, warnings } = command_result;

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let mut metadata = Metadata::new(latency_ms);
    for warning in warnings {
        metadata.push_warning(warning);
    }

    Ok(Envelope::new(metadata, data))
}
