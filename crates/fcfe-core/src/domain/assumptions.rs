use serde::{Deserialize, Serialize};

use super::inputs::{validate_finite, validate_optional_finite};
use super::FinancialInputSet;
use crate::{ConfigurationError, ValuationError};

pub const DEFAULT_PROJECTION_YEARS: u32 = 5;
/// Longest projection horizon a run accepts.
pub const MAX_PROJECTION_YEARS: u32 = 100;
pub const DEFAULT_TERMINAL_GROWTH_RATE: f64 = 0.025;
/// Growth used when neither an explicit rate nor a reported history exists.
pub const DEFAULT_GROWTH_RATE: f64 = 0.05;
/// Bounds applied to provider-reported historical growth.
pub const HISTORICAL_GROWTH_FLOOR: f64 = -0.05;
pub const HISTORICAL_GROWTH_CAP: f64 = 0.25;

/// Growth and discounting assumptions shared by every source in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationAssumptions {
    pub projection_years: u32,
    /// Explicit growth rate; derived per source when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth_rate: Option<f64>,
    pub terminal_growth_rate: f64,
    /// Explicit cost of equity; CAPM per source when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_of_equity: Option<f64>,
}

impl Default for ValuationAssumptions {
    fn default() -> Self {
        Self {
            projection_years: DEFAULT_PROJECTION_YEARS,
            growth_rate: None,
            terminal_growth_rate: DEFAULT_TERMINAL_GROWTH_RATE,
            cost_of_equity: None,
        }
    }
}

impl ValuationAssumptions {
    pub fn with_projection_years(mut self, years: u32) -> Self {
        self.projection_years = years;
        self
    }

    pub fn with_growth_rate(mut self, growth_rate: f64) -> Self {
        self.growth_rate = Some(growth_rate);
        self
    }

    pub fn with_terminal_growth_rate(mut self, terminal_growth_rate: f64) -> Self {
        self.terminal_growth_rate = terminal_growth_rate;
        self
    }

    pub fn with_cost_of_equity(mut self, cost_of_equity: f64) -> Self {
        self.cost_of_equity = Some(cost_of_equity);
        self
    }

    pub fn validate(&self) -> Result<(), ValuationError> {
        if self.projection_years == 0 {
            return Err(ValuationError::invalid(
                "projection_years",
                "must be at least 1",
            ));
        }
        if self.projection_years > MAX_PROJECTION_YEARS {
            return Err(ValuationError::invalid(
                "projection_years",
                "exceeds the maximum horizon",
            ));
        }
        validate_optional_finite("growth_rate", self.growth_rate)?;
        validate_finite("terminal_growth_rate", self.terminal_growth_rate)?;
        validate_optional_finite("cost_of_equity", self.cost_of_equity)?;
        Ok(())
    }

    /// Run-level horizon check, applied before any source is queried.
    pub fn check_horizon(&self) -> Result<(), ConfigurationError> {
        match self.projection_years {
            0 => Err(ConfigurationError::ZeroProjectionYears),
            years if years > MAX_PROJECTION_YEARS => {
                Err(ConfigurationError::ProjectionYearsTooLarge {
                    years,
                    max: MAX_PROJECTION_YEARS,
                })
            }
            _ => Ok(()),
        }
    }

    /// Growth rate for one source: explicit, else clamped history, else default.
    pub fn resolve_growth_rate(&self, inputs: &FinancialInputSet) -> f64 {
        match (self.growth_rate, inputs.historical_growth_rate) {
            (Some(explicit), _) => explicit,
            (None, Some(historical)) => {
                historical.clamp(HISTORICAL_GROWTH_FLOOR, HISTORICAL_GROWTH_CAP)
            }
            (None, None) => DEFAULT_GROWTH_RATE,
        }
    }

    /// Cost of equity for one source: explicit, else CAPM.
    pub fn resolve_cost_of_equity(&self, inputs: &FinancialInputSet) -> f64 {
        self.cost_of_equity
            .unwrap_or_else(|| inputs.capm_cost_of_equity())
    }
}
