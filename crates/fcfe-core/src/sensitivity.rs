//! Fair-value sensitivity to the growth and discount assumptions.
//!
//! Re-runs [`FcfeEngine`] for one source's inputs across a grid of growth
//! rates and, optionally, explicit cost-of-equity values. A grid point whose
//! assumptions are rejected by the engine carries the error instead of a
//! value; it never aborts the analysis.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    FcfeEngine, FinancialInputSet, SourceName, ValuationAssumptions, ValuationError,
    ValuationResult,
};

pub const DEFAULT_SENSITIVITY_GROWTH_RATES: [f64; 5] = [0.03, 0.05, 0.07, 0.10, 0.15];
/// Growth rate whose full result is reported as the base case.
pub const BASE_CASE_GROWTH_RATE: f64 = 0.05;

/// One cell of the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub growth_rate: f64,
    /// Explicit discount rate for the cell; `None` means CAPM for the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_of_equity: Option<f64>,
    pub fair_value_per_share: Option<f64>,
    pub upside_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SensitivityPoint {
    fn from_outcome(
        growth_rate: f64,
        cost_of_equity: Option<f64>,
        outcome: &Result<ValuationResult, ValuationError>,
    ) -> Self {
        match outcome {
            Ok(result) => Self {
                growth_rate,
                cost_of_equity,
                fair_value_per_share: Some(result.fair_value_per_share),
                upside_pct: result.upside_pct,
                error: None,
            },
            Err(error) => Self {
                growth_rate,
                cost_of_equity,
                fair_value_per_share: None,
                upside_pct: None,
                error: Some(error.to_string()),
            },
        }
    }
}

/// Fair values for one discount rate across the growth grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountRateRow {
    pub cost_of_equity: f64,
    pub points: Vec<SensitivityPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub source_name: SourceName,
    /// Growth grid under the run's own discounting assumption.
    pub growth_sensitivity: Vec<SensitivityPoint>,
    /// Present when [`BASE_CASE_GROWTH_RATE`] is part of the growth grid and valued cleanly.
    pub base_case: Option<ValuationResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discount_rate_grid: Vec<DiscountRateRow>,
}

#[derive(Debug, Clone)]
pub struct SensitivityAnalysis {
    engine: FcfeEngine,
    growth_rates: Vec<f64>,
    discount_rates: Vec<f64>,
}

impl Default for SensitivityAnalysis {
    fn default() -> Self {
        Self::new()
    }
}

impl SensitivityAnalysis {
    pub fn new() -> Self {
        Self {
            engine: FcfeEngine::new(),
            growth_rates: DEFAULT_SENSITIVITY_GROWTH_RATES.to_vec(),
            discount_rates: Vec::new(),
        }
    }

    pub fn with_growth_rates(mut self, growth_rates: impl Into<Vec<f64>>) -> Self {
        self.growth_rates = growth_rates.into();
        self
    }

    pub fn with_discount_rates(mut self, discount_rates: impl Into<Vec<f64>>) -> Self {
        self.discount_rates = discount_rates.into();
        self
    }

    pub fn growth_rates(&self) -> &[f64] {
        &self.growth_rates
    }

    /// Values `inputs` at every grid point. Any growth rate already set on
    /// `assumptions` is replaced per point.
    pub fn run(
        &self,
        source_name: &SourceName,
        inputs: &FinancialInputSet,
        assumptions: &ValuationAssumptions,
    ) -> SensitivityReport {
        let mut base_case = None;
        let mut growth_sensitivity = Vec::with_capacity(self.growth_rates.len());
        for &growth_rate in &self.growth_rates {
            let scenario = assumptions.clone().with_growth_rate(growth_rate);
            let outcome = self.engine.compute(source_name, inputs, &scenario);
            growth_sensitivity.push(SensitivityPoint::from_outcome(
                growth_rate,
                assumptions.cost_of_equity,
                &outcome,
            ));
            if growth_rate == BASE_CASE_GROWTH_RATE {
                base_case = outcome.ok();
            }
        }

        let discount_rate_grid = self
            .discount_rates
            .iter()
            .map(|&cost_of_equity| DiscountRateRow {
                cost_of_equity,
                points: self
                    .growth_rates
                    .iter()
                    .map(|&growth_rate| {
                        let scenario = assumptions
                            .clone()
                            .with_growth_rate(growth_rate)
                            .with_cost_of_equity(cost_of_equity);
                        let outcome = self.engine.compute(source_name, inputs, &scenario);
                        SensitivityPoint::from_outcome(growth_rate, Some(cost_of_equity), &outcome)
                    })
                    .collect(),
            })
            .collect::<Vec<_>>();

        debug!(
            source = %source_name,
            growth_points = growth_sensitivity.len(),
            discount_rows = discount_rate_grid.len(),
            "sensitivity grid evaluated"
        );

        SensitivityReport {
            source_name: source_name.clone(),
            growth_sensitivity,
            base_case,
            discount_rate_grid,
        }
    }
}
