//! FCFE discounted-cash-flow engine.
//!
//! Pure computation: no I/O, no shared state. The same inputs always yield a
//! bit-identical [`ValuationResult`].
//!
//! ```text
//! FCFE_0   = NI + D&A - CapEx - dNWC + net borrowing
//! FCFE_t   = FCFE_0 * (1 + g)^t                      t = 1..N
//! TV_N     = FCFE_N * (1 + g_T) / (r - g_T)
//! PV       = sum_t FCFE_t / (1 + r)^t  +  TV_N / (1 + r)^N
//! fair     = max(PV, 0) / shares
//! ```

use tracing::{debug, info};

use crate::{FinancialInputSet, SourceName, ValuationAssumptions, ValuationError, ValuationResult};

/// Stateless FCFE DCF calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct FcfeEngine;

impl FcfeEngine {
    pub const fn new() -> Self {
        Self
    }

    /// Values one source's inputs under the given assumptions.
    ///
    /// # Errors
    ///
    /// [`ValuationError::InvalidInput`] when the inputs or assumptions break
    /// an invariant; a model-assumption variant when the resolved cost of
    /// equity is not positive or does not exceed the terminal growth rate.
    pub fn compute(
        &self,
        source_name: &SourceName,
        inputs: &FinancialInputSet,
        assumptions: &ValuationAssumptions,
    ) -> Result<ValuationResult, ValuationError> {
        inputs.validate()?;
        assumptions.validate()?;

        let current_fcfe = inputs.current_fcfe();
        let growth_rate = assumptions.resolve_growth_rate(inputs);
        let terminal_growth_rate = assumptions.terminal_growth_rate;
        let cost_of_equity = assumptions.resolve_cost_of_equity(inputs);

        if cost_of_equity <= 0.0 {
            return Err(ValuationError::NonPositiveCostOfEquity { cost_of_equity });
        }
        if terminal_growth_rate >= cost_of_equity {
            return Err(ValuationError::TerminalGrowthNotBelowCostOfEquity {
                terminal_growth_rate,
                cost_of_equity,
            });
        }

        let years = assumptions.projection_years;
        let projected_fcfe = project_fcfe(current_fcfe, growth_rate, years);

        let final_fcfe = projected_fcfe.last().copied().unwrap_or(current_fcfe);
        let terminal_value =
            final_fcfe * (1.0 + terminal_growth_rate) / (cost_of_equity - terminal_growth_rate);

        let mut present_value_of_cashflows = 0.0;
        for (period, value) in (1_i32..).zip(&projected_fcfe) {
            let discounted = value / discount_factor(cost_of_equity, period);
            debug!(
                source = %source_name,
                period,
                fcfe = value,
                present_value = discounted,
                "discounted projected fcfe"
            );
            present_value_of_cashflows += discounted;
        }
        let terminal_period = i32::try_from(years).unwrap_or(i32::MAX);
        let present_value_of_terminal_value =
            terminal_value / discount_factor(cost_of_equity, terminal_period);

        if !terminal_value.is_finite() {
            return Err(ValuationError::invalid(
                "terminal_value",
                "overflowed to a non-finite value",
            ));
        }
        let equity_value = present_value_of_cashflows + present_value_of_terminal_value;
        // f64::max would turn NaN into 0, so finiteness is checked before the floor.
        if !equity_value.is_finite() {
            return Err(ValuationError::invalid(
                "equity_value",
                "overflowed to a non-finite value",
            ));
        }
        let fair_value_per_share = equity_value.max(0.0) / inputs.shares_outstanding as f64;

        let current_price = inputs.current_price;
        let upside_pct = upside_pct(fair_value_per_share, current_price);

        info!(
            source = %source_name,
            current_fcfe,
            growth_rate,
            cost_of_equity,
            terminal_growth_rate,
            fair_value_per_share,
            "fcfe valuation computed"
        );

        Ok(ValuationResult {
            source_name: source_name.clone(),
            current_fcfe,
            projected_fcfe,
            terminal_value,
            present_value_of_cashflows,
            present_value_of_terminal_value,
            fair_value_per_share,
            current_price,
            upside_pct,
            growth_rate,
            cost_of_equity,
            terminal_growth_rate,
        })
    }
}

/// Percentage gap between fair value and price, only for a positive price.
pub fn upside_pct(fair_value_per_share: f64, current_price: f64) -> Option<f64> {
    if current_price > 0.0 {
        Some((fair_value_per_share - current_price) / current_price * 100.0)
    } else {
        None
    }
}

fn project_fcfe(current_fcfe: f64, growth_rate: f64, years: u32) -> Vec<f64> {
    // Each period compounds from the base so no error accumulates across periods.
    (1..=years)
        .map(|period| {
            let period = i32::try_from(period).unwrap_or(i32::MAX);
            current_fcfe * (1.0 + growth_rate).powi(period)
        })
        .collect()
}

fn discount_factor(cost_of_equity: f64, period: i32) -> f64 {
    (1.0 + cost_of_equity).powi(period)
}
