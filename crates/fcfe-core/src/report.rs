//! Cross-source valuation report.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{SourceFailure, Ticker, ValuationAssumptions, ValuationResult};

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Every source produced a result.
    Complete,
    /// Some sources produced results, some failed.
    Partial,
    /// No source produced a result; no valuation is available.
    Unavailable,
}

/// Disagreement between the per-source fair values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dispersion {
    pub min_fair_value: f64,
    pub max_fair_value: f64,
    /// `(max - min) / mean * 100`; `None` when the mean is zero.
    pub spread_pct: Option<f64>,
    /// Population standard deviation.
    pub std_dev: f64,
}

impl Dispersion {
    fn from_values(values: &[f64]) -> Option<Self> {
        let mean = mean(values)?;
        let min_fair_value = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max_fair_value = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let variance = values
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>()
            / values.len() as f64;
        let spread_pct = if mean != 0.0 {
            Some((max_fair_value - min_fair_value) / mean * 100.0)
        } else {
            None
        };

        Some(Self {
            min_fair_value,
            max_fair_value,
            spread_pct,
            std_dev: variance.sqrt(),
        })
    }
}

/// Final summary of one valuation run.
///
/// Averages cover successful sources only and are `None` (never zero) when
/// no source succeeded. Failed sources are excluded from the averages, so a
/// consumer should read `failures` before trusting the mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub run_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
    pub company_name: String,
    pub ticker: Ticker,
    pub current_price: f64,
    pub assumptions: ValuationAssumptions,
    pub results: Vec<ValuationResult>,
    pub failures: Vec<SourceFailure>,
    pub average_fair_value: Option<f64>,
    pub average_upside_pct: Option<f64>,
    pub dispersion: Option<Dispersion>,
}

impl AggregateReport {
    pub(crate) fn new(
        company_name: String,
        ticker: Ticker,
        current_price: f64,
        assumptions: ValuationAssumptions,
        results: Vec<ValuationResult>,
        failures: Vec<SourceFailure>,
    ) -> Self {
        let fair_values = results
            .iter()
            .map(|result| result.fair_value_per_share)
            .collect::<Vec<_>>();
        let upsides = results
            .iter()
            .filter_map(|result| result.upside_pct)
            .collect::<Vec<_>>();

        Self {
            run_id: Uuid::new_v4(),
            generated_at: OffsetDateTime::now_utc(),
            company_name,
            ticker,
            current_price,
            assumptions,
            average_fair_value: mean(&fair_values),
            average_upside_pct: mean(&upsides),
            dispersion: Dispersion::from_values(&fair_values),
            results,
            failures,
        }
    }

    pub fn status(&self) -> ReportStatus {
        match (self.results.is_empty(), self.failures.is_empty()) {
            (true, _) => ReportStatus::Unavailable,
            (false, true) => ReportStatus::Complete,
            (false, false) => ReportStatus::Partial,
        }
    }

    pub fn has_valuation(&self) -> bool {
        !self.results.is_empty()
    }

    pub fn sources_attempted(&self) -> usize {
        self.results.len() + self.failures.len()
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FailureReason, SourceName};

    fn result(name: &str, fair_value: f64, price: f64) -> ValuationResult {
        ValuationResult {
            source_name: SourceName::new(name).expect("valid"),
            current_fcfe: 1.0,
            projected_fcfe: vec![1.0],
            terminal_value: 1.0,
            present_value_of_cashflows: 1.0,
            present_value_of_terminal_value: 1.0,
            fair_value_per_share: fair_value,
            current_price: price,
            upside_pct: crate::engine::upside_pct(fair_value, price),
            growth_rate: 0.05,
            cost_of_equity: 0.1,
            terminal_growth_rate: 0.025,
        }
    }

    fn report(results: Vec<ValuationResult>, failures: Vec<SourceFailure>) -> AggregateReport {
        AggregateReport::new(
            String::from("Apple Inc."),
            Ticker::parse("AAPL").expect("valid"),
            100.0,
            ValuationAssumptions::default(),
            results,
            failures,
        )
    }

    #[test]
    fn averages_cover_results_only() {
        let report = report(
            vec![result("a", 120.0, 100.0), result("b", 80.0, 100.0)],
            vec![SourceFailure::new(
                SourceName::new("c").expect("valid"),
                FailureReason::Timeout,
                "",
            )],
        );

        assert_eq!(report.average_fair_value, Some(100.0));
        assert_eq!(report.average_upside_pct, Some(0.0));
        assert_eq!(report.status(), ReportStatus::Partial);
        assert_eq!(report.sources_attempted(), 3);
    }

    #[test]
    fn empty_results_are_unavailable_not_zero() {
        let report = report(Vec::new(), Vec::new());
        assert_eq!(report.average_fair_value, None);
        assert_eq!(report.average_upside_pct, None);
        assert_eq!(report.dispersion, None);
        assert_eq!(report.status(), ReportStatus::Unavailable);

        let json = serde_json::to_value(&report).expect("serializes");
        assert!(json["average_fair_value"].is_null());
    }

    #[test]
    fn dispersion_measures_disagreement() {
        let report = report(
            vec![result("a", 90.0, 100.0), result("b", 110.0, 100.0)],
            Vec::new(),
        );
        let dispersion = report.dispersion.expect("two results");
        assert_eq!(dispersion.min_fair_value, 90.0);
        assert_eq!(dispersion.max_fair_value, 110.0);
        assert_eq!(dispersion.spread_pct, Some(20.0));
        assert!((dispersion.std_dev - 10.0).abs() < 1e-12);
        assert_eq!(report.status(), ReportStatus::Complete);
    }

    #[test]
    fn zero_mean_has_no_spread() {
        let dispersion = Dispersion::from_values(&[0.0, 0.0]).expect("non-empty");
        assert_eq!(dispersion.spread_pct, None);
    }
}
