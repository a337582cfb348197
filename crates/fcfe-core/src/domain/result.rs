use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::SourceName;
use crate::data_source::{SourceError, SourceErrorKind};
use crate::ValuationError;

/// Output of one successful FCFE computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub source_name: SourceName,
    pub current_fcfe: f64,
    pub projected_fcfe: Vec<f64>,
    pub terminal_value: f64,
    pub present_value_of_cashflows: f64,
    pub present_value_of_terminal_value: f64,
    pub fair_value_per_share: f64,
    pub current_price: f64,
    /// `None` when the current price is not positive.
    pub upside_pct: Option<f64>,
    pub growth_rate: f64,
    pub cost_of_equity: f64,
    pub terminal_growth_rate: f64,
}

impl ValuationResult {
    pub fn total_present_value(&self) -> f64 {
        self.present_value_of_cashflows + self.present_value_of_terminal_value
    }
}

/// Coarse cause category recorded for a source that produced no result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    DataUnavailable,
    ParseFailure,
    RateLimited,
    NotImplemented,
    Timeout,
    ComputationError,
}

impl FailureReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DataUnavailable => "data unavailable",
            Self::ParseFailure => "parse failure",
            Self::RateLimited => "rate limited",
            Self::NotImplemented => "not implemented",
            Self::Timeout => "timeout",
            Self::ComputationError => "computation error",
        }
    }
}

impl Display for FailureReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<SourceErrorKind> for FailureReason {
    fn from(kind: SourceErrorKind) -> Self {
        match kind {
            SourceErrorKind::DataUnavailable => Self::DataUnavailable,
            SourceErrorKind::ParseFailure => Self::ParseFailure,
            SourceErrorKind::RateLimited => Self::RateLimited,
            SourceErrorKind::NotImplemented => Self::NotImplemented,
        }
    }
}

/// Record of a source that was attempted but contributed no result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source_name: SourceName,
    pub reason: FailureReason,
    /// Short diagnostic text; informational only.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub detail: String,
}

impl SourceFailure {
    pub fn new(source_name: SourceName, reason: FailureReason, detail: impl Into<String>) -> Self {
        Self {
            source_name,
            reason,
            detail: detail.into(),
        }
    }

    pub fn from_source_error(source_name: SourceName, error: &SourceError) -> Self {
        Self::new(source_name, error.kind().into(), error.message())
    }

    pub fn from_valuation_error(source_name: SourceName, error: &ValuationError) -> Self {
        Self::new(source_name, FailureReason::ComputationError, error.to_string())
    }
}
