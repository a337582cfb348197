use thiserror::Error;

/// Construction-time validation errors for identifiers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("ticker length {len} exceeds max {max}")]
    TickerTooLong { len: usize, max: usize },
    #[error("ticker must start with an ASCII letter: '{ch}'")]
    TickerInvalidStart { ch: char },
    #[error("ticker contains invalid character '{ch}' at index {index}")]
    TickerInvalidChar { ch: char, index: usize },
    #[error("ticker share-class suffix '{suffix}' must be 1-2 ASCII letters")]
    TickerInvalidClass { suffix: String },

    #[error("source name cannot be empty")]
    EmptySourceName,
}

/// Failures of a single FCFE computation.
///
/// Both variants are contained per source by the orchestrator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValuationError {
    #[error("invalid input: field '{field}' {problem}")]
    InvalidInput {
        field: &'static str,
        problem: &'static str,
    },

    #[error("terminal growth rate {terminal_growth_rate} must be below cost of equity {cost_of_equity}")]
    TerminalGrowthNotBelowCostOfEquity {
        terminal_growth_rate: f64,
        cost_of_equity: f64,
    },

    #[error("cost of equity must be positive, resolved to {cost_of_equity}")]
    NonPositiveCostOfEquity { cost_of_equity: f64 },
}

impl ValuationError {
    pub(crate) const fn invalid(field: &'static str, problem: &'static str) -> Self {
        Self::InvalidInput { field, problem }
    }

    /// Whether the failure stems from the model's assumptions rather than the inputs.
    pub const fn is_model_assumption(&self) -> bool {
        matches!(
            self,
            Self::TerminalGrowthNotBelowCostOfEquity { .. } | Self::NonPositiveCostOfEquity { .. }
        )
    }
}

/// Run-level misconfiguration. The only error class that aborts a run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("at least one valuation source must be configured")]
    NoSources,

    #[error("current price must be a positive finite number, got {value}")]
    InvalidCurrentPrice { value: f64 },

    #[error("projection_years must be at least 1")]
    ZeroProjectionYears,

    #[error("projection_years {years} exceeds the maximum of {max}")]
    ProjectionYearsTooLarge { years: u32, max: u32 },

    #[error("setting '{key}' has invalid value '{value}'")]
    InvalidSetting { key: &'static str, value: String },
}
