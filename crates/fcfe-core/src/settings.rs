//! Run settings: model assumptions plus source scheduling.
//!
//! Layering, lowest to highest precedence: built-in defaults, `FCFE_*`
//! environment variables, explicit `with_*` overrides (the CLI flags).

use std::str::FromStr;
use std::time::Duration;

use crate::orchestrator::{ExecutionMode, DEFAULT_SOURCE_TIMEOUT};
use crate::{
    ConfigurationError, ValuationAssumptions, DEFAULT_PROJECTION_YEARS,
    DEFAULT_TERMINAL_GROWTH_RATE,
};

pub const ENV_PROJECTION_YEARS: &str = "FCFE_PROJECTION_YEARS";
pub const ENV_TERMINAL_GROWTH_RATE: &str = "FCFE_TERMINAL_GROWTH_RATE";
pub const ENV_GROWTH_RATE: &str = "FCFE_GROWTH_RATE";
pub const ENV_COST_OF_EQUITY: &str = "FCFE_COST_OF_EQUITY";
pub const ENV_SOURCE_TIMEOUT_MS: &str = "FCFE_SOURCE_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq)]
pub struct ValuationSettings {
    pub projection_years: u32,
    pub growth_rate: Option<f64>,
    pub terminal_growth_rate: f64,
    pub cost_of_equity: Option<f64>,
    pub source_timeout: Duration,
    pub mode: ExecutionMode,
}

impl Default for ValuationSettings {
    fn default() -> Self {
        Self {
            projection_years: DEFAULT_PROJECTION_YEARS,
            growth_rate: None,
            terminal_growth_rate: DEFAULT_TERMINAL_GROWTH_RATE,
            cost_of_equity: None,
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
            mode: ExecutionMode::Sequential,
        }
    }
}

impl ValuationSettings {
    /// Defaults overlaid with any `FCFE_*` variables in the process environment.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::InvalidSetting`] when a variable is set but does
    /// not parse.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an injectable variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(years) = parse_var::<u32, _>(&lookup, ENV_PROJECTION_YEARS)? {
            settings.projection_years = years;
        }
        if let Some(rate) = parse_var::<f64, _>(&lookup, ENV_TERMINAL_GROWTH_RATE)? {
            settings.terminal_growth_rate = rate;
        }
        if let Some(rate) = parse_var::<f64, _>(&lookup, ENV_GROWTH_RATE)? {
            settings.growth_rate = Some(rate);
        }
        if let Some(rate) = parse_var::<f64, _>(&lookup, ENV_COST_OF_EQUITY)? {
            settings.cost_of_equity = Some(rate);
        }
        if let Some(millis) = parse_var::<u64, _>(&lookup, ENV_SOURCE_TIMEOUT_MS)? {
            settings.source_timeout = Duration::from_millis(millis);
        }

        Ok(settings)
    }

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

    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// The model half of the settings, shared by every source in a run.
    pub fn assumptions(&self) -> ValuationAssumptions {
        ValuationAssumptions {
            projection_years: self.projection_years,
            growth_rate: self.growth_rate,
            terminal_growth_rate: self.terminal_growth_rate,
            cost_of_equity: self.cost_of_equity,
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigurationError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|_| ConfigurationError::InvalidSetting { key, value: raw })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let settings = ValuationSettings::from_lookup(|_| None).expect("defaults");
        assert_eq!(settings, ValuationSettings::default());
        assert_eq!(settings.source_timeout, Duration::from_millis(10_000));
        assert_eq!(settings.assumptions(), ValuationAssumptions::default());
    }

    #[test]
    fn environment_overrides_defaults() {
        let settings = ValuationSettings::from_lookup(lookup_from(&[
            (ENV_PROJECTION_YEARS, "7"),
            (ENV_GROWTH_RATE, "0.06"),
            (ENV_COST_OF_EQUITY, " 0.11 "),
            (ENV_SOURCE_TIMEOUT_MS, "250"),
        ]))
        .expect("valid values");

        assert_eq!(settings.projection_years, 7);
        assert_eq!(settings.growth_rate, Some(0.06));
        assert_eq!(settings.cost_of_equity, Some(0.11));
        assert_eq!(settings.terminal_growth_rate, DEFAULT_TERMINAL_GROWTH_RATE);
        assert_eq!(settings.source_timeout, Duration::from_millis(250));
    }

    #[test]
    fn explicit_overrides_win_over_environment() {
        let settings = ValuationSettings::from_lookup(lookup_from(&[(ENV_GROWTH_RATE, "0.06")]))
            .expect("valid")
            .with_growth_rate(0.09)
            .with_mode(ExecutionMode::Concurrent);

        assert_eq!(settings.assumptions().growth_rate, Some(0.09));
        assert_eq!(settings.mode, ExecutionMode::Concurrent);
    }

    #[test]
    fn unparseable_value_names_the_variable() {
        let err = ValuationSettings::from_lookup(lookup_from(&[(ENV_PROJECTION_YEARS, "five")]))
            .expect_err("must reject");
        assert_eq!(
            err,
            ConfigurationError::InvalidSetting {
                key: ENV_PROJECTION_YEARS,
                value: String::from("five"),
            }
        );
    }
}
