use serde::{de, Deserialize, Deserializer, Serialize};

use crate::ValuationError;

/// Normalized bundle of the raw figures an FCFE valuation needs.
///
/// Monetary fields share one currency and one period (trailing twelve
/// months or the latest fiscal year). Rates are decimal fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialInputSet {
    pub net_income: f64,
    pub depreciation_amortization: f64,
    pub capital_expenditures: f64,
    pub working_capital_change: f64,
    pub net_borrowing: f64,
    #[serde(deserialize_with = "deserialize_share_count")]
    pub shares_outstanding: u64,
    pub beta: f64,
    pub risk_free_rate: f64,
    pub market_risk_premium: f64,
    /// Overwritten by the orchestrator with the run-level observed price.
    #[serde(default)]
    pub current_price: f64,
    /// Provider-reported FCFE growth over recent years, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical_growth_rate: Option<f64>,
}

impl FinancialInputSet {
    /// Checks every invariant the engine relies on.
    pub fn validate(&self) -> Result<(), ValuationError> {
        validate_finite("net_income", self.net_income)?;
        validate_finite("depreciation_amortization", self.depreciation_amortization)?;
        validate_finite("capital_expenditures", self.capital_expenditures)?;
        validate_finite("working_capital_change", self.working_capital_change)?;
        validate_finite("net_borrowing", self.net_borrowing)?;
        validate_finite("beta", self.beta)?;
        validate_finite("risk_free_rate", self.risk_free_rate)?;
        validate_finite("market_risk_premium", self.market_risk_premium)?;
        validate_finite("current_price", self.current_price)?;
        validate_optional_finite("historical_growth_rate", self.historical_growth_rate)?;

        if self.shares_outstanding == 0 {
            return Err(ValuationError::invalid(
                "shares_outstanding",
                "must be greater than zero",
            ));
        }
        if self.current_price < 0.0 {
            return Err(ValuationError::invalid("current_price", "must be non-negative"));
        }

        Ok(())
    }

    /// Free cash flow to equity for the input period.
    pub fn current_fcfe(&self) -> f64 {
        self.net_income + self.depreciation_amortization
            - self.capital_expenditures
            - self.working_capital_change
            + self.net_borrowing
    }

    /// CAPM cost of equity: `rf + beta * mrp`.
    pub fn capm_cost_of_equity(&self) -> f64 {
        self.risk_free_rate + self.beta * self.market_risk_premium
    }

    pub fn with_current_price(mut self, current_price: f64) -> Self {
        self.current_price = current_price;
        self
    }
}

/// Share counts arrive as integers or as whole-valued floats (`15550000000.0`).
fn deserialize_share_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ShareCount {
        Whole(u64),
        Float(f64),
    }

    match ShareCount::deserialize(deserializer)? {
        ShareCount::Whole(count) => Ok(count),
        ShareCount::Float(count)
            if count >= 0.0 && count.fract() == 0.0 && count < u64::MAX as f64 =>
        {
            Ok(count as u64)
        }
        ShareCount::Float(count) => Err(de::Error::custom(format!(
            "shares_outstanding must be a non-negative whole number, got {count}"
        ))),
    }
}

pub(crate) fn validate_finite(field: &'static str, value: f64) -> Result<(), ValuationError> {
    if !value.is_finite() {
        return Err(ValuationError::invalid(field, "must be finite"));
    }
    Ok(())
}

pub(crate) fn validate_optional_finite(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValuationError> {
    if let Some(value) = value {
        validate_finite(field, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FinancialInputSet {
        FinancialInputSet {
            net_income: 100.0,
            depreciation_amortization: 20.0,
            capital_expenditures: 30.0,
            working_capital_change: 5.0,
            net_borrowing: 10.0,
            shares_outstanding: 1_000,
            beta: 1.2,
            risk_free_rate: 0.04,
            market_risk_premium: 0.05,
            current_price: 1.5,
            historical_growth_rate: None,
        }
    }

    #[test]
    fn fcfe_combines_all_components() {
        assert_eq!(sample().current_fcfe(), 95.0);
    }

    #[test]
    fn capm_uses_beta_and_premium() {
        let cost = sample().capm_cost_of_equity();
        assert!((cost - 0.10).abs() < 1e-12);
    }

    #[test]
    fn zero_shares_are_rejected() {
        let inputs = FinancialInputSet {
            shares_outstanding: 0,
            ..sample()
        };
        let err = inputs.validate().expect_err("zero shares must fail");
        assert!(matches!(
            err,
            ValuationError::InvalidInput {
                field: "shares_outstanding",
                ..
            }
        ));
    }

    #[test]
    fn nan_fields_are_rejected() {
        let inputs = FinancialInputSet {
            capital_expenditures: f64::NAN,
            ..sample()
        };
        assert!(inputs.validate().is_err());

        let inputs = FinancialInputSet {
            historical_growth_rate: Some(f64::INFINITY),
            ..sample()
        };
        assert!(inputs.validate().is_err());
    }

    #[test]
    fn missing_price_and_growth_deserialize_to_defaults() {
        let raw = r#"{
            "net_income": 100.0,
            "depreciation_amortization": 20.0,
            "capital_expenditures": 30.0,
            "working_capital_change": 5.0,
            "net_borrowing": 10.0,
            "shares_outstanding": 1000,
            "beta": 1.0,
            "risk_free_rate": 0.045,
            "market_risk_premium": 0.055
        }"#;
        let inputs: FinancialInputSet = serde_json::from_str(raw).expect("valid inputs");
        assert_eq!(inputs.current_price, 0.0);
        assert_eq!(inputs.historical_growth_rate, None);
        assert!(inputs.validate().is_ok());
    }

    #[test]
    fn share_count_accepts_whole_floats_only() {
        let with_shares = |shares: &str| {
            format!(
                r#"{{
                    "net_income": 100.0,
                    "depreciation_amortization": 20.0,
                    "capital_expenditures": 30.0,
                    "working_capital_change": 5.0,
                    "net_borrowing": 10.0,
                    "shares_outstanding": {shares},
                    "beta": 1.0,
                    "risk_free_rate": 0.045,
                    "market_risk_premium": 0.055
                }}"#
            )
        };

        let inputs: FinancialInputSet =
            serde_json::from_str(&with_shares("15550000000.0")).expect("whole float");
        assert_eq!(inputs.shares_outstanding, 15_550_000_000);

        assert!(serde_json::from_str::<FinancialInputSet>(&with_shares("-5")).is_err());
        assert!(serde_json::from_str::<FinancialInputSet>(&with_shares("12.5")).is_err());
    }
}
