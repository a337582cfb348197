use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Human-readable label of a registered valuation source.
///
/// Sources are open-ended (added by registration), so unlike tickers the
/// name is only required to be non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SourceName(String);

impl SourceName {
    pub fn new(input: impl Into<String>) -> Result<Self, ValidationError> {
        let input = input.into();
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptySourceName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SourceName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for SourceName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SourceName> for String {
    fn from(value: SourceName) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let name = SourceName::new("  SEC 10-K Filing ").expect("valid name");
        assert_eq!(name.as_str(), "SEC 10-K Filing");
    }

    #[test]
    fn rejects_blank_names() {
        assert_eq!(
            SourceName::new("   ").expect_err("blank must fail"),
            ValidationError::EmptySourceName
        );
    }
}
