use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_ROOT_LEN: usize = 5;
const MAX_CLASS_LEN: usize = 2;

/// Normalized equity ticker.
///
/// One to five ASCII letters, optionally followed by a share-class suffix
/// separated by `.` or `-` (`BRK.B`, `BF-A`). Normalized to uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTicker);
        }

        let normalized = trimmed.to_ascii_uppercase();
        let (root, class) = match normalized.find(['.', '-']) {
            Some(split) => (&normalized[..split], Some(&normalized[split + 1..])),
            None => (normalized.as_str(), None),
        };

        if let Some(first) = root.chars().next() {
            if !first.is_ascii_alphabetic() {
                return Err(ValidationError::TickerInvalidStart { ch: first });
            }
        } else {
            return Err(ValidationError::EmptyTicker);
        }

        for (index, ch) in root.chars().enumerate() {
            if !ch.is_ascii_alphabetic() {
                return Err(ValidationError::TickerInvalidChar { ch, index });
            }
        }

        let len = root.chars().count();
        if len > MAX_ROOT_LEN {
            return Err(ValidationError::TickerTooLong {
                len,
                max: MAX_ROOT_LEN,
            });
        }

        if let Some(class) = class {
            let valid = !class.is_empty()
                && class.len() <= MAX_CLASS_LEN
                && class.chars().all(|ch| ch.is_ascii_alphabetic());
            if !valid {
                return Err(ValidationError::TickerInvalidClass {
                    suffix: class.to_owned(),
                });
            }
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Ticker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Ticker {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Ticker {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Ticker> for String {
    fn from(value: Ticker) -> Self {
        value.0
    }
}
