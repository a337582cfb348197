//! JSON company snapshots standing in for live provider adapters.
//!
//! ```json
//! {
//!   "company_name": "Apple Inc.",
//!   "current_price": 187.5,
//!   "sources": [
//!     { "name": "Yahoo Finance", "inputs": { "net_income": 96995000000.0, "...": 0 } },
//!     { "name": "SEC 10-K Filing", "failure": { "kind": "not_implemented", "message": "..." } }
//!   ]
//! }
//! ```
//!
//! Each entry becomes one [`StaticSource`], in file order. Entry figures are
//! decoded per source, so a malformed entry replays as a `parse_failure` for
//! that source alone instead of rejecting the file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fcfe_core::{FinancialInputSet, SourceError, SourceErrorKind, StaticSource, Ticker};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::CliError;

pub const SNAPSHOT_DIR: &str = "snapshots";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanySnapshot {
    pub company_name: String,
    pub current_price: f64,
    pub sources: Vec<SnapshotSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSource {
    pub name: String,
    /// Raw figures, decoded into [`FinancialInputSet`] per source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<SnapshotFailure>,
}

/// Recorded provider failure, replayed as a [`SourceError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotFailure {
    pub kind: SourceErrorKind,
    #[serde(default)]
    pub message: String,
}

impl SnapshotFailure {
    fn to_source_error(&self) -> SourceError {
        let message = self.message.clone();
        match self.kind {
            SourceErrorKind::DataUnavailable => SourceError::data_unavailable(message),
            SourceErrorKind::ParseFailure => SourceError::parse_failure(message),
            SourceErrorKind::RateLimited => SourceError::rate_limited(message),
            SourceErrorKind::NotImplemented => SourceError::not_implemented(message),
        }
    }
}

impl SnapshotSource {
    /// What a fetch from this entry returns.
    pub fn response(&self) -> Result<FinancialInputSet, SourceError> {
        match (&self.inputs, &self.failure) {
            (Some(raw), None) => FinancialInputSet::deserialize(raw).map_err(|error| {
                SourceError::parse_failure(format!("malformed inputs: {error}"))
            }),
            (None, Some(failure)) => Err(failure.to_source_error()),
            _ => Err(SourceError::parse_failure(
                "entry must have exactly one of 'inputs' or 'failure'",
            )),
        }
    }
}

impl CompanySnapshot {
    /// Builds one adapter per entry, preserving file order.
    pub fn adapters(&self) -> Vec<StaticSource> {
        self.sources
            .iter()
            .map(|source| {
                let response = source.response();
                if let Err(error) = &response {
                    if error.kind() == SourceErrorKind::ParseFailure {
                        warn!(source = %source.name, error = %error, "snapshot entry unusable");
                    }
                }
                StaticSource::with_response(&source.name, response)
            })
            .collect()
    }

    /// Named source with usable figures, or the first such source when
    /// `name` is `None`.
    pub fn inputs_for(&self, name: Option<&str>) -> Option<(&str, FinancialInputSet)> {
        self.sources
            .iter()
            .filter(|source| name.map_or(true, |wanted| source.name == wanted))
            .find_map(|source| {
                source
                    .response()
                    .ok()
                    .map(|inputs| (source.name.as_str(), inputs))
            })
    }
}

pub fn default_path(ticker: &Ticker) -> PathBuf {
    Path::new(SNAPSHOT_DIR).join(format!("{ticker}.json"))
}

pub fn load(path: &Path) -> Result<CompanySnapshot, CliError> {
    let raw = fs::read_to_string(path).map_err(|error| match error.kind() {
        ErrorKind::NotFound => CliError::SnapshotNotFound {
            path: path.to_path_buf(),
        },
        _ => CliError::Io(error),
    })?;

    let snapshot = serde_json::from_str::<CompanySnapshot>(&raw).map_err(|error| {
        CliError::InvalidSnapshot {
            path: path.to_path_buf(),
            message: error.to_string(),
        }
    })?;

    debug!(
        path = %path.display(),
        sources = snapshot.sources.len(),
        "snapshot loaded"
    );
    Ok(snapshot)
}
