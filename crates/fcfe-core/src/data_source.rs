//! Source adapter contract and its error type.
//!
//! Every data provider (market-data API, filing parser, web scraper, fixture)
//! implements [`SourceAdapter`]. The orchestrator only sees this trait, so
//! adding a provider is a matter of registering another adapter.
//!
//! # Example
//!
//! ```rust,ignore
//! use fcfe_core::{FinancialInputSet, SourceAdapter, SourceError, SourceFuture, Ticker};
//!
//! struct FilingsAdapter;
//!
//! impl SourceAdapter for FilingsAdapter {
//!     fn name(&self) -> &str {
//!         "SEC 10-K Filing"
//!     }
//!
//!     fn fetch<'a>(&'a self, _ticker: &'a Ticker) -> SourceFuture<'a> {
//!         Box::pin(async move {
//!             Err(SourceError::not_implemented("automated 10-K parsing is not wired up"))
//!         })
//!     }
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{FinancialInputSet, Ticker};

/// Adapter-level failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceErrorKind {
    DataUnavailable,
    ParseFailure,
    RateLimited,
    NotImplemented,
}

/// Structured failure returned by a source adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn data_unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::DataUnavailable,
            message: message.into(),
        }
    }

    pub fn parse_failure(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::ParseFailure,
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
        }
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NotImplemented,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::DataUnavailable => "source.data_unavailable",
            SourceErrorKind::ParseFailure => "source.parse_failure",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::NotImplemented => "source.not_implemented",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Boxed future returned by [`SourceAdapter::fetch`].
pub type SourceFuture<'a> =
    Pin<Box<dyn Future<Output = Result<FinancialInputSet, SourceError>> + Send + 'a>>;

/// Capability every valuation source provides.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the orchestrator may call several
/// adapters concurrently.
pub trait SourceAdapter: Send + Sync {
    /// Display label, used in results and failure records.
    fn name(&self) -> &str;

    /// Fetches the current financial snapshot for `ticker`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the provider has no data, its payload
    /// cannot be parsed, its quota is exhausted, or it is not wired up.
    /// The `current_price` of a successful result is ignored by the
    /// orchestrator.
    fn fetch<'a>(&'a self, ticker: &'a Ticker) -> SourceFuture<'a>;
}
