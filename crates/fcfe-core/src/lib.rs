//! # FCFE Core
//!
//! Multi-source Free Cash Flow to Equity valuation.
//!
//! ## Overview
//!
//! Each configured source supplies one [`FinancialInputSet`] for a ticker.
//! The [`FcfeEngine`] turns it into a per-share fair value with a
//! discounted-cash-flow model, and the [`ValuationOrchestrator`] runs every
//! source, contains per-source failures and aggregates the survivors into an
//! [`AggregateReport`].
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Fixture adapter backed by in-memory data |
//! | [`data_source`] | Source adapter trait and its error type |
//! | [`domain`] | Tickers, inputs, assumptions, results |
//! | [`engine`] | FCFE DCF computation |
//! | [`error`] | Validation, valuation and configuration errors |
//! | [`orchestrator`] | Per-run source scheduling and aggregation |
//! | [`report`] | Cross-source summary |
//! | [`sensitivity`] | Growth and discount-rate grids |
//! | [`settings`] | Defaults and `FCFE_*` environment overrides |
//! | [`throttling`] | Shared request quotas |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fcfe_core::{StaticSource, Ticker, ValuationOrchestrator, ValuationSettings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = ValuationSettings::from_env()?;
//!     let orchestrator = ValuationOrchestrator::builder()
//!         .with_source(StaticSource::new("Yahoo Finance", inputs))
//!         .with_settings(&settings)
//!         .build()?;
//!
//!     let ticker = Ticker::parse("AAPL")?;
//!     let report = orchestrator
//!         .run(&ticker, "Apple Inc.", 187.5, &settings.assumptions())
//!         .await?;
//!
//!     match report.average_fair_value {
//!         Some(value) => println!("fair value: ${value:.2}"),
//!         None => println!("no source produced a valuation"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │ ValuationOrchestrator│
//! └──────────┬───────────┘
//!            │ fetch (timeout per source)
//!            ▼
//! ┌──────────────────────┐     ┌──────────────────┐
//! │ SourceAdapter        │────▶│ ThrottledSource  │
//! └──────────┬───────────┘     └──────────────────┘
//!            │ FinancialInputSet
//!            ▼
//! ┌──────────────────────┐
//! │ FcfeEngine           │
//! └──────────┬───────────┘
//!            │ ValuationResult | SourceFailure
//!            ▼
//! ┌──────────────────────┐
//! │ AggregateReport      │
//! └──────────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Only [`ConfigurationError`] aborts a run. Fetch failures
//! ([`SourceError`]) and computation failures ([`ValuationError`]) are
//! recorded per source:
//!
//! ```rust
//! use fcfe_core::{FailureReason, SourceError, SourceErrorKind};
//!
//! let error = SourceError::rate_limited("quota spent");
//! assert_eq!(error.kind(), SourceErrorKind::RateLimited);
//! assert_eq!(FailureReason::from(error.kind()), FailureReason::RateLimited);
//! ```

pub mod adapters;
pub mod data_source;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod report;
pub mod sensitivity;
pub mod settings;
pub mod throttling;

// Adapters
pub use adapters::StaticSource;

// Source contract
pub use data_source::{SourceAdapter, SourceError, SourceErrorKind, SourceFuture};

// Domain models
pub use domain::{
    FailureReason, FinancialInputSet, SourceFailure, SourceName, Ticker, ValuationAssumptions,
    ValuationResult, DEFAULT_GROWTH_RATE, DEFAULT_PROJECTION_YEARS, DEFAULT_TERMINAL_GROWTH_RATE,
    HISTORICAL_GROWTH_CAP, HISTORICAL_GROWTH_FLOOR, MAX_PROJECTION_YEARS,
};

// Engine
pub use engine::FcfeEngine;

// Error types
pub use error::{ConfigurationError, ValidationError, ValuationError};

// Orchestration
pub use orchestrator::{
    ExecutionMode, SourceOutcome, ValuationOrchestrator, ValuationOrchestratorBuilder,
    DEFAULT_SOURCE_TIMEOUT,
};

// Reporting
pub use report::{AggregateReport, Dispersion, ReportStatus};

// Sensitivity
pub use sensitivity::{
    DiscountRateRow, SensitivityAnalysis, SensitivityPoint, SensitivityReport,
    BASE_CASE_GROWTH_RATE, DEFAULT_SENSITIVITY_GROWTH_RATES,
};

// Settings
pub use settings::ValuationSettings;

// Throttling
pub use throttling::{SharedQuota, ThrottledSource};
