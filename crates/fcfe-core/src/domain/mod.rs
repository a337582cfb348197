//! # Domain Models
//!
//! Data types flowing through the valuation pipeline.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Ticker`] | Validated equity ticker |
//! | [`SourceName`] | Label of a registered source |
//! | [`FinancialInputSet`] | Raw figures fetched from one source |
//! | [`ValuationAssumptions`] | Growth and discounting assumptions |
//! | [`ValuationResult`] | Per-source fair value breakdown |
//! | [`SourceFailure`] | Per-source failure record |
//!
//! Inputs are validated before they reach the engine; a value that fails
//! validation never produces a result.

mod assumptions;
mod inputs;
mod result;
mod source_name;
mod ticker;

pub use assumptions::{
    ValuationAssumptions, DEFAULT_GROWTH_RATE, DEFAULT_PROJECTION_YEARS,
    DEFAULT_TERMINAL_GROWTH_RATE, HISTORICAL_GROWTH_CAP, HISTORICAL_GROWTH_FLOOR, MAX_PROJECTION_YEARS,
};
pub use inputs::FinancialInputSet;
pub use result::{FailureReason, SourceFailure, ValuationResult};
pub use source_name::SourceName;
pub use ticker::Ticker;
