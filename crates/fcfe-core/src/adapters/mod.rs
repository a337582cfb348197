//! Source adapters shipped with the core crate.
//!
//! Live providers live outside the core; [`StaticSource`] answers from
//! in-memory data and backs both snapshot files and tests.

mod static_source;

pub use static_source::StaticSource;
