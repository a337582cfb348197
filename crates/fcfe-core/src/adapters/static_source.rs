use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::data_source::{SourceAdapter, SourceError, SourceFuture};
use crate::{FinancialInputSet, Ticker};

/// Source that answers every fetch with a fixed response.
///
/// Backs snapshot files and tests; an optional delay simulates slow
/// providers.
#[derive(Debug)]
pub struct StaticSource {
    name: String,
    response: Result<FinancialInputSet, SourceError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, inputs: FinancialInputSet) -> Self {
        Self::with_response(name, Ok(inputs))
    }

    pub fn failing(name: impl Into<String>, error: SourceError) -> Self {
        Self::with_response(name, Err(error))
    }

    pub fn with_response(
        name: impl Into<String>,
        response: Result<FinancialInputSet, SourceError>,
    ) -> Self {
        Self {
            name: name.into(),
            response,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of fetches served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SourceAdapter for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch<'a>(&'a self, _ticker: &'a Ticker) -> SourceFuture<'a> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.response.clone()
        })
    }
}
