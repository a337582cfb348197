use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::data_source::SourceAdapter;
use crate::{
    AggregateReport, ConfigurationError, FailureReason, FcfeEngine, SourceFailure, SourceName,
    Ticker, ValuationAssumptions, ValuationResult, ValuationSettings,
};

pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(10);

/// How sources are scheduled within one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One source after another, in declared order.
    #[default]
    Sequential,
    /// All sources at once; results are re-ordered by declared index.
    Concurrent,
}

/// Result-or-failure of a single source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome {
    Valued(ValuationResult),
    Failed(SourceFailure),
}

/// Progress of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunPhase {
    Pending,
    Running { source_index: usize },
    Completed,
}

/// Per-run state, created by [`ValuationOrchestrator::run`] and consumed into the report.
#[derive(Debug)]
struct RunAccumulator {
    phase: RunPhase,
    outcomes: Vec<(usize, SourceOutcome)>,
}

impl RunAccumulator {
    fn new(source_count: usize) -> Self {
        Self {
            phase: RunPhase::Pending,
            outcomes: Vec::with_capacity(source_count),
        }
    }

    fn begin(&mut self, source_index: usize) {
        debug_assert_ne!(self.phase, RunPhase::Completed);
        self.phase = RunPhase::Running { source_index };
    }

    fn record(&mut self, source_index: usize, outcome: SourceOutcome) {
        self.outcomes.push((source_index, outcome));
    }

    fn has_outcome(&self, source_index: usize) -> bool {
        self.outcomes.iter().any(|(index, _)| *index == source_index)
    }

    fn complete(
        mut self,
        company_name: String,
        ticker: Ticker,
        current_price: f64,
        assumptions: ValuationAssumptions,
    ) -> AggregateReport {
        self.phase = RunPhase::Completed;
        self.outcomes.sort_by_key(|(index, _)| *index);

        let mut results = Vec::new();
        let mut failures = Vec::new();
        for (_, outcome) in self.outcomes {
            match outcome {
                SourceOutcome::Valued(result) => results.push(result),
                SourceOutcome::Failed(failure) => failures.push(failure),
            }
        }

        AggregateReport::new(
            company_name,
            ticker,
            current_price,
            assumptions,
            results,
            failures,
        )
    }
}

#[derive(Clone)]
struct RegisteredSource {
    name: SourceName,
    adapter: Arc<dyn SourceAdapter>,
}

/// Queries every registered source once, values each success and aggregates.
///
/// A failing source is recorded and skipped; only run-level misconfiguration
/// is returned as an error.
pub struct ValuationOrchestrator {
    sources: Vec<RegisteredSource>,
    engine: FcfeEngine,
    source_timeout: Duration,
    mode: ExecutionMode,
}

/// Builder for [`ValuationOrchestrator`].
///
/// # Example
///
/// ```rust,ignore
/// use fcfe_core::{ExecutionMode, StaticSource, ValuationOrchestrator};
///
/// let orchestrator = ValuationOrchestrator::builder()
///     .with_source(StaticSource::new("Yahoo Finance", inputs))
///     .with_source(StaticSource::failing("SEC 10-K Filing", error))
///     .with_mode(ExecutionMode::Concurrent)
///     .build()?;
/// ```
pub struct ValuationOrchestratorBuilder {
    sources: Vec<Arc<dyn SourceAdapter>>,
    source_timeout: Duration,
    mode: ExecutionMode,
}

impl Default for ValuationOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ValuationOrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
            mode: ExecutionMode::Sequential,
        }
    }

    /// Registers a source; sources are invoked and reported in registration order.
    pub fn with_source(mut self, source: impl SourceAdapter + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    pub fn with_shared_source(mut self, source: Arc<dyn SourceAdapter>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Applies the scheduling part of run settings.
    pub fn with_settings(self, settings: &ValuationSettings) -> Self {
        self.with_timeout(settings.source_timeout)
            .with_mode(settings.mode)
    }

    /// # Errors
    ///
    /// Fails when an adapter reports a blank name.
    pub fn build(self) -> Result<ValuationOrchestrator, ConfigurationError> {
        let sources = self
            .sources
            .into_iter()
            .map(|adapter| -> Result<RegisteredSource, ConfigurationError> {
                Ok(RegisteredSource {
                    name: SourceName::new(adapter.name())?,
                    adapter,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ValuationOrchestrator {
            sources,
            engine: FcfeEngine::new(),
            source_timeout: self.source_timeout,
            mode: self.mode,
        })
    }
}

impl ValuationOrchestrator {
    pub fn builder() -> ValuationOrchestratorBuilder {
        ValuationOrchestratorBuilder::new()
    }

    pub fn source_names(&self) -> Vec<&SourceName> {
        self.sources.iter().map(|source| &source.name).collect()
    }

    pub const fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Runs one valuation over every registered source.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError`] when no source is registered, the current price
    /// is not a positive finite number, or `projection_years` is zero or above
    /// [`MAX_PROJECTION_YEARS`](crate::MAX_PROJECTION_YEARS). Source
    /// and computation failures never surface here; they are recorded in
    /// the report.
    pub async fn run(
        &self,
        ticker: &Ticker,
        company_name: impl Into<String>,
        current_price: f64,
        assumptions: &ValuationAssumptions,
    ) -> Result<AggregateReport, ConfigurationError> {
        if self.sources.is_empty() {
            return Err(ConfigurationError::NoSources);
        }
        if !current_price.is_finite() || current_price <= 0.0 {
            return Err(ConfigurationError::InvalidCurrentPrice {
                value: current_price,
            });
        }
        assumptions.check_horizon()?;

        info!(
            ticker = %ticker,
            sources = self.sources.len(),
            mode = ?self.mode,
            current_price,
            "valuation run started"
        );

        let mut accumulator = RunAccumulator::new(self.sources.len());
        match self.mode {
            ExecutionMode::Sequential => {
                self.run_sequential(&mut accumulator, ticker, current_price, assumptions)
                    .await
            }
            ExecutionMode::Concurrent => {
                self.run_concurrent(&mut accumulator, ticker, current_price, assumptions)
                    .await
            }
        }

        let report = accumulator.complete(
            company_name.into(),
            ticker.clone(),
            current_price,
            assumptions.clone(),
        );

        info!(
            ticker = %ticker,
            succeeded = report.results.len(),
            failed = report.failures.len(),
            average_fair_value = ?report.average_fair_value,
            "valuation run completed"
        );

        Ok(report)
    }

    async fn run_sequential(
        &self,
        accumulator: &mut RunAccumulator,
        ticker: &Ticker,
        current_price: f64,
        assumptions: &ValuationAssumptions,
    ) {
        for (index, source) in self.sources.iter().enumerate() {
            accumulator.begin(index);
            let outcome = evaluate_source(
                self.engine,
                source,
                ticker,
                current_price,
                assumptions,
                self.source_timeout,
            )
            .await;
            accumulator.record(index, outcome);
        }
    }

    async fn run_concurrent(
        &self,
        accumulator: &mut RunAccumulator,
        ticker: &Ticker,
        current_price: f64,
        assumptions: &ValuationAssumptions,
    ) {
        let mut tasks = JoinSet::new();
        for (index, source) in self.sources.iter().enumerate() {
            accumulator.begin(index);
            let source = source.clone();
            let ticker = ticker.clone();
            let assumptions = assumptions.clone();
            let engine = self.engine;
            let timeout = self.source_timeout;
            tasks.spawn(async move {
                let outcome = evaluate_source(
                    engine,
                    &source,
                    &ticker,
                    current_price,
                    &assumptions,
                    timeout,
                )
                .await;
                (index, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => accumulator.record(index, outcome),
                Err(error) => warn!(error = %error, "source task aborted"),
            }
        }

        // A task that panicked never reported back; record it against its source.
        for (index, source) in self.sources.iter().enumerate() {
            if !accumulator.has_outcome(index) {
                accumulator.record(
                    index,
                    SourceOutcome::Failed(SourceFailure::new(
                        source.name.clone(),
                        FailureReason::DataUnavailable,
                        "source task aborted before returning",
                    )),
                );
            }
        }
    }
}

async fn evaluate_source(
    engine: FcfeEngine,
    source: &RegisteredSource,
    ticker: &Ticker,
    current_price: f64,
    assumptions: &ValuationAssumptions,
    timeout: Duration,
) -> SourceOutcome {
    let name = &source.name;
    debug!(source = %name, ticker = %ticker, "fetching source inputs");

    let inputs = match tokio::time::timeout(timeout, source.adapter.fetch(ticker)).await {
        Ok(Ok(inputs)) => inputs,
        Ok(Err(error)) => {
            warn!(source = %name, reason = error.code(), error = %error, "source fetch failed");
            return SourceOutcome::Failed(SourceFailure::from_source_error(name.clone(), &error));
        }
        Err(_) => {
            let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            warn!(source = %name, timeout_ms, "source fetch timed out");
            return SourceOutcome::Failed(SourceFailure::new(
                name.clone(),
                FailureReason::Timeout,
                format!("no response within {timeout_ms} ms"),
            ));
        }
    };

    let inputs = inputs.with_current_price(current_price);
    match engine.compute(name, &inputs, assumptions) {
        Ok(result) => SourceOutcome::Valued(result),
        Err(error) => {
            warn!(source = %name, error = %error, "valuation computation failed");
            SourceOutcome::Failed(SourceFailure::from_valuation_error(name.clone(), &error))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::StaticSource;
    use crate::{FinancialInputSet, SourceError};

    fn inputs(net_income: f64) -> FinancialInputSet {
        FinancialInputSet {
            net_income,
            depreciation_amortization: 20.0,
            capital_expenditures: 30.0,
            working_capital_change: 5.0,
            net_borrowing: 10.0,
            shares_outstanding: 100,
            beta: 1.0,
            risk_free_rate: 0.04,
            market_risk_premium: 0.05,
            current_price: 0.0,
            historical_growth_rate: None,
        }
    }

    fn ticker() -> Ticker {
        Ticker::parse("AAPL").expect("valid ticker")
    }

    #[test]
    fn accumulator_orders_outcomes_by_declared_index() {
        let failure = |name: &str| {
            SourceOutcome::Failed(SourceFailure::new(
                SourceName::new(name).expect("valid"),
                FailureReason::Timeout,
                "",
            ))
        };

        let mut accumulator = RunAccumulator::new(3);
        assert_eq!(accumulator.phase, RunPhase::Pending);
        accumulator.begin(2);
        assert_eq!(accumulator.phase, RunPhase::Running { source_index: 2 });
        accumulator.record(2, failure("c"));
        accumulator.record(0, failure("a"));
        accumulator.record(1, failure("b"));

        let report = accumulator.complete(
            String::from("Apple"),
            ticker(),
            10.0,
            ValuationAssumptions::default(),
        );
        let names = report
            .failures
            .iter()
            .map(|failure| failure.source_name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn blank_adapter_names_fail_the_build() {
        let result = ValuationOrchestrator::builder()
            .with_source(StaticSource::new(" ", inputs(100.0)))
            .build();
        assert!(matches!(
            result,
            Err(ConfigurationError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn empty_source_list_is_fatal() {
        let orchestrator = ValuationOrchestrator::builder()
            .build()
            .expect("builder accepts no sources");
        let err = orchestrator
            .run(&ticker(), "Apple", 10.0, &ValuationAssumptions::default())
            .await
            .expect_err("no sources must fail");
        assert_eq!(err, ConfigurationError::NoSources);
    }

    #[tokio::test]
    async fn zero_price_is_fatal() {
        let orchestrator = ValuationOrchestrator::builder()
            .with_source(StaticSource::new("a", inputs(100.0)))
            .build()
            .expect("valid");
        let err = orchestrator
            .run(&ticker(), "Apple", 0.0, &ValuationAssumptions::default())
            .await
            .expect_err("zero price must fail");
        assert!(matches!(err, ConfigurationError::InvalidCurrentPrice { .. }));
    }

    #[tokio::test]
    async fn run_level_price_replaces_source_price() {
        let mut fetched = inputs(100.0);
        fetched.current_price = 999.0;
        let orchestrator = ValuationOrchestrator::builder()
            .with_source(StaticSource::new("a", fetched))
            .build()
            .expect("valid");

        let report = orchestrator
            .run(&ticker(), "Apple", 12.5, &ValuationAssumptions::default())
            .await
            .expect("run completes");

        assert_eq!(report.results[0].current_price, 12.5);
    }

    #[tokio::test]
    async fn computation_errors_are_contained() {
        let orchestrator = ValuationOrchestrator::builder()
            .with_source(StaticSource::new("ok", inputs(100.0)))
            .with_source(StaticSource::failing(
                "broken",
                SourceError::parse_failure("bad payload"),
            ))
            .build()
            .expect("valid");

        let assumptions = ValuationAssumptions::default()
            .with_cost_of_equity(0.02)
            .with_terminal_growth_rate(0.025);
        let report = orchestrator
            .run(&ticker(), "Apple", 10.0, &assumptions)
            .await
            .expect("run completes");

        assert!(report.results.is_empty());
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].reason, FailureReason::ComputationError);
        assert_eq!(report.failures[1].reason, FailureReason::ParseFailure);
    }
}
