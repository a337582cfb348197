use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};
use std::time::Duration;

use fcfe_core::{
    FailureReason, FinancialInputSet, SharedQuota, SourceAdapter, SourceError, SourceErrorKind,
    SourceFailure, SourceName, StaticSource, ThrottledSource, Ticker,
};

#[derive(Clone)]
struct SourceCase {
    label: &'static str,
    source: Arc<dyn SourceAdapter>,
    expected_failure: Option<SourceErrorKind>,
}

fn inputs() -> FinancialInputSet {
    FinancialInputSet {
        net_income: 96_995_000_000.0,
        depreciation_amortization: 11_519_000_000.0,
        capital_expenditures: 10_959_000_000.0,
        working_capital_change: -1_200_000_000.0,
        net_borrowing: -5_000_000_000.0,
        shares_outstanding: 15_550_000_000,
        beta: 1.24,
        risk_free_rate: 0.045,
        market_risk_premium: 0.055,
        current_price: 0.0,
        historical_growth_rate: Some(0.08),
    }
}

fn source_cases() -> Vec<SourceCase> {
    vec![
        SourceCase {
            label: "static inputs",
            source: Arc::new(StaticSource::new("Yahoo Finance", inputs())),
            expected_failure: None,
        },
        SourceCase {
            label: "not implemented",
            source: Arc::new(StaticSource::failing(
                "SEC 10-K Filing",
                SourceError::not_implemented("automated 10-K parsing unavailable"),
            )),
            expected_failure: Some(SourceErrorKind::NotImplemented),
        },
        SourceCase {
            label: "data unavailable",
            source: Arc::new(StaticSource::failing(
                "Finviz",
                SourceError::data_unavailable("cash flow statement missing"),
            )),
            expected_failure: Some(SourceErrorKind::DataUnavailable),
        },
        SourceCase {
            label: "parse failure",
            source: Arc::new(StaticSource::failing(
                "Macrotrends",
                SourceError::parse_failure("unexpected page layout"),
            )),
            expected_failure: Some(SourceErrorKind::ParseFailure),
        },
        SourceCase {
            label: "throttled with quota",
            source: Arc::new(ThrottledSource::new(
                StaticSource::new("GuruFocus", inputs()),
                SharedQuota::new(Duration::from_secs(60), 10),
            )),
            expected_failure: None,
        },
        SourceCase {
            label: "throttled without quota",
            source: Arc::new(exhausted_throttled_source()),
            expected_failure: Some(SourceErrorKind::RateLimited),
        },
    ]
}

fn exhausted_throttled_source() -> ThrottledSource<StaticSource> {
    let quota = SharedQuota::new(Duration::from_secs(3_600), 1);
    quota.try_acquire().expect("first slot is free");
    ThrottledSource::new(StaticSource::new("Morningstar", inputs()), quota)
}

#[test]
fn every_source_reports_a_usable_name() {
    for case in source_cases() {
        let name = SourceName::new(case.source.name())
            .unwrap_or_else(|error| panic!("case '{}': invalid name: {error}", case.label));
        assert_eq!(
            name.as_str(),
            case.source.name(),
            "case '{}': name must already be trimmed",
            case.label
        );
    }
}

#[test]
fn fetch_returns_valid_inputs_or_a_categorized_error() {
    let ticker = Ticker::parse("AAPL").expect("valid ticker");

    for case in source_cases() {
        let outcome = block_on(case.source.fetch(&ticker));
        match (outcome, case.expected_failure) {
            (Ok(inputs), None) => {
                inputs
                    .validate()
                    .unwrap_or_else(|error| panic!("case '{}': invalid inputs: {error}", case.label));
                assert!(
                    inputs.shares_outstanding > 0,
                    "case '{}': shares outstanding",
                    case.label
                );
            }
            (Err(error), Some(expected)) => {
                assert_eq!(error.kind(), expected, "case '{}': error kind", case.label);
                assert!(
                    error.code().starts_with("source."),
                    "case '{}': error code '{}'",
                    case.label,
                    error.code()
                );
                assert!(
                    !error.message().is_empty(),
                    "case '{}': error message",
                    case.label
                );
            }
            (Ok(_), Some(expected)) => {
                panic!("case '{}': expected {expected:?} failure", case.label)
            }
            (Err(error), None) => panic!("case '{}': unexpected failure: {error}", case.label),
        }
    }
}

#[test]
fn fetch_errors_convert_into_failure_records() {
    let ticker = Ticker::parse("AAPL").expect("valid ticker");

    for case in source_cases() {
        let Some(expected) = case.expected_failure else {
            continue;
        };
        let error = block_on(case.source.fetch(&ticker)).expect_err("failing case");
        let name = SourceName::new(case.source.name()).expect("valid name");

        let failure = SourceFailure::from_source_error(name, &error);
        assert_eq!(
            failure.reason,
            FailureReason::from(expected),
            "case '{}': failure reason",
            case.label
        );
        assert_eq!(failure.detail, error.message(), "case '{}': detail", case.label);
    }
}

fn block_on<F>(future: F) -> F::Output
where
    F: Future,
{
    let waker = noop_waker();
    let mut context = Context::from_waker(&waker);
    let mut future = std::pin::pin!(future);

    loop {
        match future.as_mut().poll(&mut context) {
            Poll::Ready(output) => return output,
            Poll::Pending => std::thread::yield_now(),
        }
    }
}

fn noop_waker() -> Waker {
    // SAFETY: The vtable functions never dereference the data pointer and are no-op operations.
    unsafe { Waker::from_raw(noop_raw_waker()) }
}

fn noop_raw_waker() -> RawWaker {
    RawWaker::new(std::ptr::null(), &NOOP_RAW_WAKER_VTABLE)
}

unsafe fn noop_raw_waker_clone(_: *const ()) -> RawWaker {
    noop_raw_waker()
}

unsafe fn noop_raw_waker_wake(_: *const ()) {}

unsafe fn noop_raw_waker_wake_by_ref(_: *const ()) {}

unsafe fn noop_raw_waker_drop(_: *const ()) {}

static NOOP_RAW_WAKER_VTABLE: RawWakerVTable = RawWakerVTable::new(
    noop_raw_waker_clone,
    noop_raw_waker_wake,
    noop_raw_waker_wake_by_ref,
    noop_raw_waker_drop,
);
