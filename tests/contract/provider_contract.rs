use std::future::Future;
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

use marketpulse_tests::{
    AlphaVantageAdapter, Arc, Capability, CoinMarketCapAdapter, DataSource, FlippaAdapter,
    GoDaddyAdapter, ProviderId, ReliabilityTier, SourceErrorKind, Symbol,
};

#[derive(Clone)]
struct ProviderCase {
    id: ProviderId,
    source: Arc<dyn DataSource>,
    supports_quotes: bool,
    supports_market_data: bool,
    supports_opportunities: bool,
    supports_availability: bool,
}

fn provider_cases() -> Vec<ProviderCase> {
    vec![
        ProviderCase {
            id: ProviderId::Alphavantage,
            source: Arc::new(AlphaVantageAdapter::default()),
            supports_quotes: true,
            supports_market_data: false,
            supports_opportunities: false,
            supports_availability: false,
        },
        ProviderCase {
            id: ProviderId::Coinmarketcap,
            source: Arc::new(CoinMarketCapAdapter::default()),
            supports_quotes: false,
            supports_market_data: true,
            supports_opportunities: false,
            supports_availability: false,
        },
        ProviderCase {
            id: ProviderId::Flippa,
            source: Arc::new(FlippaAdapter::default()),
            supports_quotes: false,
            supports_market_data: false,
            supports_opportunities: true,
            supports_availability: false,
        },
        ProviderCase {
            id: ProviderId::Godaddy,
            source: Arc::new(GoDaddyAdapter::default()),
            supports_quotes: false,
            supports_market_data: false,
            supports_opportunities: true,
            supports_availability: true,
        },
    ]
}

#[test]
fn default_adapters_are_mocked_and_identify_themselves() {
    for case in provider_cases() {
        let provider = case.source.provider();
        assert_eq!(provider.id, case.id, "provider id");
        assert_eq!(
            provider.tier,
            ReliabilityTier::Mocked,
            "provider '{}': default tier",
            case.id
        );
        assert!(provider.rate_limit.requests > 0, "provider '{}': rate limit", case.id);
    }
}

#[test]
fn advertised_capabilities_match_implemented_methods() {
    for case in provider_cases() {
        let capabilities = case.source.provider().capabilities;
        assert_eq!(
            capabilities.supports(Capability::Quotes),
            case.supports_quotes,
            "provider '{}': quotes capability",
            case.id
        );
        assert_eq!(
            capabilities.supports(Capability::GlobalMetrics),
            case.supports_market_data,
            "provider '{}': global metrics capability",
            case.id
        );
        assert_eq!(
            capabilities.supports(Capability::Availability),
            case.supports_availability,
            "provider '{}': availability capability",
            case.id
        );
    }
}

#[test]
fn supported_methods_return_valid_data() {
    for case in provider_cases() {
        if case.supports_quotes {
            let quote = block_on(case.source.quote(Symbol::stock("AAPL").expect("valid symbol")))
                .unwrap_or_else(|error| panic!("provider '{}' quote failed: {error}", case.id));
            assert_eq!(quote.symbol.as_str(), "AAPL");
            assert!(quote.price > 0.0, "provider '{}': positive price", case.id);
        }

        if case.supports_market_data {
            let global = block_on(case.source.global_metrics("USD"))
                .unwrap_or_else(|error| panic!("provider '{}' global failed: {error}", case.id));
            assert_eq!(global.currency, "USD");

            let listings = block_on(case.source.listings("USD", 3))
                .unwrap_or_else(|error| panic!("provider '{}' listings failed: {error}", case.id));
            assert_eq!(listings.len(), 3, "provider '{}': listings limit", case.id);
        }

        if case.supports_opportunities {
            let listings = block_on(case.source.opportunities(None)).unwrap_or_else(|error| {
                panic!("provider '{}' opportunities failed: {error}", case.id)
            });
            assert!(!listings.is_empty(), "provider '{}': opportunities", case.id);
        }

        if case.supports_availability {
            let availability = block_on(case.source.availability(String::from("example.com")))
                .unwrap_or_else(|error| {
                    panic!("provider '{}' availability failed: {error}", case.id)
                });
            assert_eq!(availability.domain, "example.com");
            assert_eq!(availability.available, availability.price.is_some());
        }
    }
}

#[test]
fn unsupported_methods_return_expected_error() {
    for case in provider_cases() {
        if !case.supports_quotes {
            let error = block_on(case.source.quote(Symbol::stock("AAPL").expect("valid symbol")))
                .expect_err("quote should be unsupported");
            assert_eq!(
                error.kind(),
                SourceErrorKind::UnsupportedCapability,
                "provider '{}': quote",
                case.id
            );
        }

        if !case.supports_market_data {
            let error =
                block_on(case.source.global_metrics("USD")).expect_err("global should be unsupported");
            assert_eq!(
                error.kind(),
                SourceErrorKind::UnsupportedCapability,
                "provider '{}': global metrics",
                case.id
            );
        }

        if !case.supports_opportunities {
            let error = block_on(case.source.opportunities(None))
                .expect_err("opportunities should be unsupported");
            assert_eq!(
                error.kind(),
                SourceErrorKind::UnsupportedCapability,
                "provider '{}': opportunities",
                case.id
            );
        }

        if !case.supports_availability {
            let error = block_on(case.source.availability(String::from("example.com")))
                .expect_err("availability should be unsupported");
            assert_eq!(
                error.kind(),
                SourceErrorKind::UnsupportedCapability,
                "provider '{}': availability",
                case.id
            );
        }
    }
}

#[test]
fn mocked_data_is_deterministic_across_calls() {
    for case in provider_cases() {
        if case.supports_quotes {
            let symbol = Symbol::stock("MSFT").expect("valid symbol");
            let first = block_on(case.source.quote(symbol.clone())).expect("quote");
            let second = block_on(case.source.quote(symbol)).expect("quote");
            assert_eq!(first.price, second.price, "provider '{}': quote", case.id);
        }

        if case.supports_availability {
            let first = block_on(case.source.availability(String::from("pulse.dev"))).expect("check");
            let second = block_on(case.source.availability(String::from("pulse.dev"))).expect("check");
            assert_eq!(first, second, "provider '{}': availability", case.id);
        }
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
