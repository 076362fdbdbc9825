//! End-to-end registry behavior over the simple backend

use std::sync::{Arc, Mutex};
use std::time::Duration;

use vernier::{
    AcceptPolicy, Counter, DistributionStatisticConfig, Id, MeterBackend, MeterError, MeterFilter,
    MeterRegistry, MeterType, MetricsResult, PauseDetector, RegistryConfig, SimpleBackend, Tag,
    Timer, ValueSupplier, new_registry,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("vernier_core=debug")
        .with_test_writer()
        .try_init();
}

#[test]
fn deny_filter_yields_a_noop_counter() {
    init_tracing();
    let registry = new_registry();
    registry.add_filter(MeterFilter::deny_fn(|id| id.name().contains("jvm")));

    let denied = registry.counter("jvm.my.counter", []).unwrap();
    assert!(denied.is_noop());
    denied.increment();
    assert_eq!(denied.count(), 0.0);

    let allowed = registry.counter("my.counter", []).unwrap();
    assert!(!allowed.is_noop());

    // The denied meter never reaches the store.
    assert_eq!(registry.meters().len(), 1);
    assert!(registry.find("jvm.my.counter").counter().is_none());
}

#[test]
fn tag_stripping_filter_changes_the_stored_identity() {
    let registry = new_registry();
    registry.add_filter(MeterFilter::ignore_tags(["k1"]));

    registry
        .counter("my.counter", [Tag::new("k1", "v1")])
        .unwrap();

    assert!(registry.get("my.counter").counter().is_ok());
    assert!(
        registry
            .find("my.counter")
            .tag("k1", "v1")
            .counter()
            .is_none()
    );
}

#[test]
fn configure_filter_reaches_the_backend_factory() {
    // Backend double recording the config each timer was built with.
    struct AssertingBackend {
        inner: SimpleBackend,
        seen: Arc<Mutex<Option<DistributionStatisticConfig>>>,
    }

    impl MeterBackend for AssertingBackend {
        fn new_counter(&self, id: &Id) -> MetricsResult<Arc<dyn vernier::CounterHandle>> {
            self.inner.new_counter(id)
        }

        fn new_timer(
            &self,
            id: &Id,
            config: &DistributionStatisticConfig,
            pause_detector: &PauseDetector,
        ) -> MetricsResult<Arc<dyn vernier::TimerHandle>> {
            *self.seen.lock().unwrap() = Some(config.clone());
            self.inner.new_timer(id, config, pause_detector)
        }

        fn new_gauge(
            &self,
            id: &Id,
            supplier: ValueSupplier,
        ) -> MetricsResult<Arc<dyn vernier::GaugeHandle>> {
            self.inner.new_gauge(id, supplier)
        }

        fn new_summary(
            &self,
            id: &Id,
            config: &DistributionStatisticConfig,
        ) -> MetricsResult<Arc<dyn vernier::SummaryHandle>> {
            self.inner.new_summary(id, config)
        }
    }

    let seen = Arc::new(Mutex::new(None));
    let registry = MeterRegistry::new(AssertingBackend {
        inner: SimpleBackend::new(),
        seen: Arc::clone(&seen),
    });

    registry.add_filter(MeterFilter::configure_fn(|_, incoming| {
        DistributionStatisticConfig::builder()
            .percentiles([0.95])
            .percentile_histogram(true)
            .build()
            .merge(&incoming)
    }));

    registry.timer("my.timer", []).unwrap();

    let config = seen.lock().unwrap().clone().expect("timer was built");
    assert!(config.is_publishing_histogram());
    assert_eq!(config.percentiles(), &[0.95]);
}

#[test]
fn closed_registry_hands_out_noop_meters() {
    let registry = new_registry();

    let before = registry.timer("my.timer.before", []).unwrap();
    assert!(!before.is_noop());

    registry.close();
    assert!(registry.is_closed());
    // close() is idempotent.
    registry.close();

    // The meter that existed at close is still stored and usable.
    let again = registry.find("my.timer.before").timer().unwrap();
    assert_eq!(again, before);
    again.record(Duration::from_millis(5));
    assert_eq!(again.count(), 1);

    let after = registry.timer("my.timer.after", []).unwrap();
    assert!(after.is_noop());
    assert_eq!(registry.meters().len(), 1);
}

#[test]
fn remove_returns_the_meter_once() {
    let registry = new_registry();
    let counter = registry.counter("my.counter", []).unwrap();

    let found = registry.find("my.counter").counter().unwrap();
    assert_eq!(found, counter);

    let removed = registry
        .remove(&counter.clone().into())
        .and_then(|m| m.into_counter())
        .unwrap();
    assert_eq!(removed, counter);

    assert!(registry.find("my.counter").counter().is_none());
    assert!(registry.remove(&counter.into()).is_none());
}

#[test]
fn rename_filter_applies_before_storage_and_removal() {
    let registry = new_registry();
    registry.add_filter(MeterFilter::map_fn(|id| id.with_name("another.name")));

    let counter = registry.counter("name", []).unwrap();
    assert_eq!(counter.id().name(), "another.name");

    let found = registry.find("another.name").counter().unwrap();
    assert_eq!(found, counter);
    assert!(registry.find("name").counter().is_none());

    // Removal keys off the stored final id, not the requested one.
    assert!(registry.remove(&counter.into()).is_some());
    assert!(registry.find("another.name").counter().is_none());
}

#[test]
fn percentile_timer_registers_synthetic_gauges() {
    let registry = new_registry();
    let timer = Timer::builder("my.timer")
        .publish_percentiles([0.95])
        .register(&registry)
        .unwrap();

    assert_eq!(registry.meters().len(), 2);

    let percentile_gauge = registry
        .find("my.timer.percentile")
        .tag("phi", "0.95")
        .gauge()
        .expect("synthetic percentile gauge");
    timer.record(Duration::from_millis(100));
    assert!(percentile_gauge.value() > 0.0);

    registry.remove(&timer.into());
    assert!(registry.meters().is_empty());
}

#[test]
fn synthetic_cascade_survives_a_rename_filter() {
    let registry = new_registry();
    registry.add_filter(MeterFilter::map_fn(|id| id.with_name("another.name")));

    let timer = Timer::builder("my.timer")
        .publish_percentiles([0.95])
        .register(&registry)
        .unwrap();

    assert_eq!(registry.meters().len(), 2);
    registry.remove(&timer.into());
    assert!(registry.meters().is_empty());
}

#[test]
fn fetching_an_existing_composite_adds_no_children() {
    let registry = new_registry();
    let register = || {
        Timer::builder("my.timer")
            .publish_percentiles([0.5, 0.95])
            .register(&registry)
            .unwrap()
    };
    let first = register();
    assert_eq!(registry.meters().len(), 3);

    // Second registration fetches the parent; no duplicate children.
    let second = register();
    assert_eq!(second, first);
    assert_eq!(registry.meters().len(), 3);
}

#[test]
fn identity_conflict_fails_loudly() {
    let registry = new_registry();
    registry.counter("my.meter", []).unwrap();

    let err = registry.timer("my.meter", []).unwrap_err();
    assert_eq!(
        err,
        MeterError::IdentityConflict {
            name: "my.meter".into(),
            existing: MeterType::Counter,
            requested: MeterType::Timer,
        }
    );

    let err = registry.get("my.meter").timer().unwrap_err();
    assert!(matches!(err, MeterError::IdentityConflict { .. }));
}

#[test]
fn get_fails_loudly_on_absent_meters() {
    let registry = new_registry();
    let err = registry.get("nothing.here").counter().unwrap_err();
    assert_eq!(
        err,
        MeterError::MeterNotFound {
            name: "nothing.here".into()
        }
    );
}

#[test]
fn filter_fault_aborts_the_registration() {
    let registry = new_registry();
    registry.add_filter(
        MeterFilter::builder()
            .try_map(|id| Err(MeterError::filter(id.name(), "mapping broke")))
            .build(),
    );

    let err = registry.counter("my.counter", []).unwrap_err();
    assert_eq!(err, MeterError::filter("my.counter", "mapping broke"));
    assert!(registry.meters().is_empty());
}

#[test]
fn require_accept_policy_turns_neutral_into_noop() {
    let registry = MeterRegistry::with_config(
        SimpleBackend::new(),
        RegistryConfig {
            accept_policy: AcceptPolicy::RequireAccept,
            ..RegistryConfig::default()
        },
    );
    registry.add_filter(MeterFilter::accept_fn(|id| id.name().starts_with("app.")));

    assert!(registry.counter("other.counter", []).unwrap().is_noop());
    assert!(!registry.counter("app.counter", []).unwrap().is_noop());
    assert_eq!(registry.meters().len(), 1);
}

#[test]
fn failed_synthetic_child_rolls_back_the_composite() {
    // Backend that cannot build gauges: percentile children always fail.
    struct NoGaugeBackend(SimpleBackend);

    impl MeterBackend for NoGaugeBackend {
        fn new_counter(&self, id: &Id) -> MetricsResult<Arc<dyn vernier::CounterHandle>> {
            self.0.new_counter(id)
        }

        fn new_timer(
            &self,
            id: &Id,
            config: &DistributionStatisticConfig,
            pause_detector: &PauseDetector,
        ) -> MetricsResult<Arc<dyn vernier::TimerHandle>> {
            self.0.new_timer(id, config, pause_detector)
        }

        fn new_gauge(
            &self,
            id: &Id,
            _supplier: ValueSupplier,
        ) -> MetricsResult<Arc<dyn vernier::GaugeHandle>> {
            Err(MeterError::backend(
                id.name(),
                MeterType::Gauge,
                "gauges unsupported",
            ))
        }

        fn new_summary(
            &self,
            id: &Id,
            config: &DistributionStatisticConfig,
        ) -> MetricsResult<Arc<dyn vernier::SummaryHandle>> {
            self.0.new_summary(id, config)
        }
    }

    let registry = MeterRegistry::new(NoGaugeBackend(SimpleBackend::new()));
    let err = Timer::builder("my.timer")
        .publish_percentiles([0.95])
        .register(&registry)
        .unwrap_err();

    assert!(matches!(err, MeterError::Synthetic { .. }));
    // Nothing remains: neither the parent nor any child.
    assert!(registry.meters().is_empty());
}

#[test]
fn denied_synthetic_children_do_not_fail_the_composite() {
    let registry = new_registry();
    registry.add_filter(MeterFilter::deny_fn(|id| id.name().ends_with(".percentile")));

    let timer = Timer::builder("my.timer")
        .publish_percentiles([0.95])
        .register(&registry)
        .unwrap();
    assert!(!timer.is_noop());
    assert_eq!(registry.meters().len(), 1);
}

#[test]
fn summary_builder_supports_percentile_children() {
    let registry = new_registry();
    let summary = vernier::DistributionSummary::builder("payload.size")
        .base_unit("bytes")
        .publish_percentiles([0.5])
        .register(&registry)
        .unwrap();

    assert_eq!(registry.meters().len(), 2);
    summary.record(10.0);
    summary.record(20.0);
    assert_eq!(summary.count(), 2);
    assert!((summary.total_amount() - 30.0).abs() < 1e-9);

    registry.remove(&summary.into());
    assert!(registry.meters().is_empty());
}

#[test]
fn builders_carry_tags_and_metadata() {
    let registry = new_registry();
    let counter = Counter::builder("http.requests")
        .tag("method", "GET")
        .tag("status", "200")
        .description("inbound http requests")
        .base_unit("requests")
        .register(&registry)
        .unwrap();

    assert_eq!(counter.id().description(), Some("inbound http requests"));
    assert_eq!(counter.id().base_unit(), Some("requests"));

    let found = registry
        .find("http.requests")
        .tag("method", "GET")
        .counter()
        .unwrap();
    assert_eq!(found, counter);

    // A search constrained by a tag the meter lacks finds nothing.
    assert!(
        registry
            .find("http.requests")
            .tag("method", "POST")
            .counter()
            .is_none()
    );
}

#[test]
fn same_request_twice_returns_the_same_instance() {
    let registry = new_registry();
    let first = registry.counter("hits", [Tag::new("region", "eu")]).unwrap();
    let second = registry.counter("hits", [Tag::new("region", "eu")]).unwrap();
    assert_eq!(first, second);

    first.increment();
    second.increment();
    assert_eq!(first.count(), 2.0);
    assert_eq!(registry.meters().len(), 1);
}

#[test]
fn gauge_reports_the_supplied_value() {
    let registry = new_registry();
    let queue_depth = Arc::new(std::sync::atomic::AtomicU64::new(3));
    let supplier_state = Arc::clone(&queue_depth);

    let gauge = registry
        .gauge("queue.depth", [], move || {
            supplier_state.load(std::sync::atomic::Ordering::Relaxed) as f64
        })
        .unwrap();

    assert_eq!(gauge.value(), 3.0);
    queue_depth.store(7, std::sync::atomic::Ordering::Relaxed);
    assert_eq!(gauge.value(), 7.0);
}

#[test]
fn clear_empties_the_store_but_keeps_the_registry_open() {
    let registry = new_registry();
    registry.counter("a", []).unwrap();
    registry.counter("b", []).unwrap();
    assert_eq!(registry.meters().len(), 2);

    registry.clear();
    assert!(registry.meters().is_empty());
    assert!(!registry.is_closed());

    // Still open: new registrations are real.
    assert!(!registry.counter("c", []).unwrap().is_noop());
}

#[test]
fn meters_snapshot_is_in_registration_order() {
    let registry = new_registry();
    for name in ["zeta", "alpha", "mid"] {
        registry.counter(name, []).unwrap();
    }
    let names: Vec<_> = registry
        .meters()
        .iter()
        .map(|m| m.id().name().to_string())
        .collect();
    assert_eq!(names, ["zeta", "alpha", "mid"]);
}
