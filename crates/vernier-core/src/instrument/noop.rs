//! Shared no-op instruments
//!
//! Returned when a filter denies a request or the registry is closed.
//! One stateless handle exists per meter type; wrappers around them carry
//! the requested id but record nothing. No-op meters are never stored in
//! the registry.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;

use crate::backend::{CounterHandle, GaugeHandle, SummaryHandle, TimerHandle};
use crate::id::Id;
use crate::instrument::{Counter, DistributionSummary, Gauge, Timer};

struct NoopCounter;

impl CounterHandle for NoopCounter {
    fn increment(&self, _amount: f64) {}

    fn count(&self) -> f64 {
        0.0
    }
}

struct NoopTimer;

impl TimerHandle for NoopTimer {
    fn record(&self, _duration: Duration) {}

    fn count(&self) -> u64 {
        0
    }

    fn total_time(&self) -> Duration {
        Duration::ZERO
    }

    fn max(&self) -> Duration {
        Duration::ZERO
    }

    fn percentile(&self, _percentile: f64) -> f64 {
        0.0
    }
}

struct NoopGauge;

impl GaugeHandle for NoopGauge {
    fn value(&self) -> f64 {
        f64::NAN
    }
}

struct NoopSummary;

impl SummaryHandle for NoopSummary {
    fn record(&self, _amount: f64) {}

    fn count(&self) -> u64 {
        0
    }

    fn total_amount(&self) -> f64 {
        0.0
    }

    fn max(&self) -> f64 {
        0.0
    }

    fn percentile(&self, _percentile: f64) -> f64 {
        0.0
    }
}

static NOOP_COUNTER: Lazy<Arc<dyn CounterHandle>> = Lazy::new(|| Arc::new(NoopCounter));
static NOOP_TIMER: Lazy<Arc<dyn TimerHandle>> = Lazy::new(|| Arc::new(NoopTimer));
static NOOP_GAUGE: Lazy<Arc<dyn GaugeHandle>> = Lazy::new(|| Arc::new(NoopGauge));
static NOOP_SUMMARY: Lazy<Arc<dyn SummaryHandle>> = Lazy::new(|| Arc::new(NoopSummary));

pub(crate) fn counter(id: Id) -> Counter {
    Counter::new(id, Arc::clone(&NOOP_COUNTER))
}

pub(crate) fn timer(id: Id) -> Timer {
    Timer::new(id, Arc::clone(&NOOP_TIMER))
}

pub(crate) fn gauge(id: Id) -> Gauge {
    Gauge::new(id, Arc::clone(&NOOP_GAUGE))
}

pub(crate) fn summary(id: Id) -> DistributionSummary {
    DistributionSummary::new(id, Arc::clone(&NOOP_SUMMARY))
}

pub(crate) fn is_noop_counter(handle: &Arc<dyn CounterHandle>) -> bool {
    Arc::ptr_eq(handle, &NOOP_COUNTER)
}

pub(crate) fn is_noop_timer(handle: &Arc<dyn TimerHandle>) -> bool {
    Arc::ptr_eq(handle, &NOOP_TIMER)
}

pub(crate) fn is_noop_gauge(handle: &Arc<dyn GaugeHandle>) -> bool {
    Arc::ptr_eq(handle, &NOOP_GAUGE)
}

pub(crate) fn is_noop_summary(handle: &Arc<dyn SummaryHandle>) -> bool {
    Arc::ptr_eq(handle, &NOOP_SUMMARY)
}
