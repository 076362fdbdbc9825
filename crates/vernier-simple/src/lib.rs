//! Simple in-memory backend for the vernier meter registry
//!
//! Implements the [`MeterBackend`] capability with straightforward atomic
//! and mutex-guarded arithmetic, making a registry usable end-to-end
//! without any monitoring system attached. Percentile snapshots come from
//! a bounded ring of recent samples; histograms use cumulative buckets.
//! Good for tests, local development, and as a reference for real backend
//! implementations.

mod counter;
mod distribution;
mod gauge;
mod summary;
mod timer;


pub use counter::SimpleCounter;
pub use gauge::SimpleGauge;
pub use summary::SimpleSummary;
pub use timer::SimpleTimer;

use std::sync::Arc;

use vernier_core::{
    CounterHandle, DistributionStatisticConfig, GaugeHandle, Id, MeterBackend, MeterRegistry,
    MetricsResult, PauseDetector, SummaryHandle, TimerHandle, ValueSupplier,
};

/// Backend constructing in-memory meters
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleBackend;

impl SimpleBackend {
    /// Create a new simple backend
    pub fn new() -> Self {
        Self
    }
}

impl MeterBackend for SimpleBackend {
    fn new_counter(&self, _id: &Id) -> MetricsResult<Arc<dyn CounterHandle>> {
        Ok(Arc::new(SimpleCounter::new()))
    }

    fn new_timer(
        &self,
        _id: &Id,
        config: &DistributionStatisticConfig,
        _pause_detector: &PauseDetector,
    ) -> MetricsResult<Arc<dyn TimerHandle>> {
        Ok(Arc::new(SimpleTimer::new(config)))
    }

    fn new_gauge(&self, _id: &Id, supplier: ValueSupplier) -> MetricsResult<Arc<dyn GaugeHandle>> {
        Ok(Arc::new(SimpleGauge::new(supplier)))
    }

    fn new_summary(
        &self,
        _id: &Id,
        config: &DistributionStatisticConfig,
    ) -> MetricsResult<Arc<dyn SummaryHandle>> {
        Ok(Arc::new(SimpleSummary::new(config)))
    }
}

/// A registry backed by in-memory meters
pub fn new_registry() -> MeterRegistry {
    MeterRegistry::new(SimpleBackend::new())
}
