//! Backend capability interface
//!
//! A concrete monitoring backend supplies a [`MeterBackend`] when the
//! registry is constructed. The registry calls through it exclusively;
//! backends never call back into the registry. How a handle aggregates the
//! values recorded into it is entirely the backend's concern.

use std::sync::Arc;
use std::time::Duration;

use crate::config::DistributionStatisticConfig;
use crate::error::MetricsResult;
use crate::id::Id;

/// Supplies the current value of a gauge on demand
pub type ValueSupplier = Arc<dyn Fn() -> f64 + Send + Sync>;

/// Recording surface of a counter
pub trait CounterHandle: Send + Sync {
    /// Add `amount` to the counter
    fn increment(&self, amount: f64);

    /// Cumulative count
    fn count(&self) -> f64;
}

/// Recording surface of a timer
pub trait TimerHandle: Send + Sync {
    /// Record one timed duration
    fn record(&self, duration: Duration);

    /// Number of recorded durations
    fn count(&self) -> u64;

    /// Sum of recorded durations
    fn total_time(&self) -> Duration;

    /// Largest recorded duration
    fn max(&self) -> Duration;

    /// Snapshot of the given percentile, in seconds
    fn percentile(&self, percentile: f64) -> f64;
}

/// Reading surface of a gauge
pub trait GaugeHandle: Send + Sync {
    /// Current value
    fn value(&self) -> f64;
}

/// Recording surface of a distribution summary
pub trait SummaryHandle: Send + Sync {
    /// Record one amount
    fn record(&self, amount: f64);

    /// Number of recorded amounts
    fn count(&self) -> u64;

    /// Sum of recorded amounts
    fn total_amount(&self) -> f64;

    /// Largest recorded amount
    fn max(&self) -> f64;

    /// Snapshot of the given percentile
    fn percentile(&self, percentile: f64) -> f64;
}

/// Strategy for compensating coordinated omission in timers, passed through
/// to the backend's timer constructor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PauseDetector {
    /// No pause compensation
    #[default]
    Disabled,
    /// Detect pauses by watching for clock drift
    ClockDrift {
        sleep_interval: Duration,
        pause_threshold: Duration,
    },
}

/// Factory capability implemented by a concrete backend.
///
/// Each method is pure with respect to registry state: it builds a handle
/// for the final (post-filter) id and must not call back into the registry.
/// Construction may run more than once for the same id under registration
/// races; only one result is ever stored and handed out.
pub trait MeterBackend: Send + Sync {
    /// Build a counter handle
    fn new_counter(&self, id: &Id) -> MetricsResult<Arc<dyn CounterHandle>>;

    /// Build a timer handle honoring the merged distribution config
    fn new_timer(
        &self,
        id: &Id,
        config: &DistributionStatisticConfig,
        pause_detector: &PauseDetector,
    ) -> MetricsResult<Arc<dyn TimerHandle>>;

    /// Build a gauge handle reading from `supplier`
    fn new_gauge(&self, id: &Id, supplier: ValueSupplier) -> MetricsResult<Arc<dyn GaugeHandle>>;

    /// Build a distribution summary handle honoring the merged config
    fn new_summary(
        &self,
        id: &Id,
        config: &DistributionStatisticConfig,
    ) -> MetricsResult<Arc<dyn SummaryHandle>>;
}
