//! Timer instrument: distributions of durations

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::backend::TimerHandle;
use crate::config::DistributionStatisticConfig;
use crate::error::MetricsResult;
use crate::id::{Id, MeterType, Tag};
use crate::instrument::noop;
use crate::registry::MeterRegistry;

/// An instrument tracking a distribution of durations
#[derive(Clone)]
pub struct Timer {
    id: Id,
    inner: Arc<dyn TimerHandle>,
}

impl Timer {
    pub(crate) fn new(id: Id, inner: Arc<dyn TimerHandle>) -> Self {
        Self { id, inner }
    }

    /// Start building a timer to register
    pub fn builder(name: impl Into<String>) -> TimerBuilder {
        TimerBuilder {
            name: name.into(),
            tags: Vec::new(),
            description: None,
            base_unit: None,
            config: DistributionStatisticConfig::builder(),
        }
    }

    /// The id this timer is stored under
    pub fn id(&self) -> &Id {
        &self.id
    }

    /// Record one timed duration
    pub fn record(&self, duration: Duration) {
        self.inner.record(duration);
    }

    /// Time `f` and record how long it took
    pub fn record_fn<T>(&self, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = f();
        self.inner.record(start.elapsed());
        result
    }

    /// Number of recorded durations
    pub fn count(&self) -> u64 {
        self.inner.count()
    }

    /// Sum of recorded durations
    pub fn total_time(&self) -> Duration {
        self.inner.total_time()
    }

    /// Largest recorded duration
    pub fn max(&self) -> Duration {
        self.inner.max()
    }

    /// Snapshot of the given percentile, in seconds
    pub fn percentile(&self, percentile: f64) -> f64 {
        self.inner.percentile(percentile)
    }

    /// Whether this is the shared no-op timer
    pub fn is_noop(&self) -> bool {
        noop::is_noop_timer(&self.inner)
    }

    pub(crate) fn handle(&self) -> Arc<dyn TimerHandle> {
        Arc::clone(&self.inner)
    }
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`Timer`]
pub struct TimerBuilder {
    name: String,
    tags: Vec<Tag>,
    description: Option<String>,
    base_unit: Option<String>,
    config: crate::config::DistributionStatisticConfigBuilder,
}

impl TimerBuilder {
    /// Add one tag
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(Tag::new(key, value));
        self
    }

    /// Add several tags
    pub fn tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Describe what the timer measures
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare the unit of recorded values
    pub fn base_unit(mut self, base_unit: impl Into<String>) -> Self {
        self.base_unit = Some(base_unit.into());
        self
    }

    /// Publish the given percentiles as synthetic gauges
    pub fn publish_percentiles(mut self, percentiles: impl IntoIterator<Item = f64>) -> Self {
        self.config = self.config.percentiles(percentiles);
        self
    }

    /// Publish a percentile histogram
    pub fn publish_percentile_histogram(mut self, enabled: bool) -> Self {
        self.config = self.config.percentile_histogram(enabled);
        self
    }

    /// Explicit histogram bucket boundaries, in seconds
    pub fn buckets(mut self, buckets: impl IntoIterator<Item = f64>) -> Self {
        self.config = self.config.buckets(buckets);
        self
    }

    /// Run the registration pipeline and return the stored (or no-op)
    /// timer
    pub fn register(self, registry: &MeterRegistry) -> MetricsResult<Timer> {
        let mut id = Id::new(self.name, self.tags, MeterType::Timer);
        if let Some(description) = self.description {
            id = id.with_description(description);
        }
        if let Some(base_unit) = self.base_unit {
            id = id.with_base_unit(base_unit);
        }
        registry.register_timer(id, self.config.build())
    }
}
