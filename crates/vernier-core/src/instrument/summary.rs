//! Distribution summary instrument: distributions of arbitrary amounts

use std::fmt;
use std::sync::Arc;

use crate::backend::SummaryHandle;
use crate::config::DistributionStatisticConfig;
use crate::error::MetricsResult;
use crate::id::{Id, MeterType, Tag};
use crate::instrument::noop;
use crate::registry::MeterRegistry;

/// An instrument tracking a distribution of recorded amounts
#[derive(Clone)]
pub struct DistributionSummary {
    id: Id,
    inner: Arc<dyn SummaryHandle>,
}

impl DistributionSummary {
    pub(crate) fn new(id: Id, inner: Arc<dyn SummaryHandle>) -> Self {
        Self { id, inner }
    }

    /// Start building a summary to register
    pub fn builder(name: impl Into<String>) -> DistributionSummaryBuilder {
        DistributionSummaryBuilder {
            name: name.into(),
            tags: Vec::new(),
            description: None,
            base_unit: None,
            config: DistributionStatisticConfig::builder(),
        }
    }

    /// The id this summary is stored under
    pub fn id(&self) -> &Id {
        &self.id
    }

    /// Record one amount
    pub fn record(&self, amount: f64) {
        self.inner.record(amount);
    }

    /// Number of recorded amounts
    pub fn count(&self) -> u64 {
        self.inner.count()
    }

    /// Sum of recorded amounts
    pub fn total_amount(&self) -> f64 {
        self.inner.total_amount()
    }

    /// Largest recorded amount
    pub fn max(&self) -> f64 {
        self.inner.max()
    }

    /// Snapshot of the given percentile
    pub fn percentile(&self, percentile: f64) -> f64 {
        self.inner.percentile(percentile)
    }

    /// Whether this is the shared no-op summary
    pub fn is_noop(&self) -> bool {
        noop::is_noop_summary(&self.inner)
    }

    pub(crate) fn handle(&self) -> Arc<dyn SummaryHandle> {
        Arc::clone(&self.inner)
    }
}

impl PartialEq for DistributionSummary {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for DistributionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistributionSummary")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`DistributionSummary`]
pub struct DistributionSummaryBuilder {
    name: String,
    tags: Vec<Tag>,
    description: Option<String>,
    base_unit: Option<String>,
    config: crate::config::DistributionStatisticConfigBuilder,
}

impl DistributionSummaryBuilder {
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

    /// Describe what the summary measures
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare the unit of recorded amounts
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

    /// Explicit histogram bucket boundaries
    pub fn buckets(mut self, buckets: impl IntoIterator<Item = f64>) -> Self {
        self.config = self.config.buckets(buckets);
        self
    }

    /// Run the registration pipeline and return the stored (or no-op)
    /// summary
    pub fn register(self, registry: &MeterRegistry) -> MetricsResult<DistributionSummary> {
        let mut id = Id::new(self.name, self.tags, MeterType::DistributionSummary);
        if let Some(description) = self.description {
            id = id.with_description(description);
        }
        if let Some(base_unit) = self.base_unit {
            id = id.with_base_unit(base_unit);
        }
        registry.register_summary(id, self.config.build())
    }
}
