//! Counter instrument: monotonically increasing values

use std::fmt;
use std::sync::Arc;

use crate::backend::CounterHandle;
use crate::error::MetricsResult;
use crate::id::{Id, MeterType, Tag};
use crate::instrument::noop;
use crate::registry::MeterRegistry;

/// A monotonically increasing instrument
#[derive(Clone)]
pub struct Counter {
    id: Id,
    inner: Arc<dyn CounterHandle>,
}

impl Counter {
    pub(crate) fn new(id: Id, inner: Arc<dyn CounterHandle>) -> Self {
        Self { id, inner }
    }

    /// Start building a counter to register
    pub fn builder(name: impl Into<String>) -> CounterBuilder {
        CounterBuilder {
            name: name.into(),
            tags: Vec::new(),
            description: None,
            base_unit: None,
        }
    }

    /// The id this counter is stored under
    pub fn id(&self) -> &Id {
        &self.id
    }

    /// Increment by one
    pub fn increment(&self) {
        self.inner.increment(1.0);
    }

    /// Increment by `amount`
    pub fn increment_by(&self, amount: f64) {
        self.inner.increment(amount);
    }

    /// Cumulative count
    pub fn count(&self) -> f64 {
        self.inner.count()
    }

    /// Whether this is the shared no-op counter
    pub fn is_noop(&self) -> bool {
        noop::is_noop_counter(&self.inner)
    }
}

impl PartialEq for Counter {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Counter")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`Counter`]
#[derive(Debug, Clone)]
pub struct CounterBuilder {
    name: String,
    tags: Vec<Tag>,
    description: Option<String>,
    base_unit: Option<String>,
}

impl CounterBuilder {
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

    /// Describe what the counter measures
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare the unit of recorded values
    pub fn base_unit(mut self, base_unit: impl Into<String>) -> Self {
        self.base_unit = Some(base_unit.into());
        self
    }

    /// Run the registration pipeline and return the stored (or no-op)
    /// counter
    pub fn register(self, registry: &MeterRegistry) -> MetricsResult<Counter> {
        let mut id = Id::new(self.name, self.tags, MeterType::Counter);
        if let Some(description) = self.description {
            id = id.with_description(description);
        }
        if let Some(base_unit) = self.base_unit {
            id = id.with_base_unit(base_unit);
        }
        registry.register_counter(id)
    }
}
