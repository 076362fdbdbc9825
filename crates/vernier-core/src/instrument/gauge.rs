//! Gauge instrument: instantaneous values read from a supplier

use std::fmt;
use std::sync::Arc;

use crate::backend::{GaugeHandle, ValueSupplier};
use crate::error::MetricsResult;
use crate::id::{Id, MeterType, Tag};
use crate::instrument::noop;
use crate::registry::MeterRegistry;

/// An instrument reporting the current value of a supplier
#[derive(Clone)]
pub struct Gauge {
    id: Id,
    inner: Arc<dyn GaugeHandle>,
}

impl Gauge {
    pub(crate) fn new(id: Id, inner: Arc<dyn GaugeHandle>) -> Self {
        Self { id, inner }
    }

    /// Start building a gauge to register
    pub fn builder(
        name: impl Into<String>,
        supplier: impl Fn() -> f64 + Send + Sync + 'static,
    ) -> GaugeBuilder {
        GaugeBuilder {
            name: name.into(),
            tags: Vec::new(),
            description: None,
            base_unit: None,
            supplier: Arc::new(supplier),
        }
    }

    /// The id this gauge is stored under
    pub fn id(&self) -> &Id {
        &self.id
    }

    /// Current value (`NaN` for the no-op gauge)
    pub fn value(&self) -> f64 {
        self.inner.value()
    }

    /// Whether this is the shared no-op gauge
    pub fn is_noop(&self) -> bool {
        noop::is_noop_gauge(&self.inner)
    }
}

impl PartialEq for Gauge {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gauge")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`Gauge`]
pub struct GaugeBuilder {
    name: String,
    tags: Vec<Tag>,
    description: Option<String>,
    base_unit: Option<String>,
    supplier: ValueSupplier,
}

impl GaugeBuilder {
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

    /// Describe what the gauge measures
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare the unit of reported values
    pub fn base_unit(mut self, base_unit: impl Into<String>) -> Self {
        self.base_unit = Some(base_unit.into());
        self
    }

    /// Run the registration pipeline and return the stored (or no-op)
    /// gauge
    pub fn register(self, registry: &MeterRegistry) -> MetricsResult<Gauge> {
        let mut id = Id::new(self.name, self.tags, MeterType::Gauge);
        if let Some(description) = self.description {
            id = id.with_description(description);
        }
        if let Some(base_unit) = self.base_unit {
            id = id.with_base_unit(base_unit);
        }
        registry.register_gauge(id, self.supplier)
    }
}
