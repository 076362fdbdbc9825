//! The meter registry
//!
//! Orchestrates the registration pipeline: lifecycle gate, filter chain
//! (accept / map / configure), create-or-fetch store, and synthetic
//! composition of percentile gauges for distribution-producing meters.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::backend::{MeterBackend, PauseDetector, ValueSupplier};
use crate::config::DistributionStatisticConfig;
use crate::error::{MeterError, MetricsResult};
use crate::filter::{FilterChain, FilterSnapshot, MeterFilter, MeterFilterReply};
use crate::id::{Id, MeterType, Tag};
use crate::instrument::{noop, Counter, DistributionSummary, Gauge, Meter, Timer};
use crate::search::{RequiredSearch, Search};
use crate::store::MeterStore;

/// Policy for a filter chain outcome of NEUTRAL with no ACCEPT vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcceptPolicy {
    /// Treat NEUTRAL as allow (the default)
    #[default]
    Permissive,
    /// Require an explicit ACCEPT; plain NEUTRAL yields a no-op meter
    RequireAccept,
}

/// Construction-time registry configuration
#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
    /// How a NEUTRAL chain outcome is treated
    pub accept_policy: AcceptPolicy,
    /// Pause detector handed to the backend's timer factory
    pub pause_detector: PauseDetector,
}

/// A vendor-neutral registry of measurement instruments.
///
/// Application code asks the registry for named, tagged instruments; the
/// registry runs each request through its filter chain, stores at most one
/// meter per final id, and hands every caller of the same final id the same
/// instance. After [`close`], new requests yield shared no-op instruments.
///
/// [`close`]: MeterRegistry::close
pub struct MeterRegistry {
    backend: Arc<dyn MeterBackend>,
    filters: FilterChain,
    store: MeterStore,
    config: RegistryConfig,
    closed: AtomicBool,
}

impl MeterRegistry {
    /// Create a registry over the given backend with default configuration
    pub fn new(backend: impl MeterBackend + 'static) -> Self {
        Self::with_config(backend, RegistryConfig::default())
    }

    /// Create a registry over the given backend
    pub fn with_config(backend: impl MeterBackend + 'static, config: RegistryConfig) -> Self {
        Self {
            backend: Arc::new(backend),
            filters: FilterChain::new(),
            store: MeterStore::new(),
            config,
            closed: AtomicBool::new(false),
        }
    }

    /// Append a filter to the chain. Registrations already in flight keep
    /// evaluating against the chain they snapshotted.
    pub fn add_filter(&self, filter: MeterFilter) {
        self.filters.add(filter);
    }

    /// Get or create a counter
    pub fn counter(
        &self,
        name: impl Into<String>,
        tags: impl IntoIterator<Item = Tag>,
    ) -> MetricsResult<Counter> {
        self.register_counter(Id::new(name, tags, MeterType::Counter))
    }

    /// Get or create a timer with an unset distribution config
    pub fn timer(
        &self,
        name: impl Into<String>,
        tags: impl IntoIterator<Item = Tag>,
    ) -> MetricsResult<Timer> {
        self.register_timer(
            Id::new(name, tags, MeterType::Timer),
            DistributionStatisticConfig::unset(),
        )
    }

    /// Get or create a gauge reading from `supplier`
    pub fn gauge(
        &self,
        name: impl Into<String>,
        tags: impl IntoIterator<Item = Tag>,
        supplier: impl Fn() -> f64 + Send + Sync + 'static,
    ) -> MetricsResult<Gauge> {
        self.register_gauge(Id::new(name, tags, MeterType::Gauge), Arc::new(supplier))
    }

    /// Get or create a distribution summary with an unset distribution
    /// config
    pub fn summary(
        &self,
        name: impl Into<String>,
        tags: impl IntoIterator<Item = Tag>,
    ) -> MetricsResult<DistributionSummary> {
        self.register_summary(
            Id::new(name, tags, MeterType::DistributionSummary),
            DistributionStatisticConfig::unset(),
        )
    }

    /// Search meters by name; absent results are `None`
    pub fn find(&self, name: impl Into<String>) -> Search<'_> {
        Search::new(self, name.into())
    }

    /// Search meters by name; absent results and kind mismatches are errors
    pub fn get(&self, name: impl Into<String>) -> RequiredSearch<'_> {
        RequiredSearch::new(Search::new(self, name.into()))
    }

    /// Snapshot of all stored meters in registration order
    pub fn meters(&self) -> Vec<Meter> {
        self.store.meters()
    }

    /// Remove a meter by its recorded final id. Synthetic children go with
    /// their parent. Returns `None` when nothing was stored under the id.
    pub fn remove(&self, meter: &Meter) -> Option<Meter> {
        self.remove_by_id(meter.id())
    }

    /// Remove whatever is stored under `id`, with its synthetic children
    pub fn remove_by_id(&self, id: &Id) -> Option<Meter> {
        let removed = self.store.remove(id);
        if let Some(meter) = &removed {
            tracing::debug!(meter = %meter.id(), "meter removed");
        }
        removed
    }

    /// Remove every meter; the registry stays open
    pub fn clear(&self) {
        self.store.clear();
    }

    /// Close the registry. Idempotent and one-way: existing meters remain
    /// stored and usable, every subsequent request yields a no-op
    /// instrument.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!("meter registry closed");
        }
    }

    /// Whether [`close`](MeterRegistry::close) has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn store(&self) -> &MeterStore {
        &self.store
    }

    pub(crate) fn register_counter(&self, id: Id) -> MetricsResult<Counter> {
        if self.is_closed() {
            return Ok(noop::counter(id));
        }
        let filters = self.filters.snapshot();
        if !self.allowed(&filters, &id)? {
            return Ok(noop::counter(id));
        }
        let mapped = filters.map(id)?;
        let backend = Arc::clone(&self.backend);
        let (meter, _) = self.get_or_create(mapped, MeterType::Counter, move |final_id| {
            let handle = backend.new_counter(final_id)?;
            Ok(Meter::Counter(Counter::new(final_id.clone(), handle)))
        })?;
        expect_kind(meter, MeterType::Counter, Meter::into_counter)
    }

    pub(crate) fn register_timer(
        &self,
        id: Id,
        config: DistributionStatisticConfig,
    ) -> MetricsResult<Timer> {
        if self.is_closed() {
            return Ok(noop::timer(id));
        }
        let filters = self.filters.snapshot();
        if !self.allowed(&filters, &id)? {
            return Ok(noop::timer(id));
        }
        let mapped = filters.map(id)?;
        let final_config = filters.configure(&mapped, config)?;

        let backend = Arc::clone(&self.backend);
        let pause_detector = self.config.pause_detector.clone();
        let factory_config = final_config.clone();
        let (meter, created) = self.get_or_create(mapped, MeterType::Timer, move |final_id| {
            let handle = backend.new_timer(final_id, &factory_config, &pause_detector)?;
            Ok(Meter::Timer(Timer::new(final_id.clone(), handle)))
        })?;
        let timer = expect_kind(meter, MeterType::Timer, Meter::into_timer)?;

        if created && final_config.is_publishing_percentiles() {
            let handle = timer.handle();
            self.compose_percentile_gauges(timer.id(), final_config.percentiles(), |phi| {
                let handle = Arc::clone(&handle);
                let supplier: ValueSupplier = Arc::new(move || handle.percentile(phi));
                supplier
            })?;
        }
        Ok(timer)
    }

    pub(crate) fn register_gauge(&self, id: Id, supplier: ValueSupplier) -> MetricsResult<Gauge> {
        if self.is_closed() {
            return Ok(noop::gauge(id));
        }
        let filters = self.filters.snapshot();
        if !self.allowed(&filters, &id)? {
            return Ok(noop::gauge(id));
        }
        let mapped = filters.map(id)?;
        let backend = Arc::clone(&self.backend);
        let (meter, _) = self.get_or_create(mapped, MeterType::Gauge, move |final_id| {
            let handle = backend.new_gauge(final_id, supplier)?;
            Ok(Meter::Gauge(Gauge::new(final_id.clone(), handle)))
        })?;
        expect_kind(meter, MeterType::Gauge, Meter::into_gauge)
    }

    pub(crate) fn register_summary(
        &self,
        id: Id,
        config: DistributionStatisticConfig,
    ) -> MetricsResult<DistributionSummary> {
        if self.is_closed() {
            return Ok(noop::summary(id));
        }
        let filters = self.filters.snapshot();
        if !self.allowed(&filters, &id)? {
            return Ok(noop::summary(id));
        }
        let mapped = filters.map(id)?;
        let final_config = filters.configure(&mapped, config)?;

        let backend = Arc::clone(&self.backend);
        let factory_config = final_config.clone();
        let (meter, created) =
            self.get_or_create(mapped, MeterType::DistributionSummary, move |final_id| {
                let handle = backend.new_summary(final_id, &factory_config)?;
                Ok(Meter::Summary(DistributionSummary::new(
                    final_id.clone(),
                    handle,
                )))
            })?;
        let summary = expect_kind(meter, MeterType::DistributionSummary, Meter::into_summary)?;

        if created && final_config.is_publishing_percentiles() {
            let handle = summary.handle();
            self.compose_percentile_gauges(summary.id(), final_config.percentiles(), |phi| {
                let handle = Arc::clone(&handle);
                let supplier: ValueSupplier = Arc::new(move || handle.percentile(phi));
                supplier
            })?;
        }
        Ok(summary)
    }

    /// Evaluate the chain's accept verdict against the original requested
    /// id, before any mapping.
    fn allowed(&self, filters: &FilterSnapshot, id: &Id) -> MetricsResult<bool> {
        match filters.accept(id)? {
            MeterFilterReply::Deny => {
                tracing::debug!(meter = %id, "meter denied by filter");
                Ok(false)
            }
            MeterFilterReply::Neutral
                if self.config.accept_policy == AcceptPolicy::RequireAccept =>
            {
                tracing::debug!(meter = %id, "meter not accepted under RequireAccept policy");
                Ok(false)
            }
            _ => Ok(true),
        }
    }

    /// Create-or-fetch under the final id. The factory runs outside the
    /// store lock and its result is discarded when a concurrent caller
    /// inserted first.
    fn get_or_create(
        &self,
        id: Id,
        kind: MeterType,
        factory: impl FnOnce(&Id) -> MetricsResult<Meter>,
    ) -> MetricsResult<(Meter, bool)> {
        if let Some(existing) = self.store.fetch(&id, kind)? {
            return Ok((existing, false));
        }
        let built = factory(&id)?;
        let (meter, created) = self.store.insert_if_absent(built, kind)?;
        if created {
            tracing::debug!(meter = %meter.id(), kind = %kind, "meter registered");
        }
        Ok((meter, created))
    }

    /// Register one percentile gauge per φ through the full pipeline and
    /// record the synthetic group. A failed child rolls back the children
    /// already inserted for this call and the parent itself.
    fn compose_percentile_gauges(
        &self,
        parent_id: &Id,
        percentiles: &[f64],
        supplier_for: impl Fn(f64) -> ValueSupplier,
    ) -> MetricsResult<()> {
        let mut stored = Vec::new();
        for &phi in percentiles {
            let child_id = Id::new(
                format!("{}.percentile", parent_id.name()),
                parent_id
                    .tags()
                    .iter()
                    .cloned()
                    .chain([Tag::new("phi", phi.to_string())]),
                MeterType::Gauge,
            );
            match self.register_gauge(child_id.clone(), supplier_for(phi)) {
                Ok(gauge) => {
                    if !gauge.is_noop() {
                        stored.push(gauge.id().clone());
                    }
                }
                Err(source) => {
                    for child in &stored {
                        self.store.remove(child);
                    }
                    self.store.remove(parent_id);
                    return Err(MeterError::Synthetic {
                        parent: parent_id.name().to_string(),
                        child: child_id.name().to_string(),
                        source: Box::new(source),
                    });
                }
            }
        }
        self.store.record_group(parent_id.clone(), stored);
        Ok(())
    }
}

impl std::fmt::Debug for MeterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeterRegistry")
            .field("meters", &self.store.len())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

// The store's kind check precedes every conversion, so the wrong variant
// cannot actually come back; surface a conflict rather than panicking if
// that assumption is ever broken.
fn expect_kind<T>(
    meter: Meter,
    requested: MeterType,
    convert: impl FnOnce(Meter) -> Option<T>,
) -> MetricsResult<T> {
    let name = meter.id().name().to_string();
    let existing = meter.kind();
    convert(meter).ok_or_else(|| MeterError::IdentityConflict {
        name,
        existing,
        requested,
    })
}
