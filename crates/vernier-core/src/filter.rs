//! Meter filters: deny, rename, and reconfigure meter requests
//!
//! A [`MeterFilter`] bundles up to three optional operations, each applied
//! to every registration in the order filters were added:
//!
//! * `accept` votes on whether the requested meter may exist at all,
//! * `map` rewrites the id before it keys the store,
//! * `configure` adjusts the distribution config handed to the backend.
//!
//! An operation a filter does not carry behaves as NEUTRAL / identity.
//! Filters must be pure with respect to registry state.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::DistributionStatisticConfig;
use crate::error::MetricsResult;
use crate::id::{Id, Tag};

/// A filter's verdict on a requested id.
///
/// Variants are ordered by precedence: `Deny` beats `Accept` beats
/// `Neutral` when a chain's replies are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MeterFilterReply {
    /// No opinion; the chain's default policy decides
    Neutral,
    /// Allow the meter regardless of later neutral votes
    Accept,
    /// Refuse the meter; a no-op instrument is returned instead
    Deny,
}

type AcceptFn = Box<dyn Fn(&Id) -> MetricsResult<MeterFilterReply> + Send + Sync>;
type MapFn = Box<dyn Fn(Id) -> MetricsResult<Id> + Send + Sync>;
type ConfigureFn = Box<
    dyn Fn(&Id, DistributionStatisticConfig) -> MetricsResult<DistributionStatisticConfig>
        + Send
        + Sync,
>;

/// A pluggable rule evaluated on every meter registration
#[derive(Default)]
pub struct MeterFilter {
    accept: Option<AcceptFn>,
    map: Option<MapFn>,
    configure: Option<ConfigureFn>,
}

impl MeterFilter {
    /// Start building a filter carrying several operations
    pub fn builder() -> MeterFilterBuilder {
        MeterFilterBuilder {
            filter: Self::default(),
        }
    }

    /// Accept ids matching `predicate`, stay neutral otherwise
    pub fn accept_fn(predicate: impl Fn(&Id) -> bool + Send + Sync + 'static) -> Self {
        Self::builder()
            .accept(move |id| {
                if predicate(id) {
                    MeterFilterReply::Accept
                } else {
                    MeterFilterReply::Neutral
                }
            })
            .build()
    }

    /// Deny ids matching `predicate`, stay neutral otherwise
    pub fn deny_fn(predicate: impl Fn(&Id) -> bool + Send + Sync + 'static) -> Self {
        Self::builder()
            .accept(move |id| {
                if predicate(id) {
                    MeterFilterReply::Deny
                } else {
                    MeterFilterReply::Neutral
                }
            })
            .build()
    }

    /// Deny every id
    pub fn deny() -> Self {
        Self::builder().accept(|_| MeterFilterReply::Deny).build()
    }

    /// Accept every id
    pub fn accept_all() -> Self {
        Self::builder().accept(|_| MeterFilterReply::Accept).build()
    }

    /// Rewrite ids with `f`
    pub fn map_fn(f: impl Fn(Id) -> Id + Send + Sync + 'static) -> Self {
        Self::builder().map(f).build()
    }

    /// Adjust distribution configs with `f`
    pub fn configure_fn(
        f: impl Fn(&Id, DistributionStatisticConfig) -> DistributionStatisticConfig
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self::builder().configure(f).build()
    }

    /// Strip the given tag keys from every id before storage
    pub fn ignore_tags(keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        Self::map_fn(move |id| {
            let kept: Vec<Tag> = id
                .tags()
                .iter()
                .filter(|tag| !keys.iter().any(|key| key == tag.key()))
                .cloned()
                .collect();
            if kept.len() == id.tags().len() {
                id
            } else {
                id.with_tags(kept)
            }
        })
    }

    /// Add tags to every id; tags already on the id win over common ones
    pub fn common_tags(tags: impl IntoIterator<Item = Tag>) -> Self {
        let common: Vec<Tag> = tags.into_iter().collect();
        Self::map_fn(move |id| {
            let merged: Vec<Tag> = common
                .iter()
                .cloned()
                .chain(id.tags().iter().cloned())
                .collect();
            id.with_tags(merged)
        })
    }

    pub(crate) fn reply(&self, id: &Id) -> MetricsResult<MeterFilterReply> {
        match &self.accept {
            Some(accept) => accept(id),
            None => Ok(MeterFilterReply::Neutral),
        }
    }

    pub(crate) fn map(&self, id: Id) -> MetricsResult<Id> {
        match &self.map {
            Some(map) => map(id),
            None => Ok(id),
        }
    }

    pub(crate) fn configure(
        &self,
        id: &Id,
        config: DistributionStatisticConfig,
    ) -> MetricsResult<DistributionStatisticConfig> {
        match &self.configure {
            Some(configure) => configure(id, config),
            None => Ok(config),
        }
    }
}

impl std::fmt::Debug for MeterFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeterFilter")
            .field("accept", &self.accept.is_some())
            .field("map", &self.map.is_some())
            .field("configure", &self.configure.is_some())
            .finish()
    }
}

/// Builder for a [`MeterFilter`]
#[derive(Default)]
pub struct MeterFilterBuilder {
    filter: MeterFilter,
}

impl MeterFilterBuilder {
    /// Set the accept operation
    pub fn accept(
        mut self,
        f: impl Fn(&Id) -> MeterFilterReply + Send + Sync + 'static,
    ) -> Self {
        self.filter.accept = Some(Box::new(move |id| Ok(f(id))));
        self
    }

    /// Set a fallible accept operation
    pub fn try_accept(
        mut self,
        f: impl Fn(&Id) -> MetricsResult<MeterFilterReply> + Send + Sync + 'static,
    ) -> Self {
        self.filter.accept = Some(Box::new(f));
        self
    }

    /// Set the map operation
    pub fn map(mut self, f: impl Fn(Id) -> Id + Send + Sync + 'static) -> Self {
        self.filter.map = Some(Box::new(move |id| Ok(f(id))));
        self
    }

    /// Set a fallible map operation
    pub fn try_map(
        mut self,
        f: impl Fn(Id) -> MetricsResult<Id> + Send + Sync + 'static,
    ) -> Self {
        self.filter.map = Some(Box::new(f));
        self
    }

    /// Set the configure operation
    pub fn configure(
        mut self,
        f: impl Fn(&Id, DistributionStatisticConfig) -> DistributionStatisticConfig
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.filter.configure = Some(Box::new(move |id, config| Ok(f(id, config))));
        self
    }

    /// Set a fallible configure operation
    pub fn try_configure(
        mut self,
        f: impl Fn(&Id, DistributionStatisticConfig) -> MetricsResult<DistributionStatisticConfig>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.filter.configure = Some(Box::new(f));
        self
    }

    /// Finish building
    pub fn build(self) -> MeterFilter {
        self.filter
    }
}

/// Ordered, append-only filter list.
///
/// Appends copy the list and swap it in, so readers holding a snapshot are
/// never invalidated and registrations see a stable chain for their whole
/// evaluation.
pub(crate) struct FilterChain {
    filters: RwLock<Arc<Vec<Arc<MeterFilter>>>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self {
            filters: RwLock::new(Arc::new(Vec::new())),
        }
    }

    pub fn add(&self, filter: MeterFilter) {
        let mut current = self.filters.write();
        let mut next = current.as_ref().clone();
        next.push(Arc::new(filter));
        *current = Arc::new(next);
    }

    pub fn snapshot(&self) -> FilterSnapshot {
        FilterSnapshot {
            filters: Arc::clone(&self.filters.read()),
        }
    }
}

/// The chain as seen by one registration
pub(crate) struct FilterSnapshot {
    filters: Arc<Vec<Arc<MeterFilter>>>,
}

impl FilterSnapshot {
    /// Aggregate accept replies: DENY short-circuits, otherwise the highest
    /// precedence reply seen wins (ACCEPT over NEUTRAL).
    pub fn accept(&self, id: &Id) -> MetricsResult<MeterFilterReply> {
        let mut verdict = MeterFilterReply::Neutral;
        for filter in self.filters.iter() {
            let reply = filter.reply(id)?;
            if reply == MeterFilterReply::Deny {
                return Ok(MeterFilterReply::Deny);
            }
            verdict = verdict.max(reply);
        }
        Ok(verdict)
    }

    /// Thread the id through every map operation in order
    pub fn map(&self, id: Id) -> MetricsResult<Id> {
        let mut mapped = id;
        for filter in self.filters.iter() {
            mapped = filter.map(mapped)?;
        }
        Ok(mapped)
    }

    /// Thread the config through every configure operation in order
    pub fn configure(
        &self,
        id: &Id,
        config: DistributionStatisticConfig,
    ) -> MetricsResult<DistributionStatisticConfig> {
        let mut current = config;
        for filter in self.filters.iter() {
            current = filter.configure(id, current)?;
        }
        Ok(current)
    }
}
