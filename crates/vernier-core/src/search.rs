//! Fluent search over registered meters
//!
//! [`Search`] (from [`MeterRegistry::find`]) treats absent results as
//! `None`; [`RequiredSearch`] (from [`MeterRegistry::get`]) fails loudly
//! with [`MeterError::MeterNotFound`] or
//! [`MeterError::IdentityConflict`] instead.
//!
//! [`MeterRegistry::find`]: crate::registry::MeterRegistry::find
//! [`MeterRegistry::get`]: crate::registry::MeterRegistry::get
//! [`MeterError::MeterNotFound`]: crate::error::MeterError::MeterNotFound
//! [`MeterError::IdentityConflict`]: crate::error::MeterError::IdentityConflict

use crate::error::{MeterError, MetricsResult};
use crate::id::{MeterType, Tag};
use crate::instrument::{Counter, DistributionSummary, Gauge, Meter, Timer};
use crate::registry::MeterRegistry;

/// Lookup of meters matching a name and a set of required tags.
///
/// A meter matches when its name equals the searched name and every
/// required tag appears in its tag set (the meter may carry more).
pub struct Search<'a> {
    registry: &'a MeterRegistry,
    name: String,
    tags: Vec<Tag>,
}

impl<'a> Search<'a> {
    pub(crate) fn new(registry: &'a MeterRegistry, name: String) -> Self {
        Self {
            registry,
            name,
            tags: Vec::new(),
        }
    }

    /// Require one tag
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(Tag::new(key, value));
        self
    }

    /// Require several tags
    pub fn tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// First matching counter
    pub fn counter(self) -> Option<Counter> {
        self.matches().into_iter().find_map(Meter::into_counter)
    }

    /// First matching timer
    pub fn timer(self) -> Option<Timer> {
        self.matches().into_iter().find_map(Meter::into_timer)
    }

    /// First matching gauge
    pub fn gauge(self) -> Option<Gauge> {
        self.matches().into_iter().find_map(Meter::into_gauge)
    }

    /// First matching distribution summary
    pub fn summary(self) -> Option<DistributionSummary> {
        self.matches().into_iter().find_map(Meter::into_summary)
    }

    /// First matching meter of any kind
    pub fn meter(self) -> Option<Meter> {
        self.matches().into_iter().next()
    }

    /// Every matching meter, in registration order
    pub fn meters(self) -> Vec<Meter> {
        self.matches()
    }

    fn matches(&self) -> Vec<Meter> {
        self.registry.store().find_matching(|id| {
            id.name() == self.name
                && self
                    .tags
                    .iter()
                    .all(|tag| id.tag(tag.key()) == Some(tag.value()))
        })
    }
}

/// Like [`Search`], but absent results and kind mismatches are errors
pub struct RequiredSearch<'a> {
    inner: Search<'a>,
}

impl<'a> RequiredSearch<'a> {
    pub(crate) fn new(inner: Search<'a>) -> Self {
        Self { inner }
    }

    /// Require one tag
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner = self.inner.tag(key, value);
        self
    }

    /// Require several tags
    pub fn tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.inner = self.inner.tags(tags);
        self
    }

    /// The matching counter
    pub fn counter(self) -> MetricsResult<Counter> {
        self.required(MeterType::Counter, Meter::into_counter)
    }

    /// The matching timer
    pub fn timer(self) -> MetricsResult<Timer> {
        self.required(MeterType::Timer, Meter::into_timer)
    }

    /// The matching gauge
    pub fn gauge(self) -> MetricsResult<Gauge> {
        self.required(MeterType::Gauge, Meter::into_gauge)
    }

    /// The matching distribution summary
    pub fn summary(self) -> MetricsResult<DistributionSummary> {
        self.required(MeterType::DistributionSummary, Meter::into_summary)
    }

    /// The first matching meter of any kind
    pub fn meter(self) -> MetricsResult<Meter> {
        let name = self.inner.name.clone();
        self.inner
            .meter()
            .ok_or(MeterError::MeterNotFound { name })
    }

    fn required<T>(
        self,
        requested: MeterType,
        convert: impl Fn(Meter) -> Option<T>,
    ) -> MetricsResult<T> {
        let name = self.inner.name.clone();
        let matches = self.inner.matches();
        if matches.is_empty() {
            return Err(MeterError::MeterNotFound { name });
        }
        let existing = matches[0].kind();
        matches
            .into_iter()
            .find_map(convert)
            .ok_or_else(|| MeterError::IdentityConflict {
                name,
                existing,
                requested,
            })
    }
}
