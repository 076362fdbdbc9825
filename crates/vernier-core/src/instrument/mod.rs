//! Instrument wrappers handed out by the registry
//!
//! Each wrapper pairs the final (post-filter) id with the opaque backend
//! handle values are recorded into. Wrappers are cheap to clone; clones of
//! the same registration share one handle.

mod counter;
mod gauge;
pub(crate) mod noop;
mod summary;
mod timer;


pub use counter::{Counter, CounterBuilder};
pub use gauge::{Gauge, GaugeBuilder};
pub use summary::{DistributionSummary, DistributionSummaryBuilder};
pub use timer::{Timer, TimerBuilder};

use std::fmt;

use crate::id::{Id, MeterType};

/// A stored meter: one of the four instrument kinds.
///
/// Equality compares backend handle identity, so two values are equal
/// exactly when they came from the same registration.
#[derive(Clone, PartialEq)]
pub enum Meter {
    Counter(Counter),
    Timer(Timer),
    Gauge(Gauge),
    Summary(DistributionSummary),
}

impl Meter {
    /// The final id this meter is stored under
    pub fn id(&self) -> &Id {
        match self {
            Self::Counter(c) => c.id(),
            Self::Timer(t) => t.id(),
            Self::Gauge(g) => g.id(),
            Self::Summary(s) => s.id(),
        }
    }

    /// The instrument kind
    pub fn kind(&self) -> MeterType {
        match self {
            Self::Counter(_) => MeterType::Counter,
            Self::Timer(_) => MeterType::Timer,
            Self::Gauge(_) => MeterType::Gauge,
            Self::Summary(_) => MeterType::DistributionSummary,
        }
    }

    /// Whether this meter is one of the shared no-op instruments
    pub fn is_noop(&self) -> bool {
        match self {
            Self::Counter(c) => c.is_noop(),
            Self::Timer(t) => t.is_noop(),
            Self::Gauge(g) => g.is_noop(),
            Self::Summary(s) => s.is_noop(),
        }
    }

    /// Borrow as a counter, if this meter is one
    pub fn as_counter(&self) -> Option<&Counter> {
        match self {
            Self::Counter(c) => Some(c),
            _ => None,
        }
    }

    /// Borrow as a timer, if this meter is one
    pub fn as_timer(&self) -> Option<&Timer> {
        match self {
            Self::Timer(t) => Some(t),
            _ => None,
        }
    }

    /// Borrow as a gauge, if this meter is one
    pub fn as_gauge(&self) -> Option<&Gauge> {
        match self {
            Self::Gauge(g) => Some(g),
            _ => None,
        }
    }

    /// Borrow as a distribution summary, if this meter is one
    pub fn as_summary(&self) -> Option<&DistributionSummary> {
        match self {
            Self::Summary(s) => Some(s),
            _ => None,
        }
    }

    /// Convert into a counter, if this meter is one
    pub fn into_counter(self) -> Option<Counter> {
        match self {
            Self::Counter(c) => Some(c),
            _ => None,
        }
    }

    /// Convert into a timer, if this meter is one
    pub fn into_timer(self) -> Option<Timer> {
        match self {
            Self::Timer(t) => Some(t),
            _ => None,
        }
    }

    /// Convert into a gauge, if this meter is one
    pub fn into_gauge(self) -> Option<Gauge> {
        match self {
            Self::Gauge(g) => Some(g),
            _ => None,
        }
    }

    /// Convert into a distribution summary, if this meter is one
    pub fn into_summary(self) -> Option<DistributionSummary> {
        match self {
            Self::Summary(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Debug for Meter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Meter")
            .field("id", self.id())
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}

impl From<Counter> for Meter {
    fn from(counter: Counter) -> Self {
        Self::Counter(counter)
    }
}

impl From<Timer> for Meter {
    fn from(timer: Timer) -> Self {
        Self::Timer(timer)
    }
}

impl From<Gauge> for Meter {
    fn from(gauge: Gauge) -> Self {
        Self::Gauge(gauge)
    }
}

impl From<DistributionSummary> for Meter {
    fn from(summary: DistributionSummary) -> Self {
        Self::Summary(summary)
    }
}
