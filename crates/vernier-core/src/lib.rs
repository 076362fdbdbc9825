//! Vernier core: the registration pipeline of a vendor-neutral metrics
//! facade
//!
//! Application code asks a [`MeterRegistry`] for named, tagged instruments
//! (counters, timers, gauges, distribution summaries) without knowing which
//! monitoring backend receives the data. This crate owns identity modeling,
//! the meter-filter chain that can deny, rename, or reconfigure a request
//! before creation, the concurrency-safe create-or-fetch store, synthetic
//! percentile-gauge composition, and the open/closed lifecycle that
//! degrades to no-op instruments after shutdown.
//!
//! How a concrete meter aggregates or exports values is a backend concern,
//! reached only through the [`MeterBackend`] capability supplied at
//! registry construction (see the `vernier-simple` crate for an in-memory
//! reference backend).

pub mod backend;
pub mod config;
pub mod error;
pub mod filter;
pub mod id;
pub mod instrument;
pub mod registry;
pub mod search;
mod store;

// Re-export commonly used types
pub use backend::{
    CounterHandle, GaugeHandle, MeterBackend, PauseDetector, SummaryHandle, TimerHandle,
    ValueSupplier,
};
pub use config::{DistributionStatisticConfig, DistributionStatisticConfigBuilder};
pub use error::{MeterError, MetricsResult};
pub use filter::{MeterFilter, MeterFilterBuilder, MeterFilterReply};
pub use id::{Id, MeterType, Tag};
pub use instrument::{
    Counter, CounterBuilder, DistributionSummary, DistributionSummaryBuilder, Gauge, GaugeBuilder,
    Meter, Timer, TimerBuilder,
};
pub use registry::{AcceptPolicy, MeterRegistry, RegistryConfig};
pub use search::{RequiredSearch, Search};
