//! Vernier: a vendor-neutral metrics instrumentation facade
//!
//! Re-exports the registration pipeline from `vernier-core` and the
//! in-memory reference backend from `vernier-simple`.
//!
//! ```
//! use vernier::{new_registry, Tag};
//!
//! let registry = new_registry();
//! let requests = registry
//!     .counter("http.requests", [Tag::new("method", "GET")])
//!     .unwrap();
//! requests.increment();
//! assert_eq!(requests.count(), 1.0);
//! ```

pub use vernier_core::*;
pub use vernier_simple::{new_registry, SimpleBackend};
