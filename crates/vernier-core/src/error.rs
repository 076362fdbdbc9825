//! Error types for the meter registry
//!
//! Denied requests and absent lookups are modeled as values (no-op meters,
//! `Option`), never as errors. Errors cover identity conflicts, filter
//! faults, failed synthetic composition, and backend construction faults.

use thiserror::Error;

use crate::id::MeterType;

/// Result type alias for registry operations
pub type MetricsResult<T> = Result<T, MeterError>;

/// Main error type for the meter registry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeterError {
    /// An id is already bound to a meter of an incompatible kind
    #[error("meter '{name}' is already registered as a {existing}, requested a {requested}")]
    IdentityConflict {
        name: String,
        existing: MeterType,
        requested: MeterType,
    },

    /// A required lookup matched nothing
    #[error("no meter matching name '{name}'")]
    MeterNotFound { name: String },

    /// A filter operation failed while evaluating a registration
    #[error("meter filter failed for '{name}': {message}")]
    Filter { name: String, message: String },

    /// A synthetic child registration failed; the composite was rolled back
    #[error("synthetic meter '{child}' of '{parent}' failed: {source}")]
    Synthetic {
        parent: String,
        child: String,
        #[source]
        source: Box<MeterError>,
    },

    /// The backend could not construct an instrument
    #[error("backend could not create {kind} '{name}': {message}")]
    Backend {
        name: String,
        kind: MeterType,
        message: String,
    },
}

impl MeterError {
    /// Create a new filter fault
    pub fn filter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Filter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a new backend fault attributed to an id and kind
    pub fn backend(
        name: impl Into<String>,
        kind: MeterType,
        message: impl Into<String>,
    ) -> Self {
        Self::Backend {
            name: name.into(),
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn conflict(name: impl Into<String>, existing: MeterType, requested: MeterType) -> Self {
        Self::IdentityConflict {
            name: name.into(),
            existing,
            requested,
        }
    }
}
