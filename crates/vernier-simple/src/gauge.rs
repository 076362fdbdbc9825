//! In-memory gauge

use vernier_core::{GaugeHandle, ValueSupplier};

/// Gauge reading its value from the registered supplier on every call
pub struct SimpleGauge {
    supplier: ValueSupplier,
}

impl SimpleGauge {
    /// Create a gauge over `supplier`
    pub fn new(supplier: ValueSupplier) -> Self {
        Self { supplier }
    }
}

impl GaugeHandle for SimpleGauge {
    fn value(&self) -> f64 {
        (self.supplier)()
    }
}
