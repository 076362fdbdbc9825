//! In-memory counter

use std::sync::atomic::{AtomicU64, Ordering};

use vernier_core::CounterHandle;

/// Lock-free floating point counter.
///
/// The value lives in an `AtomicU64` as raw `f64` bits; increments are a
/// compare-exchange loop.
#[derive(Debug)]
pub struct SimpleCounter {
    bits: AtomicU64,
}

impl SimpleCounter {
    /// Create a counter at zero
    pub fn new() -> Self {
        Self {
            bits: AtomicU64::new(0f64.to_bits()),
        }
    }
}

impl Default for SimpleCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterHandle for SimpleCounter {
    fn increment(&self, amount: f64) {
        // Counters are monotonic; non-positive or non-finite amounts are
        // discarded.
        if !amount.is_finite() || amount <= 0.0 {
            return;
        }
        let mut current = self.bits.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + amount).to_bits();
            match self
                .bits
                .compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }

    fn count(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}
