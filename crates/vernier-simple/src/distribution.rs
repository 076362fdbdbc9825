//! Shared distribution state for timers and summaries

use std::collections::VecDeque;

use parking_lot::Mutex;

use vernier_core::DistributionStatisticConfig;

/// Samples retained for percentile snapshots when no buffer length is
/// configured.
const DEFAULT_BUFFER_LENGTH: usize = 1024;

/// Mutex-guarded distribution accumulator: count, total, max, cumulative
/// buckets from the config, and a bounded ring of recent samples for
/// percentile snapshots.
#[derive(Debug)]
pub(crate) struct DistributionRecorder {
    inner: Mutex<DistributionInner>,
    buffer_length: usize,
}

#[derive(Debug)]
struct DistributionInner {
    count: u64,
    total: f64,
    max: f64,
    buckets: Vec<(f64, u64)>,
    samples: VecDeque<f64>,
}

impl DistributionRecorder {
    pub fn new(config: &DistributionStatisticConfig) -> Self {
        let buckets = config.buckets().iter().map(|&bound| (bound, 0u64)).collect();
        Self {
            inner: Mutex::new(DistributionInner {
                count: 0,
                total: 0.0,
                max: 0.0,
                buckets,
                samples: VecDeque::new(),
            }),
            buffer_length: config.buffer_length().unwrap_or(DEFAULT_BUFFER_LENGTH),
        }
    }

    pub fn record(&self, value: f64) {
        if !value.is_finite() || value < 0.0 {
            return;
        }
        let mut inner = self.inner.lock();
        inner.count += 1;
        inner.total += value;
        inner.max = inner.max.max(value);
        for (bound, count) in &mut inner.buckets {
            if value <= *bound {
                *count += 1;
            }
        }
        while inner.samples.len() >= self.buffer_length.max(1) {
            inner.samples.pop_front();
        }
        inner.samples.push_back(value);
    }

    pub fn count(&self) -> u64 {
        self.inner.lock().count
    }

    pub fn total(&self) -> f64 {
        self.inner.lock().total
    }

    pub fn max(&self) -> f64 {
        self.inner.lock().max
    }

    /// Nearest-rank percentile over the retained samples; `0.0` before any
    /// value was recorded.
    pub fn percentile(&self, percentile: f64) -> f64 {
        let inner = self.inner.lock();
        if inner.samples.is_empty() {
            return 0.0;
        }
        let mut sorted: Vec<f64> = inner.samples.iter().copied().collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let rank = (percentile.clamp(0.0, 1.0) * (sorted.len() - 1) as f64).round() as usize;
        sorted[rank]
    }

    /// Cumulative bucket counts, `(upper bound, count)` per configured
    /// bucket
    pub fn bucket_counts(&self) -> Vec<(f64, u64)> {
        self.inner.lock().buckets.clone()
    }
}
