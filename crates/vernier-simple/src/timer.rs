//! In-memory timer

use std::time::Duration;

use vernier_core::{DistributionStatisticConfig, TimerHandle};

use crate::distribution::DistributionRecorder;

/// Timer accumulating durations as seconds in a [`DistributionRecorder`]
#[derive(Debug)]
pub struct SimpleTimer {
    recorder: DistributionRecorder,
}

impl SimpleTimer {
    /// Create a timer honoring the merged distribution config
    pub fn new(config: &DistributionStatisticConfig) -> Self {
        Self {
            recorder: DistributionRecorder::new(config),
        }
    }

    /// Cumulative histogram counts per configured bucket, in seconds
    pub fn bucket_counts(&self) -> Vec<(f64, u64)> {
        self.recorder.bucket_counts()
    }
}

impl TimerHandle for SimpleTimer {
    fn record(&self, duration: Duration) {
        self.recorder.record(duration.as_secs_f64());
    }

    fn count(&self) -> u64 {
        self.recorder.count()
    }

    fn total_time(&self) -> Duration {
        Duration::from_secs_f64(self.recorder.total())
    }

    fn max(&self) -> Duration {
        Duration::from_secs_f64(self.recorder.max())
    }

    fn percentile(&self, percentile: f64) -> f64 {
        self.recorder.percentile(percentile)
    }
}
