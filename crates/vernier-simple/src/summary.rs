//! In-memory distribution summary

use vernier_core::{DistributionStatisticConfig, SummaryHandle};

use crate::distribution::DistributionRecorder;

/// Distribution summary accumulating amounts in a
/// [`DistributionRecorder`]
#[derive(Debug)]
pub struct SimpleSummary {
    recorder: DistributionRecorder,
}

impl SimpleSummary {
    /// Create a summary honoring the merged distribution config
    pub fn new(config: &DistributionStatisticConfig) -> Self {
        Self {
            recorder: DistributionRecorder::new(config),
        }
    }

    /// Cumulative histogram counts per configured bucket
    pub fn bucket_counts(&self) -> Vec<(f64, u64)> {
        self.recorder.bucket_counts()
    }
}

impl SummaryHandle for SimpleSummary {
    fn record(&self, amount: f64) {
        self.recorder.record(amount);
    }

    fn count(&self) -> u64 {
        self.recorder.count()
    }

    fn total_amount(&self) -> f64 {
        self.recorder.total()
    }

    fn max(&self) -> f64 {
        self.recorder.max()
    }

    fn percentile(&self, percentile: f64) -> f64 {
        self.recorder.percentile(percentile)
    }
}
