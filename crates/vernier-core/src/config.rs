//! Distribution statistic configuration
//!
//! Describes how a distribution-producing meter (timer, distribution
//! summary) should be summarized. Every field is optional; [`merge`]
//! fills unset fields from another config without touching set ones, so
//! filters can layer defaults under a request.
//!
//! [`merge`]: DistributionStatisticConfig::merge

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Mergeable configuration for distribution-producing meters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionStatisticConfig {
    percentiles: Option<Vec<f64>>,
    percentile_histogram: Option<bool>,
    buckets: Option<Vec<f64>>,
    minimum_expected_value: Option<f64>,
    maximum_expected_value: Option<f64>,
    #[serde(default, with = "humantime_serde")]
    expiry: Option<Duration>,
    buffer_length: Option<usize>,
}

impl DistributionStatisticConfig {
    /// Start building a config
    pub fn builder() -> DistributionStatisticConfigBuilder {
        DistributionStatisticConfigBuilder {
            config: Self::default(),
        }
    }

    /// A config with every field unset
    pub fn unset() -> Self {
        Self::default()
    }

    /// Fill any unset field in `self` from `other`, leaving set fields
    /// untouched.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            percentiles: self
                .percentiles
                .clone()
                .or_else(|| other.percentiles.clone()),
            percentile_histogram: self.percentile_histogram.or(other.percentile_histogram),
            buckets: self.buckets.clone().or_else(|| other.buckets.clone()),
            minimum_expected_value: self
                .minimum_expected_value
                .or(other.minimum_expected_value),
            maximum_expected_value: self
                .maximum_expected_value
                .or(other.maximum_expected_value),
            expiry: self.expiry.or(other.expiry),
            buffer_length: self.buffer_length.or(other.buffer_length),
        }
    }

    /// Percentiles to publish, e.g. `[0.5, 0.95]`; empty when unset
    pub fn percentiles(&self) -> &[f64] {
        self.percentiles.as_deref().unwrap_or(&[])
    }

    /// Whether any percentile is configured for publication
    pub fn is_publishing_percentiles(&self) -> bool {
        !self.percentiles().is_empty()
    }

    /// Bucket boundaries for a published histogram; empty when unset
    pub fn buckets(&self) -> &[f64] {
        self.buckets.as_deref().unwrap_or(&[])
    }

    /// Whether a histogram should be published, either because percentile
    /// histograms were requested or explicit buckets are configured
    pub fn is_publishing_histogram(&self) -> bool {
        self.percentile_histogram.unwrap_or(false) || !self.buckets().is_empty()
    }

    /// Lower bound the backend should expect values above
    pub fn minimum_expected_value(&self) -> Option<f64> {
        self.minimum_expected_value
    }

    /// Upper bound the backend should expect values below
    pub fn maximum_expected_value(&self) -> Option<f64> {
        self.maximum_expected_value
    }

    /// How long samples should influence published statistics
    pub fn expiry(&self) -> Option<Duration> {
        self.expiry
    }

    /// Number of samples the backend should retain for snapshots
    pub fn buffer_length(&self) -> Option<usize> {
        self.buffer_length
    }
}

/// Builder for [`DistributionStatisticConfig`]
#[derive(Debug, Clone)]
pub struct DistributionStatisticConfigBuilder {
    config: DistributionStatisticConfig,
}

impl DistributionStatisticConfigBuilder {
    /// Percentiles to publish
    pub fn percentiles(mut self, percentiles: impl IntoIterator<Item = f64>) -> Self {
        self.config.percentiles = Some(percentiles.into_iter().collect());
        self
    }

    /// Publish a percentile histogram
    pub fn percentile_histogram(mut self, enabled: bool) -> Self {
        self.config.percentile_histogram = Some(enabled);
        self
    }

    /// Explicit histogram bucket boundaries
    pub fn buckets(mut self, buckets: impl IntoIterator<Item = f64>) -> Self {
        self.config.buckets = Some(buckets.into_iter().collect());
        self
    }

    /// Lower bound of expected values
    pub fn minimum_expected_value(mut self, value: f64) -> Self {
        self.config.minimum_expected_value = Some(value);
        self
    }

    /// Upper bound of expected values
    pub fn maximum_expected_value(mut self, value: f64) -> Self {
        self.config.maximum_expected_value = Some(value);
        self
    }

    /// How long samples should influence published statistics
    pub fn expiry(mut self, expiry: Duration) -> Self {
        self.config.expiry = Some(expiry);
        self
    }

    /// Number of samples retained for snapshots
    pub fn buffer_length(mut self, length: usize) -> Self {
        self.config.buffer_length = Some(length);
        self
    }

    /// Finish building
    pub fn build(self) -> DistributionStatisticConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_fills_only_unset_fields() {
        let receiver = DistributionStatisticConfig::builder()
            .percentiles([0.95])
            .build();
        let fallback = DistributionStatisticConfig::builder()
            .percentiles([0.5])
            .percentile_histogram(true)
            .buffer_length(256)
            .build();

        let merged = receiver.merge(&fallback);
        assert_eq!(merged.percentiles(), &[0.95]);
        assert!(merged.is_publishing_histogram());
        assert_eq!(merged.buffer_length(), Some(256));
    }

    #[test]
    fn merge_is_identity_against_unset() {
        let config = DistributionStatisticConfig::builder()
            .percentiles([0.5, 0.99])
            .maximum_expected_value(10.0)
            .build();
        assert_eq!(config.merge(&DistributionStatisticConfig::unset()), config);
    }

    #[test]
    fn histogram_publication_from_buckets_or_flag() {
        let unset = DistributionStatisticConfig::unset();
        assert!(!unset.is_publishing_histogram());

        let with_buckets = DistributionStatisticConfig::builder()
            .buckets([0.1, 0.5, 1.0])
            .build();
        assert!(with_buckets.is_publishing_histogram());

        let with_flag = DistributionStatisticConfig::builder()
            .percentile_histogram(true)
            .build();
        assert!(with_flag.is_publishing_histogram());
    }

    #[test]
    fn percentiles_default_empty() {
        assert!(!DistributionStatisticConfig::unset().is_publishing_percentiles());
        assert_eq!(DistributionStatisticConfig::unset().percentiles(), &[] as &[f64]);
    }
}
