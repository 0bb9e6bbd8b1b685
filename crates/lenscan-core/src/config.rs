use log::warn;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Parameters for the cluster-centroid analyzer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Minimum sample value counted as bright (inclusive).
    pub brightness_threshold: u8,
    /// Minimum number of bright samples needed to report a detection.
    pub min_cluster_count: u32,
    /// Grid step in both axes; 1 scans every pixel.
    pub sample_step: u32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            brightness_threshold: 170,
            min_cluster_count: 70,
            sample_step: 3,
        }
    }
}

impl AnalyzerConfig {
    pub fn new(brightness_threshold: u8, min_cluster_count: u32, sample_step: u32) -> Self {
        Self {
            brightness_threshold,
            min_cluster_count,
            sample_step,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_cluster_count == 0 {
            return Err(ConfigError::ZeroClusterCount);
        }
        if self.sample_step == 0 {
            return Err(ConfigError::ZeroSampleStep);
        }
        Ok(())
    }

    /// Copy of this config with zero counts and steps raised to 1.
    ///
    /// Used by the infallible entry points so that a bad config degrades
    /// instead of stalling the scan loop.
    pub fn sanitized(&self) -> Self {
        let mut cfg = *self;
        if cfg.min_cluster_count == 0 {
            warn!("min_cluster_count=0 raised to 1");
            cfg.min_cluster_count = 1;
        }
        if cfg.sample_step == 0 {
            warn!("sample_step=0 raised to 1");
            cfg.sample_step = 1;
        }
        cfg
    }

    /// Upper bound on the number of samples visited for a `width x height` plane.
    pub fn max_samples(&self, width: usize, height: usize) -> usize {
        let step = self.sample_step.max(1) as usize;
        width.div_ceil(step) * height.div_ceil(step)
    }
}
