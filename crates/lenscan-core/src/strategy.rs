//! Interchangeable frame brightness classifiers.
//!
//! [`ClusterCentroid`] is the canonical strategy. [`BrightestPixel`] and
//! [`MeanBrightness`] are simpler heuristics kept for comparison; they share
//! the same fail-safe contract (never panic on malformed frames, fall back to
//! the negative result).

use log::debug;
use serde::{Deserialize, Serialize};

use crate::frame::sample_at;
use crate::{analyze, AnalyzerConfig, ConfigError, DetectionResult, LumaFrame};

/// Classify the brightness pattern of a single frame.
pub trait BrightnessClassifier: Send + Sync {
    /// Short stable identifier, used in logs and reports.
    fn name(&self) -> &'static str;

    fn classify(&self, frame: &LumaFrame<'_>) -> DetectionResult;
}

/// Centroid of all bright samples, gated by a minimum count.
#[derive(Clone, Debug, Default)]
pub struct ClusterCentroid {
    config: AnalyzerConfig,
}

impl ClusterCentroid {
    pub fn new(config: AnalyzerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }
}

impl BrightnessClassifier for ClusterCentroid {
    fn name(&self) -> &'static str {
        "cluster_centroid"
    }

    fn classify(&self, frame: &LumaFrame<'_>) -> DetectionResult {
        analyze(frame, &self.config)
    }
}

/// Parameters for [`BrightestPixel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrightestPixelParams {
    /// The peak must be strictly brighter than this.
    pub min_peak: u8,
    pub sample_step: u32,
}

impl Default for BrightestPixelParams {
    fn default() -> Self {
        Self {
            min_peak: 200,
            sample_step: 10,
        }
    }
}

/// Location of the single brightest sampled pixel.
///
/// Sensitive to hot pixels; the first maximum in scan order wins.
#[derive(Clone, Debug)]
pub struct BrightestPixel {
    params: BrightestPixelParams,
}

impl BrightestPixel {
    pub fn new(params: BrightestPixelParams) -> Result<Self, ConfigError> {
        if params.sample_step == 0 {
            return Err(ConfigError::ZeroSampleStep);
        }
        Ok(Self { params })
    }
}

impl BrightnessClassifier for BrightestPixel {
    fn name(&self) -> &'static str {
        "brightest_pixel"
    }

    fn classify(&self, frame: &LumaFrame<'_>) -> DetectionResult {
        let dims = frame.effective_dims();
        let step = self.params.sample_step.max(1) as usize;
        let mut peak: Option<(u8, usize, usize)> = None;

        for y in (0..dims.height).step_by(step) {
            for x in (0..dims.width).step_by(step) {
                let Some(value) = sample_at(frame.data, dims.stride, x, y) else {
                    continue;
                };
                if peak.is_none_or(|(best, _, _)| value > best) {
                    peak = Some((value, x, y));
                }
            }
        }

        match peak {
            Some((value, x, y)) if value > self.params.min_peak => {
                debug!("brightest sample {value} at ({x}, {y})");
                DetectionResult::at(
                    (x as f64 / dims.width as f64) as f32,
                    (y as f64 / dims.height as f64) as f32,
                    1,
                )
            }
            _ => DetectionResult::negative(),
        }
    }
}

/// Parameters for [`MeanBrightness`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeanBrightnessParams {
    /// The mean must be strictly above this.
    pub min_mean: f32,
    pub sample_step: u32,
}

impl Default for MeanBrightnessParams {
    fn default() -> Self {
        Self {
            min_mean: 180.0,
            sample_step: 1,
        }
    }
}

/// Whole-frame mean brightness; has no notion of location.
#[derive(Clone, Debug)]
pub struct MeanBrightness {
    params: MeanBrightnessParams,
}

impl MeanBrightness {
    pub fn new(params: MeanBrightnessParams) -> Result<Self, ConfigError> {
        if params.sample_step == 0 {
            return Err(ConfigError::ZeroSampleStep);
        }
        if !params.min_mean.is_finite() || !(0.0..=255.0).contains(&params.min_mean) {
            return Err(ConfigError::InvalidMeanThreshold {
                value: params.min_mean,
            });
        }
        Ok(Self { params })
    }

    /// Mean of the sampled values, `None` when no sample could be read.
    pub fn mean(&self, frame: &LumaFrame<'_>) -> Option<f64> {
        let dims = frame.effective_dims();
        let step = self.params.sample_step.max(1) as usize;
        let mut sum = 0u64;
        let mut n = 0u64;
        for y in (0..dims.height).step_by(step) {
            for x in (0..dims.width).step_by(step) {
                if let Some(v) = sample_at(frame.data, dims.stride, x, y) {
                    sum += v as u64;
                    n += 1;
                }
            }
        }
        (n > 0).then(|| sum as f64 / n as f64)
    }
}

impl BrightnessClassifier for MeanBrightness {
    fn name(&self) -> &'static str {
        "mean_brightness"
    }

    fn classify(&self, frame: &LumaFrame<'_>) -> DetectionResult {
        match self.mean(frame) {
            Some(mean) if mean > self.params.min_mean as f64 => {
                debug!("mean brightness {mean:.1} above {}", self.params.min_mean);
                DetectionResult::at(0.5, 0.5, 0)
            }
            _ => DetectionResult::negative(),
        }
    }
}

/// Serializable choice of strategy, tagged by `"kind"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierConfig {
    ClusterCentroid(AnalyzerConfig),
    BrightestPixel(BrightestPixelParams),
    MeanBrightness(MeanBrightnessParams),
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::ClusterCentroid(AnalyzerConfig::default())
    }
}

impl ClassifierConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ClusterCentroid(_) => "cluster_centroid",
            Self::BrightestPixel(_) => "brightest_pixel",
            Self::MeanBrightness(_) => "mean_brightness",
        }
    }

    pub fn build(&self) -> Result<Box<dyn BrightnessClassifier>, ConfigError> {
        Ok(match self {
            Self::ClusterCentroid(cfg) => Box::new(ClusterCentroid::new(*cfg)?),
            Self::BrightestPixel(params) => Box::new(BrightestPixel::new(*params)?),
            Self::MeanBrightness(params) => Box::new(MeanBrightness::new(*params)?),
        })
    }
}
