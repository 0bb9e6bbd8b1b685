/// Invalid analyzer or strategy parameters.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("min_cluster_count must be at least 1")]
    ZeroClusterCount,
    #[error("sample_step must be at least 1")]
    ZeroSampleStep,
    #[error("min_mean must be a finite value in [0, 255] (got {value})")]
    InvalidMeanThreshold { value: f32 },
}

/// Internal faults raised while scanning a frame.
///
/// These never reach callers of [`crate::analyze`]; they are logged and the
/// negative result is returned instead.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyzeError {
    #[error("accumulator overflow after {count} bright samples")]
    AccumulatorOverflow { count: u32 },
}
