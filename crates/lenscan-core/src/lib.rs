//! Core types and the brightness clustering analyzer.
//!
//! This crate is intentionally small and allocation-free on the hot path. It
//! does not depend on any concrete image or camera type: callers hand in a
//! borrowed [`LumaFrame`] per video frame and get a [`DetectionResult`] back.
//!
//! ```
//! use lenscan_core::{analyze, AnalyzerConfig, LumaFrame};
//!
//! let mut plane = vec![0u8; 64 * 48];
//! for y in 20..30 {
//!     for x in 10..20 {
//!         plane[y * 64 + x] = 255;
//!     }
//! }
//! let frame = LumaFrame::packed(64, 48, &plane);
//! let result = analyze(&frame, &AnalyzerConfig::new(170, 10, 1));
//! assert!(result.detected);
//! ```

mod analyzer;
mod config;
mod error;
mod frame;
mod logger;
mod result;
mod strategy;

pub use analyzer::{analyze, try_analyze};
pub use config::AnalyzerConfig;
pub use error::{AnalyzeError, ConfigError};
pub use frame::{FrameDims, LumaFrame, DEFAULT_HEIGHT, DEFAULT_WIDTH};
pub use result::DetectionResult;
pub use strategy::{
    BrightestPixel, BrightestPixelParams, BrightnessClassifier, ClassifierConfig, ClusterCentroid,
    MeanBrightness, MeanBrightnessParams,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
