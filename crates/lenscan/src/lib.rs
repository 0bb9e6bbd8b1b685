//! High-level facade crate for the `lenscan-*` workspace.
//!
//! This crate provides:
//! - stable re-exports of the analyzer (`lenscan-core`) and the per-camera
//!   scan session (`lenscan-session`)
//! - (feature-gated) helpers that run a classifier directly on an
//!   `image::GrayImage` or on image files
//! - JSON config and report types shared with the `lenscan` CLI
//!
//! ## Quickstart
//!
//! ```no_run
//! use lenscan::core::AnalyzerConfig;
//! use lenscan::detect;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = detect::load_luma("frame.png")?;
//! let result = detect::analyze_image(&img, &AnalyzerConfig::default());
//! println!("detected: {} at {:?}", result.detected, result.centroid);
//! # Ok(())
//! # }
//! ```
//!
//! ## Streaming
//!
//! For camera-rate input, start a [`session::ScanSession`] with a classifier
//! and submit frames as they arrive; the session analyzes only the newest one
//! and publishes results through [`session::DetectionState`].
//!
//! ## API map
//! - `lenscan::core`: frame view, analyzer config, detection result, strategies.
//! - `lenscan::session`: worker session, frame pool, observable state, overlay.
//! - `lenscan::io`: JSON scan config and report.
//! - `lenscan::detect` (feature `image`): helpers from `image::GrayImage` and files.

pub use lenscan_core as core;
pub use lenscan_session as session;

pub use lenscan_core::{
    analyze, AnalyzerConfig, BrightnessClassifier, ClassifierConfig, DetectionResult, LumaFrame,
};
pub use lenscan_session::{OverlayModel, ScanSession};

pub mod io;

#[cfg(feature = "image")]
pub mod detect;
