//! JSON configuration and report helpers for batch scans.

use std::{
    fs,
    path::{Path, PathBuf},
};

use lenscan_core::{ClassifierConfig, DetectionResult};
use lenscan_session::{DisplaySize, OverlayModel};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Configuration for scanning a list of still frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// Preview surface `[width, height]`; when set, reports include the overlay.
    #[serde(default)]
    pub display: Option<[f32; 2]>,
    #[serde(default)]
    pub output_path: Option<String>,
}

impl ScanConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn output_path(&self) -> Option<PathBuf> {
        self.output_path.as_ref().map(PathBuf::from)
    }

    pub fn display_size(&self) -> Option<DisplaySize> {
        self.display.map(|[w, h]| DisplaySize::new(w, h))
    }
}

/// Result for one input frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub image_path: String,
    pub width: u32,
    pub height: u32,
    pub result: DetectionResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<OverlayModel>,
    /// Set when the frame could not be read; `result` is then negative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FrameReport {
    pub fn analyzed(
        image_path: impl Into<String>,
        width: u32,
        height: u32,
        result: DetectionResult,
        display: Option<DisplaySize>,
    ) -> Self {
        Self {
            image_path: image_path.into(),
            width,
            height,
            result,
            overlay: display.map(|d| OverlayModel::from_result(&result, d)),
            error: None,
        }
    }

    pub fn failed(image_path: impl Into<String>, error: impl ToString) -> Self {
        Self {
            image_path: image_path.into(),
            width: 0,
            height: 0,
            result: DetectionResult::negative(),
            overlay: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    #[serde(default)]
    pub config_path: Option<String>,
    pub classifier: ClassifierConfig,
    pub frames: Vec<FrameReport>,
}

impl ScanReport {
    pub fn detected_count(&self) -> usize {
        self.frames.iter().filter(|f| f.result.detected).count()
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
