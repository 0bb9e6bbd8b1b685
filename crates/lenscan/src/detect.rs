use std::path::Path;

use lenscan_core::{analyze, AnalyzerConfig, BrightnessClassifier, DetectionResult, LumaFrame};
use lenscan_session::{DisplaySize, Frame, FramePool};
use log::{debug, warn};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::io::FrameReport;

/// Errors produced by the high-level facade helpers.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("invalid grayscale image buffer length (expected {expected} bytes, got {got})")]
    InvalidGrayBuffer { expected: usize, got: usize },

    #[error("invalid grayscale image dimensions (width={width}, height={height})")]
    InvalidGrayDimensions { width: u32, height: u32 },

    #[error(transparent)]
    Image(#[from] ::image::ImageError),
}

/// Borrow an `image::GrayImage` as a tightly packed luma plane.
pub fn luma_view(img: &::image::GrayImage) -> LumaFrame<'_> {
    LumaFrame::packed(img.width() as usize, img.height() as usize, img.as_raw())
}

/// Run the cluster-centroid analyzer on a grayscale image.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(img, cfg), fields(width = img.width(), height = img.height()))
)]
pub fn analyze_image(img: &::image::GrayImage, cfg: &AnalyzerConfig) -> DetectionResult {
    analyze(&luma_view(img), cfg)
}

/// Run any classifier on a grayscale image.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(img, classifier),
        fields(classifier = classifier.name(), width = img.width(), height = img.height())
    )
)]
pub fn classify_image(
    img: &::image::GrayImage,
    classifier: &dyn BrightnessClassifier,
) -> DetectionResult {
    classifier.classify(&luma_view(img))
}

/// Build a `GrayImage` from a packed row-major buffer, checking its length.
pub fn gray_image_from_slice(
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<::image::GrayImage, DetectError> {
    let w = usize::try_from(width).ok();
    let h = usize::try_from(height).ok();
    let Some((w, h)) = w.zip(h) else {
        return Err(DetectError::InvalidGrayDimensions { width, height });
    };
    let Some(expected) = w.checked_mul(h) else {
        return Err(DetectError::InvalidGrayDimensions { width, height });
    };
    if pixels.len() != expected {
        return Err(DetectError::InvalidGrayBuffer {
            expected,
            got: pixels.len(),
        });
    }
    ::image::GrayImage::from_raw(width, height, pixels.to_vec())
        .ok_or(DetectError::InvalidGrayDimensions { width, height })
}

pub fn analyze_gray_u8(
    width: u32,
    height: u32,
    pixels: &[u8],
    cfg: &AnalyzerConfig,
) -> Result<DetectionResult, DetectError> {
    let img = gray_image_from_slice(width, height, pixels)?;
    Ok(analyze_image(&img, cfg))
}

/// Decode an image file and convert it to 8-bit luma.
pub fn load_luma(path: impl AsRef<Path>) -> Result<::image::GrayImage, DetectError> {
    Ok(::image::open(path)?.to_luma8())
}

/// Decode an image file into a pooled [`Frame`] for a scan session.
pub fn load_frame(path: impl AsRef<Path>, pool: &FramePool) -> Result<Frame, DetectError> {
    let img = load_luma(path)?;
    let (w, h) = (img.width() as usize, img.height() as usize);
    Ok(Frame::copy_from(pool, w, h, w, img.as_raw()))
}

/// Classify each file in turn; unreadable files are reported, not fatal.
pub fn scan_files<P: AsRef<Path>>(
    paths: &[P],
    classifier: &dyn BrightnessClassifier,
    display: Option<DisplaySize>,
) -> Vec<FrameReport> {
    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            let name = path.display().to_string();
            match load_luma(path) {
                Ok(img) => {
                    let result = classify_image(&img, classifier);
                    debug!("{name}: detected={}", result.detected);
                    FrameReport::analyzed(name, img.width(), img.height(), result, display)
                }
                Err(err) => {
                    warn!("{name}: {err}");
                    FrameReport::failed(name, err)
                }
            }
        })
        .collect()
}
