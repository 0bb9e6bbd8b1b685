//! Cluster-centroid brightness analyzer.
//!
//! The scan visits a sparse grid (`sample_step` in both axes), counts samples
//! at or above `brightness_threshold` and reports the mean position of those
//! samples once at least `min_cluster_count` of them were seen. A lone hot
//! pixel therefore never trips a detection.
//!
//! The analyzer is a pure function of `(frame, config)`: no state survives the
//! call and the frame is only borrowed.

use log::{debug, warn};

use crate::frame::{sample_at, LumaFrame};
use crate::{AnalyzeError, AnalyzerConfig, DetectionResult};

/// Analyze one frame. Never fails: internal faults yield [`DetectionResult::negative`].
pub fn analyze(frame: &LumaFrame<'_>, config: &AnalyzerConfig) -> DetectionResult {
    match try_analyze(frame, config) {
        Ok(result) => result,
        Err(err) => {
            warn!("frame analysis failed, reporting no detection: {err}");
            DetectionResult::negative()
        }
    }
}

/// Fallible form of [`analyze`], exposing internal faults.
pub fn try_analyze(
    frame: &LumaFrame<'_>,
    config: &AnalyzerConfig,
) -> Result<DetectionResult, AnalyzeError> {
    let cfg = config.sanitized();
    if frame.is_degenerate() {
        debug!(
            "degenerate frame metadata (width={}, height={}, stride={}), using fallback dims",
            frame.width, frame.height, frame.stride
        );
    }
    let dims = frame.effective_dims();
    let step = cfg.sample_step as usize;
    let threshold = cfg.brightness_threshold;

    let mut sum_x = 0u64;
    let mut sum_y = 0u64;
    let mut count = 0u32;
    let mut skipped = 0usize;

    for y in (0..dims.height).step_by(step) {
        for x in (0..dims.width).step_by(step) {
            // An index that overflows is past any buffer; skip it like one.
            let Some(value) = sample_at(frame.data, dims.stride, x, y) else {
                skipped += 1;
                continue;
            };
            if value >= threshold {
                sum_x = sum_x
                    .checked_add(x as u64)
                    .ok_or(AnalyzeError::AccumulatorOverflow { count })?;
                sum_y = sum_y
                    .checked_add(y as u64)
                    .ok_or(AnalyzeError::AccumulatorOverflow { count })?;
                count = count
                    .checked_add(1)
                    .ok_or(AnalyzeError::AccumulatorOverflow { count })?;
            }
        }
    }

    if skipped > 0 {
        debug!("{skipped} sampled positions fell outside the buffer");
    }

    if count < cfg.min_cluster_count {
        return Ok(DetectionResult::below_count(count));
    }

    let n = count as f64;
    let cx = sum_x as f64 / n / dims.width as f64;
    let cy = sum_y as f64 / n / dims.height as f64;
    debug!("bright cluster: count={count}, centroid=({cx:.4}, {cy:.4})");
    Ok(DetectionResult::at(cx as f32, cy as f32, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn plane(width: usize, height: usize, bright: &[(usize, usize)]) -> Vec<u8> {
        let mut data = vec![0u8; width * height];
        for &(x, y) in bright {
            data[y * width + x] = 255;
        }
        data
    }

    #[test]
    fn dark_frame_is_negative() {
        let data = vec![40u8; 32 * 16];
        let frame = LumaFrame::packed(32, 16, &data);
        let res = analyze(&frame, &AnalyzerConfig::new(100, 1, 1));
        assert_eq!(res, DetectionResult::negative());
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut data = vec![0u8; 4 * 4];
        data[5] = 100;
        let frame = LumaFrame::packed(4, 4, &data);
        let res = analyze(&frame, &AnalyzerConfig::new(100, 1, 1));
        assert!(res.detected);
        assert_abs_diff_eq!(res.centroid.x, 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(res.centroid.y, 0.25, epsilon = 1e-6);
    }

    #[test]
    fn unsampled_pixels_are_ignored() {
        // (1, 1) is off the step-2 grid.
        let data = plane(8, 8, &[(1, 1)]);
        let frame = LumaFrame::packed(8, 8, &data);
        let res = analyze(&frame, &AnalyzerConfig::new(200, 1, 2));
        assert!(!res.detected);
        assert_eq!(res.bright_samples, 0);
    }

    #[test]
    fn below_count_reports_samples_but_centers() {
        let data = plane(8, 8, &[(0, 0), (2, 2)]);
        let frame = LumaFrame::packed(8, 8, &data);
        let res = analyze(&frame, &AnalyzerConfig::new(200, 3, 1));
        assert!(!res.detected);
        assert_eq!(res.bright_samples, 2);
        assert_eq!(res.centroid, DetectionResult::negative().centroid);
    }

    #[test]
    fn padding_columns_are_not_scanned() {
        // Width 4, stride 6: padding bytes at x=4,5 are bright but outside the row.
        let mut data = vec![0u8; 6 * 2];
        data[4] = 255;
        data[5] = 255;
        data[6 + 4] = 255;
        let frame = LumaFrame::new(4, 2, 6, &data);
        let res = analyze(&frame, &AnalyzerConfig::new(200, 1, 1));
        assert!(!res.detected);
    }

    #[test]
    fn zero_step_config_does_not_hang() {
        let data = plane(4, 4, &[(2, 2)]);
        let frame = LumaFrame::packed(4, 4, &data);
        let res = analyze(&frame, &AnalyzerConfig::new(200, 1, 0));
        assert!(res.detected);
        assert_abs_diff_eq!(res.centroid.x, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn overflowing_rows_are_skipped_not_fatal() {
        // Row 0 is readable; rows 1 and 2 overflow `y * stride`.
        let frame = LumaFrame::new(2, 3, usize::MAX, &[255, 255]);
        let cfg = AnalyzerConfig::new(200, 1, 1);
        let res = try_analyze(&frame, &cfg).unwrap();
        assert!(res.detected);
        assert_eq!(res.bright_samples, 2);
        assert_abs_diff_eq!(res.centroid.x, 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(res.centroid.y, 0.0, epsilon = 1e-6);
        assert_eq!(analyze(&frame, &cfg), res);
    }
}
