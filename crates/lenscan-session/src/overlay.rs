//! Display-space overlay derived from a detection result.

use lenscan_core::DetectionResult;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

pub const STATUS_DETECTED: &str = "⚠ Hidden camera detected";
pub const STATUS_SCANNING: &str = "Scanning for hidden lenses...";

/// Marker radius as a fraction of the smaller display side.
pub const MARKER_RADIUS_FRACTION: f32 = 0.06;

/// Size of the surface the overlay is drawn on, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: f32,
    pub height: f32,
}

impl DisplaySize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub center: Point2<f32>,
    pub radius: f32,
}

/// What the renderer draws for one result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverlayModel {
    pub status: String,
    pub alert: bool,
    pub marker: Option<Marker>,
}

impl OverlayModel {
    pub fn from_result(result: &DetectionResult, display: DisplaySize) -> Self {
        if !result.detected {
            return Self {
                status: STATUS_SCANNING.to_owned(),
                alert: false,
                marker: None,
            };
        }

        let nx = clamp_unit(result.centroid.x);
        let ny = clamp_unit(result.centroid.y);
        Self {
            status: STATUS_DETECTED.to_owned(),
            alert: true,
            marker: Some(Marker {
                center: Point2::new(nx * display.width, ny * display.height),
                radius: display.width.min(display.height) * MARKER_RADIUS_FRACTION,
            }),
        }
    }
}

// NaN maps to the center rather than propagating into draw calls.
fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.5
    } else {
        v.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn negative_result_has_no_marker() {
        let model =
            OverlayModel::from_result(&DetectionResult::negative(), DisplaySize::new(1080.0, 1920.0));
        assert_eq!(model.status, STATUS_SCANNING);
        assert!(!model.alert);
        assert!(model.marker.is_none());
    }

    #[test]
    fn marker_scales_to_display() {
        let res = DetectionResult::at(0.25, 0.5, 100);
        let model = OverlayModel::from_result(&res, DisplaySize::new(1000.0, 2000.0));
        assert_eq!(model.status, STATUS_DETECTED);
        assert!(model.alert);
        let marker = model.marker.unwrap();
        assert_abs_diff_eq!(marker.center.x, 250.0, epsilon = 1e-3);
        assert_abs_diff_eq!(marker.center.y, 1000.0, epsilon = 1e-3);
        assert_abs_diff_eq!(marker.radius, 60.0, epsilon = 1e-3);
    }

    #[test]
    fn out_of_range_centroid_is_clamped() {
        let res = DetectionResult::at(1.4, -0.2, 100);
        let marker = OverlayModel::from_result(&res, DisplaySize::new(200.0, 100.0))
            .marker
            .unwrap();
        assert_eq!(marker.center, Point2::new(200.0, 0.0));
    }
}
