use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Output of one frame analysis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub detected: bool,
    /// Normalized centroid in `[0, 1] x [0, 1]`; `(0.5, 0.5)` when nothing was found.
    pub centroid: Point2<f32>,
    /// Bright samples counted during the scan (0 for strategies that do not count).
    pub bright_samples: u32,
}

impl DetectionResult {
    /// The fail-safe "nothing found" value.
    pub fn negative() -> Self {
        Self {
            detected: false,
            centroid: Point2::new(0.5, 0.5),
            bright_samples: 0,
        }
    }

    pub fn at(x: f32, y: f32, bright_samples: u32) -> Self {
        Self {
            detected: true,
            centroid: Point2::new(x, y),
            bright_samples,
        }
    }

    /// Negative result that still reports how many bright samples were seen.
    pub(crate) fn below_count(bright_samples: u32) -> Self {
        Self {
            bright_samples,
            ..Self::negative()
        }
    }

    pub fn centroid_x(&self) -> f32 {
        self.centroid.x
    }

    pub fn centroid_y(&self) -> f32 {
        self.centroid.y
    }
}

impl Default for DetectionResult {
    fn default() -> Self {
        Self::negative()
    }
}
