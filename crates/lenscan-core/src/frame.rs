//! Borrowed single-channel frame views.

/// Width substituted when a frame reports a zero width.
pub const DEFAULT_WIDTH: usize = 640;
/// Height substituted when a frame reports a zero height.
pub const DEFAULT_HEIGHT: usize = 480;

/// A luma (brightness-only) plane borrowed for the duration of one analysis.
///
/// `data` is row-major with `stride` samples per row. It may be shorter than
/// `stride * height` when the producer hands over a truncated buffer; reads
/// past the end are treated as missing samples, never as errors.
#[derive(Clone, Copy, Debug)]
pub struct LumaFrame<'a> {
    pub width: usize,
    pub height: usize,
    pub stride: usize,
    pub data: &'a [u8],
}

/// Dimensions actually used for scanning after the degenerate-size policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameDims {
    pub width: usize,
    pub height: usize,
    pub stride: usize,
}

impl<'a> LumaFrame<'a> {
    pub fn new(width: usize, height: usize, stride: usize, data: &'a [u8]) -> Self {
        Self {
            width,
            height,
            stride,
            data,
        }
    }

    /// Tightly packed plane (`stride == width`).
    pub fn packed(width: usize, height: usize, data: &'a [u8]) -> Self {
        Self::new(width, height, width, data)
    }

    /// Build a view from signed camera metadata.
    ///
    /// Negative values are mapped to zero and then go through the same
    /// fallback as zero-sized frames in [`LumaFrame::effective_dims`].
    pub fn from_metadata(width: i64, height: i64, stride: i64, data: &'a [u8]) -> Self {
        let clamp = |v: i64| usize::try_from(v).unwrap_or(0);
        Self::new(clamp(width), clamp(height), clamp(stride), data)
    }

    /// Apply the malformed-metadata policy.
    ///
    /// - `width == 0` becomes [`DEFAULT_WIDTH`], `height == 0` becomes [`DEFAULT_HEIGHT`];
    /// - a stride smaller than the effective width (including zero) is replaced
    ///   by the effective width.
    pub fn effective_dims(&self) -> FrameDims {
        let width = if self.width == 0 {
            DEFAULT_WIDTH
        } else {
            self.width
        };
        let height = if self.height == 0 {
            DEFAULT_HEIGHT
        } else {
            self.height
        };
        let stride = self.stride.max(width);
        FrameDims {
            width,
            height,
            stride,
        }
    }

    /// True when any of the reported dimensions had to be substituted.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0 || self.stride < self.width
    }

    /// Number of samples a well-formed buffer would hold.
    pub fn expected_len(&self) -> Option<usize> {
        let dims = self.effective_dims();
        dims.stride.checked_mul(dims.height)
    }

    /// Read the sample at `(x, y)` using the effective stride.
    ///
    /// Returns `None` when the index falls outside `data` or overflows.
    #[inline]
    pub fn sample(&self, x: usize, y: usize) -> Option<u8> {
        let stride = self.effective_dims().stride;
        sample_at(self.data, stride, x, y)
    }
}

#[inline]
pub(crate) fn linear_index(stride: usize, x: usize, y: usize) -> Option<usize> {
    y.checked_mul(stride)?.checked_add(x)
}

#[inline]
pub(crate) fn sample_at(data: &[u8], stride: usize, x: usize, y: usize) -> Option<u8> {
    linear_index(stride, x, y).and_then(|idx| data.get(idx).copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dims_fall_back_to_defaults() {
        let frame = LumaFrame::new(0, 0, 0, &[]);
        let dims = frame.effective_dims();
        assert_eq!(dims.width, DEFAULT_WIDTH);
        assert_eq!(dims.height, DEFAULT_HEIGHT);
        assert_eq!(dims.stride, DEFAULT_WIDTH);
        assert!(frame.is_degenerate());
    }

    #[test]
    fn negative_metadata_is_treated_as_zero() {
        let frame = LumaFrame::from_metadata(-5, 10, -1, &[]);
        let dims = frame.effective_dims();
        assert_eq!(dims.width, DEFAULT_WIDTH);
        assert_eq!(dims.height, 10);
        assert_eq!(dims.stride, DEFAULT_WIDTH);
    }

    #[test]
    fn padded_stride_is_kept() {
        let data = vec![0u8; 8 * 2];
        let frame = LumaFrame::new(6, 2, 8, &data);
        assert_eq!(frame.effective_dims().stride, 8);
        assert!(!frame.is_degenerate());
        assert_eq!(frame.expected_len(), Some(16));
    }

    #[test]
    fn sample_respects_stride_and_bounds() {
        let mut data = vec![0u8; 4 * 3];
        data[2 * 4 + 1] = 9;
        let frame = LumaFrame::new(3, 3, 4, &data);
        assert_eq!(frame.sample(1, 2), Some(9));
        assert_eq!(frame.sample(3, 2), Some(0)); // padding column
        assert_eq!(frame.sample(0, 3), None);
        assert_eq!(frame.sample(usize::MAX, usize::MAX), None);
    }
}
