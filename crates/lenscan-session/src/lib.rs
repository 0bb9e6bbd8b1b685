//! Scan sessions around the `lenscan-core` analyzer.
//!
//! - [`ScanSession`]: one worker thread per camera, keep-only-latest frame slot.
//! - [`FramePool`] / [`Frame`]: owned frames whose buffers are recycled on drop.
//! - [`DetectionState`]: the latest published result, observable from any thread.
//! - [`OverlayModel`]: what a preview renderer draws for a result.

mod error;
mod frame;
mod overlay;
mod session;
mod state;

pub use error::SessionError;
pub use frame::{Frame, FrameBuffer, FramePool};
pub use overlay::{
    DisplaySize, Marker, OverlayModel, MARKER_RADIUS_FRACTION, STATUS_DETECTED, STATUS_SCANNING,
};
pub use session::{ScanSession, SessionOptions, SessionStats, SubmitOutcome};
pub use state::{detection_state, DetectionState, Snapshot, StatePublisher};
