//! Per-camera scan session.
//!
//! A session owns one worker thread and a single-frame slot. Producers call
//! [`ScanSession::submit`] at camera rate; a frame still waiting in the slot
//! when the next one arrives is released and replaced, so the worker always
//! analyzes the most recent frame and the producer never blocks on analysis.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use lenscan_core::{BrightnessClassifier, DetectionResult};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::frame::Frame;
use crate::state::{detection_state, DetectionState, StatePublisher};
use crate::SessionError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Name given to the worker thread.
    pub thread_name: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            thread_name: "lenscan-scan".to_owned(),
        }
    }
}

/// Whether a submitted frame displaced one that was still waiting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Queued,
    Replaced,
}

/// Counters since the session started.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub submitted: u64,
    pub analyzed: u64,
    /// Frames released without analysis because a newer one arrived.
    pub dropped: u64,
    /// Analyses that panicked and were published as negative.
    pub faults: u64,
}

struct Slot {
    pending: Option<Frame>,
    stop_request: bool,
    stats: SessionStats,
}

struct Shared {
    slot: Mutex<Slot>,
    frame_available: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub struct ScanSession {
    shared: Arc<Shared>,
    state: DetectionState,
    classifier_name: &'static str,
    worker: Option<JoinHandle<()>>,
}

impl ScanSession {
    pub fn start(
        classifier: Box<dyn BrightnessClassifier>,
        options: SessionOptions,
    ) -> Result<Self, SessionError> {
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot {
                pending: None,
                stop_request: false,
                stats: SessionStats::default(),
            }),
            frame_available: Condvar::new(),
        });
        let (publisher, state) = detection_state();
        let classifier_name = classifier.name();

        let worker_shared = shared.clone();
        let worker = thread::Builder::new()
            .name(options.thread_name.clone())
            .spawn(move || run_worker(classifier, worker_shared, publisher))?;

        info!(
            "scan session started (classifier={classifier_name}, thread={})",
            options.thread_name
        );
        Ok(Self {
            shared,
            state,
            classifier_name,
            worker: Some(worker),
        })
    }

    /// Hand a frame to the worker without waiting for analysis.
    pub fn submit(&self, frame: Frame) -> Result<SubmitOutcome, SessionError> {
        let displaced = {
            let mut slot = self.shared.lock();
            if slot.stop_request {
                return Err(SessionError::Stopped);
            }
            slot.stats.submitted += 1;
            let displaced = slot.pending.replace(frame);
            if displaced.is_some() {
                slot.stats.dropped += 1;
            }
            displaced
        };
        self.shared.frame_available.notify_one();

        Ok(match displaced {
            Some(old) => {
                debug!("dropping stale {}x{} frame", old.width, old.height);
                drop(old);
                SubmitOutcome::Replaced
            }
            None => SubmitOutcome::Queued,
        })
    }

    pub fn state(&self) -> DetectionState {
        self.state.clone()
    }

    pub fn latest(&self) -> DetectionResult {
        self.state.current().result
    }

    pub fn stats(&self) -> SessionStats {
        self.shared.lock().stats
    }

    pub fn classifier_name(&self) -> &'static str {
        self.classifier_name
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Stop the worker, release any pending frame, and join the thread.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        let pending = {
            let mut slot = self.shared.lock();
            slot.stop_request = true;
            slot.pending.take()
        };
        drop(pending);
        self.shared.frame_available.notify_all();

        if worker.join().is_err() {
            warn!("scan worker exited with a panic");
        }
        info!("scan session stopped: {:?}", self.stats());
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip_all, fields(classifier = classifier.name()))
)]
fn run_worker(
    classifier: Box<dyn BrightnessClassifier>,
    shared: Arc<Shared>,
    mut publisher: StatePublisher,
) {
    loop {
        let frame = {
            let mut slot = shared.lock();
            while slot.pending.is_none() && !slot.stop_request {
                slot = shared
                    .frame_available
                    .wait(slot)
                    .unwrap_or_else(|e| e.into_inner());
            }
            if slot.stop_request {
                break;
            }
            match slot.pending.take() {
                Some(frame) => frame,
                None => continue,
            }
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| classifier.classify(&frame.view())));
        drop(frame);

        let (result, faulted) = match outcome {
            Ok(result) => (result, false),
            Err(payload) => {
                error!(
                    "{} panicked: {}; publishing negative result",
                    classifier.name(),
                    panic_message(payload.as_ref())
                );
                (DetectionResult::negative(), true)
            }
        };

        {
            let mut slot = shared.lock();
            slot.stats.analyzed += 1;
            if faulted {
                slot.stats.faults += 1;
            }
        }
        let snapshot = publisher.publish(result);
        debug!(
            "published #{} detected={} centroid=({:.3}, {:.3})",
            snapshot.sequence,
            result.detected,
            result.centroid.x,
            result.centroid.y
        );
    }
    publisher.wake_all();
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
