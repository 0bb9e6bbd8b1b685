//! Single-writer observable detection state.
//!
//! The scan worker owns the only [`StatePublisher`]; any number of readers
//! hold a [`DetectionState`] and either poll [`DetectionState::current`],
//! block on [`DetectionState::wait_newer`], or receive snapshots through
//! [`DetectionState::subscribe`]. Subscriber queues are bounded: a subscriber
//! that falls behind misses snapshots instead of growing its queue, and
//! [`DetectionState::current`] always holds the newest one.

use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use lenscan_core::DetectionResult;
use serde::{Deserialize, Serialize};

/// One published result. Sequence 0 is the initial negative value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub sequence: u64,
    pub result: DetectionResult,
}

struct StateInner {
    current: Mutex<Snapshot>,
    changed: Condvar,
    subscribers: Mutex<Vec<SyncSender<Snapshot>>>,
}

impl StateInner {
    fn lock_current(&self) -> MutexGuard<'_, Snapshot> {
        // A poisoned snapshot is still a valid Copy value.
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Read side of the detection state.
#[derive(Clone)]
pub struct DetectionState {
    inner: Arc<StateInner>,
}

/// Write side of the detection state; exactly one exists per state.
pub struct StatePublisher {
    inner: Arc<StateInner>,
}

/// Create a new state starting at the negative result.
pub fn detection_state() -> (StatePublisher, DetectionState) {
    let inner = Arc::new(StateInner {
        current: Mutex::new(Snapshot {
            sequence: 0,
            result: DetectionResult::negative(),
        }),
        changed: Condvar::new(),
        subscribers: Mutex::new(Vec::new()),
    });
    (
        StatePublisher {
            inner: inner.clone(),
        },
        DetectionState { inner },
    )
}

impl StatePublisher {
    /// Publish a new result and notify readers. Returns the new snapshot.
    pub fn publish(&mut self, result: DetectionResult) -> Snapshot {
        let snapshot = {
            let mut current = self.inner.lock_current();
            current.sequence += 1;
            current.result = result;
            *current
        };
        self.inner.changed.notify_all();

        let mut subscribers = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        subscribers.retain(|tx| match tx.try_send(snapshot) {
            // A full queue means the subscriber is behind; it keeps what it has.
            Ok(()) | Err(TrySendError::Full(_)) => true,
            Err(TrySendError::Disconnected(_)) => false,
        });
        snapshot
    }

    /// Wake blocked readers without publishing, e.g. on shutdown.
    pub fn wake_all(&self) {
        self.inner.changed.notify_all();
    }
}

impl DetectionState {
    pub fn current(&self) -> Snapshot {
        *self.inner.lock_current()
    }

    /// Receive snapshots published after this call, holding at most one unread.
    pub fn subscribe(&self) -> Receiver<Snapshot> {
        self.subscribe_with_capacity(1)
    }

    /// Like [`DetectionState::subscribe`] with room for `capacity` unread snapshots.
    ///
    /// Snapshots published while the queue is full are not delivered to this
    /// subscriber.
    pub fn subscribe_with_capacity(&self, capacity: usize) -> Receiver<Snapshot> {
        let (tx, rx) = mpsc::sync_channel(capacity.max(1));
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .lock()
            .map(|s| s.len())
            .unwrap_or(0)
    }

    /// Block until a snapshot newer than `seen` exists, or `timeout` elapses.
    ///
    /// With `seen == None` the current snapshot is returned immediately. A
    /// timeout too large to represent as a deadline (e.g. `Duration::MAX`)
    /// waits without one.
    pub fn wait_newer(&self, seen: Option<u64>, timeout: Duration) -> Option<Snapshot> {
        let deadline = Instant::now().checked_add(timeout);
        let mut current = self.inner.lock_current();
        loop {
            match seen {
                Some(seq) if current.sequence <= seq => {}
                _ => return Some(*current),
            }
            current = match deadline {
                Some(deadline) => {
                    let remaining = deadline.checked_duration_since(Instant::now())?;
                    self.inner
                        .changed
                        .wait_timeout(current, remaining)
                        .unwrap_or_else(|e| e.into_inner())
                        .0
                }
                None => self
                    .inner
                    .changed
                    .wait(current)
                    .unwrap_or_else(|e| e.into_inner()),
            };
        }
    }
}
