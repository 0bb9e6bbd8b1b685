//! Owned frames and a small buffer pool.
//!
//! A [`Frame`] owns its luma bytes through a [`FrameBuffer`]. Dropping the
//! frame releases the buffer: pooled buffers go back to their [`FramePool`]
//! (while it has room), unpooled ones are freed.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Weak};

use lenscan_core::LumaFrame;

type Slots = Mutex<VecDeque<Vec<u8>>>;

/// Recycles frame buffers between the camera source and the scan worker.
#[derive(Clone)]
pub struct FramePool {
    slots: Arc<Slots>,
    capacity: usize,
}

impl FramePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Take a zero-filled buffer of `len` bytes, reusing a released one if possible.
    pub fn acquire(&self, len: usize) -> FrameBuffer {
        let reused = self
            .slots
            .lock()
            .map(|mut slots| slots.pop_front())
            .unwrap_or(None);
        let mut data = reused.unwrap_or_default();
        data.clear();
        data.resize(len, 0);
        FrameBuffer {
            data,
            home: Some(PoolHome {
                slots: Arc::downgrade(&self.slots),
                capacity: self.capacity,
            }),
        }
    }

    /// Buffers currently waiting for reuse.
    pub fn available(&self) -> usize {
        self.slots.lock().map(|slots| slots.len()).unwrap_or(0)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

struct PoolHome {
    slots: Weak<Slots>,
    capacity: usize,
}

/// Owned byte storage for one frame.
pub struct FrameBuffer {
    data: Vec<u8>,
    home: Option<PoolHome>,
}

impl FrameBuffer {
    /// Buffer that is freed on drop instead of being recycled.
    pub fn unpooled(data: Vec<u8>) -> Self {
        Self { data, home: None }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_pooled(&self) -> bool {
        self.home.is_some()
    }
}

impl Drop for FrameBuffer {
    fn drop(&mut self) {
        let Some(home) = self.home.take() else {
            return;
        };
        let Some(pool) = home.slots.upgrade() else {
            return;
        };
        let Ok(mut slots) = pool.lock() else {
            return;
        };
        if slots.len() < home.capacity {
            slots.push_back(std::mem::take(&mut self.data));
        }
    }
}

/// One owned luma frame handed to a scan session.
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub stride: usize,
    pub buffer: FrameBuffer,
}

impl Frame {
    pub fn new(width: usize, height: usize, stride: usize, buffer: FrameBuffer) -> Self {
        Self {
            width,
            height,
            stride,
            buffer,
        }
    }

    /// Tightly packed, unpooled frame.
    pub fn from_vec(width: usize, height: usize, data: Vec<u8>) -> Self {
        Self::new(width, height, width, FrameBuffer::unpooled(data))
    }

    /// Copy `data` into a buffer from `pool`.
    pub fn copy_from(
        pool: &FramePool,
        width: usize,
        height: usize,
        stride: usize,
        data: &[u8],
    ) -> Self {
        let mut buffer = pool.acquire(data.len());
        buffer.as_mut_slice().copy_from_slice(data);
        Self::new(width, height, stride, buffer)
    }

    pub fn view(&self) -> LumaFrame<'_> {
        LumaFrame::new(self.width, self.height, self.stride, self.buffer.as_slice())
    }
}
