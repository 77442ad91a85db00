//! Accumulates bus bytes into complete frames
//!
//! Completion is re-evaluated after every appended byte. Once the buffered
//! bytes hold a complete frame, exactly `LENGTH + 5` bytes are taken off the
//! front; anything after them stays buffered as the start of the next frame.

use heapless::Vec;

use crate::frame::{frame_len, MAX_FRAME_SIZE};

/// Raw bytes of one complete frame
pub type FrameBytes = Vec<u8, MAX_FRAME_SIZE>;

/// Frame accumulator for a byte stream
#[derive(Debug, Clone, Default)]
pub struct FrameAccumulator {
    buffer: Vec<u8, MAX_FRAME_SIZE>,
}

impl FrameAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Drop any partially received frame
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Number of bytes buffered
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Feed a single byte
    ///
    /// Returns the frame it completes, if any.
    pub fn feed(&mut self, byte: u8) -> Option<FrameBytes> {
        // A buffer at capacity always holds a complete frame, which was
        // taken by the previous call, so this cannot overflow.
        let _ = self.buffer.push(byte);
        self.take_frame()
    }

    /// Feed multiple bytes
    ///
    /// Returns the first complete frame found and the number of bytes
    /// consumed from `bytes`. Bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> (Option<FrameBytes>, usize) {
        for (i, &byte) in bytes.iter().enumerate() {
            if let Some(frame) = self.feed(byte) {
                return (Some(frame), i + 1);
            }
        }
        (None, bytes.len())
    }

    /// Take one complete frame off the front of the buffer, if present
    ///
    /// Call repeatedly after bulk-loading to drain pipelined frames.
    pub fn take_frame(&mut self) -> Option<FrameBytes> {
        let len = frame_len(&self.buffer)?;
        if self.buffer.len() < len {
            return None;
        }

        let mut frame = FrameBytes::new();
        // Same capacity on both sides
        let _ = frame.extend_from_slice(&self.buffer[..len]);

        let rest = self.buffer.len() - len;
        self.buffer.copy_within(len.., 0);
        self.buffer.truncate(rest);

        Some(frame)
    }
}
