//! # Multi-Channel Delay Line (Ring Buffer)
//!
//! One fixed-size circular buffer per channel, all sharing a single write
//! cursor. The cursor marks where the *first* sample of the current host
//! buffer gets written; a sample at offset `n` inside that buffer lives at
//! `write_cursor + n`. Only after the whole buffer has been processed does the
//! cursor move forward, by the buffer length:
//!
//! ```text
//!            write_cursor          write_cursor + n
//!                 │                       │
//!   ... ──────────▼───────────────────────▼──────────── ...
//!                 [ current host buffer   ]
//!                                 ▲
//!                                 └── read: write_cursor + n - delay
//! ```
//!
//! ## Index arithmetic
//!
//! Everything is `usize`, so a read position is formed by adding the
//! capacity before subtracting the delay:
//!
//! ```text
//! read_index = ((write_cursor + n) % capacity + capacity - delay) % capacity
//! ```
//!
//! With `1 <= delay <= capacity` the subtraction can never underflow, and the
//! final modulo keeps the result in `[0, capacity)`.
//!
//! The buffers are allocated once in [`DelayLine::new`]; reading, writing and
//! advancing never allocate.

use std::num::NonZeroUsize;

/// Ring buffers for up to [`MAX_CHANNELS`](super::chain::MAX_CHANNELS)
/// channels, `capacity` samples each.
pub struct DelayLine {
    /// One buffer per channel, every one exactly `capacity` long.
    channels: Vec<Vec<f32>>,

    /// Where offset 0 of the current host buffer is written.
    /// Always in `[0, capacity)`.
    write_cursor: usize,

    capacity: usize,
}

impl DelayLine {
    /// Allocate `num_channels` silent buffers of `capacity` samples.
    ///
    /// `NonZeroUsize` rules out the zero-length line, which would turn
    /// every modulo below into a division by zero.
    pub fn new(num_channels: usize, capacity: NonZeroUsize) -> Self {
        let capacity = capacity.get();
        Self {
            channels: (0..num_channels).map(|_| vec![0.0; capacity]).collect(),
            write_cursor: 0,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn write_cursor(&self) -> usize {
        self.write_cursor
    }

    /// Borrow one channel's buffer together with the shared cursor.
    ///
    /// Returns `None` for channels the line was not sized for, so callers can
    /// never address memory outside the allocation.
    pub fn channel_mut(&mut self, channel: usize) -> Option<DelayTap<'_>> {
        let write_cursor = self.write_cursor;
        self.channels
            .get_mut(channel)
            .map(|samples| DelayTap {
                samples,
                write_cursor,
            })
    }

    /// Move the cursor forward by a whole host buffer.
    pub fn advance(&mut self, num_frames: usize) {
        self.write_cursor = (self.write_cursor + num_frames % self.capacity) % self.capacity;
    }

    /// Silence every channel and rewind the cursor. Does not reallocate.
    pub fn clear(&mut self) {
        for channel in &mut self.channels {
            channel.fill(0.0);
        }
        self.write_cursor = 0;
    }
}

/// A single channel of a [`DelayLine`], addressed relative to the current
/// host buffer.
pub struct DelayTap<'a> {
    samples: &'a mut [f32],
    write_cursor: usize,
}

impl DelayTap<'_> {
    /// Read the sample written `delay` samples before `offset`.
    #[inline]
    pub fn read(&self, offset: usize, delay: usize) -> f32 {
        self.samples[read_index(self.write_cursor, offset, delay, self.samples.len())]
    }

    /// Store `value` at `offset` within the current host buffer.
    #[inline]
    pub fn write(&mut self, offset: usize, value: f32) {
        let index = write_index(self.write_cursor, offset, self.samples.len());
        self.samples[index] = value;
    }
}

/// `(write_cursor + offset - delay)` wrapped into `[0, capacity)`.
///
/// `delay` is clamped to `capacity` first so that adding `capacity` always
/// makes the subtraction non-negative. `capacity` must be non-zero.
#[inline]
pub fn read_index(write_cursor: usize, offset: usize, delay: usize, capacity: usize) -> usize {
    // A delay of more than one full lap would make the subtraction below
    // underflow. Nothing older than `capacity` samples is stored anyway.
    let delay = delay.min(capacity);

    // Where this sample is being written, already wrapped into the ring.
    let position = write_index(write_cursor, offset, capacity);

    // Step back `delay` slots. Adding `capacity` first keeps the value
    // non-negative (`usize` can't go below zero): with position = 3,
    // delay = 10, capacity = 100 → (3 + 100 - 10) % 100 = 93.
    (position + capacity - delay) % capacity
}

/// `(write_cursor + offset)` wrapped into `[0, capacity)`.
#[inline]
pub fn write_index(write_cursor: usize, offset: usize, capacity: usize) -> usize {
    // Reduce both terms before adding. A host buffer can be longer than the
    // line (e.g. 8192 samples against 4410), and reducing first also keeps
    // the sum far from overflow.
    (write_cursor % capacity + offset % capacity) % capacity
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
