//! Fixed-capacity staging buffers owned by the stream adapters.
//!
//! A [`StagingBuffer`] keeps a read/write cursor pair over one region:
//! bytes in `start..end` are pending, the rest is free. The writer uses it
//! as the engine's output region before forwarding to the sink; the reader
//! uses one for compressed intake from the source and one for decompressed
//! bytes that outlive a single caller `read`.
//!
//! # Sizes
//!
//! - Reader intake: 16 KiB by default
//! - Writer output: 32 KiB by default
//!
//! Capacity only trades throughput against latency; any capacity of at least
//! one byte is correct.

/// Common staging capacities.
pub mod sizes {
    /// Default read-side staging capacity (16 KiB).
    pub const READ: usize = 16 * 1024;
    /// Default write-side staging capacity (32 KiB).
    pub const WRITE: usize = 32 * 1024;
}

/// A fixed region with pending bytes between `start` and `end`.
#[derive(Debug, Clone)]
pub struct StagingBuffer {
    /// The underlying region.
    buffer: Box<[u8]>,
    /// First pending byte.
    start: usize,
    /// One past the last pending byte.
    end: usize,
}

impl StagingBuffer {
    /// Create a new staging buffer.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than 0");
        Self {
            buffer: vec![0; capacity].into_boxed_slice(),
            start: 0,
            end: 0,
        }
    }

    /// Region capacity.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Number of pending bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Offset of the first pending byte.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Pending bytes.
    pub fn pending(&self) -> &[u8] {
        &self.buffer[self.start..self.end]
    }

    /// The filled prefix `0..end`, including bytes already consumed.
    ///
    /// Paired with [`start`](Self::start) this rebuilds an input cursor that
    /// resumes where the previous step stopped.
    pub fn filled(&self) -> &[u8] {
        &self.buffer[..self.end]
    }

    /// Mark `count` pending bytes as consumed.
    pub fn consume(&mut self, count: usize) {
        self.start = (self.start + count).min(self.end);
        if self.start == self.end {
            self.clear();
        }
    }

    /// Forget all pending bytes.
    pub fn clear(&mut self) {
        self.start = 0;
        self.end = 0;
    }

    /// Hand out the whole region for a refill, discarding pending bytes.
    ///
    /// Follow with [`set_filled`](Self::set_filled) once the region is written.
    pub fn region_mut(&mut self) -> &mut [u8] {
        self.clear();
        &mut self.buffer
    }

    /// Record that the first `len` bytes of the region are now pending.
    pub fn set_filled(&mut self, len: usize) {
        self.start = 0;
        self.end = len.min(self.buffer.len());
    }

    /// Copy pending bytes into `dst`, consuming them. Returns bytes copied.
    pub fn copy_to(&mut self, dst: &mut [u8]) -> usize {
        let n = self.len().min(dst.len());
        dst[..n].copy_from_slice(&self.buffer[self.start..self.start + n]);
        self.consume(n);
        n
    }
}
