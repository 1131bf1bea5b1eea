//! Buffer cursors passed into every engine step.
//!
//! A cursor pairs a byte region with a position. The engine advances the
//! position of the [`InputCursor`] as it consumes bytes and the position of
//! the [`OutputCursor`] as it produces them; this is the whole progress
//! contract between the adapters and the engine.
//!
//! Invariants:
//! - `InputCursor::pos() <= InputCursor::len()`; equality means exhausted.
//! - `OutputCursor::pos() <= OutputCursor::capacity()`.
//! - An output cursor always starts at position 0: the engine writes from the
//!   start of the region it is handed, and the caller drains between calls.

/// Read side of a step: bytes the engine may consume.
#[derive(Debug, Clone, Copy)]
pub struct InputCursor<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> InputCursor<'a> {
    /// Create a cursor over `src`, fully unconsumed.
    pub fn new(src: &'a [u8]) -> Self {
        Self { src, pos: 0 }
    }

    /// Create a cursor over `src` with the first `pos` bytes already consumed.
    ///
    /// `pos` is clamped to `src.len()`.
    pub fn at(src: &'a [u8], pos: usize) -> Self {
        Self {
            src,
            pos: pos.min(src.len()),
        }
    }

    /// An explicitly empty cursor: tells the engine no more input is coming.
    pub fn empty() -> Self {
        Self { src: &[], pos: 0 }
    }

    /// The full source region.
    pub fn src(&self) -> &'a [u8] {
        self.src
    }

    /// Bytes consumed so far.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Total length of the source region.
    pub fn len(&self) -> usize {
        self.src.len()
    }

    /// True if the source region has zero length.
    pub fn is_empty(&self) -> bool {
        self.src.is_empty()
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.src.len() - self.pos
    }

    /// The unconsumed tail of the region.
    pub fn unconsumed(&self) -> &'a [u8] {
        &self.src[self.pos..]
    }

    /// True once every byte has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// Mark `count` more bytes as consumed, saturating at the region length.
    pub fn consume(&mut self, count: usize) {
        self.pos = self.pos.saturating_add(count).min(self.src.len());
    }
}

/// Write side of a step: space the engine may fill.
#[derive(Debug)]
pub struct OutputCursor<'a> {
    dst: &'a mut [u8],
    pos: usize,
}

impl<'a> OutputCursor<'a> {
    /// Create a cursor over `dst` with nothing filled.
    pub fn new(dst: &'a mut [u8]) -> Self {
        Self { dst, pos: 0 }
    }

    /// Total capacity of the destination region.
    pub fn capacity(&self) -> usize {
        self.dst.len()
    }

    /// Bytes filled so far.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Space still available.
    pub fn available(&self) -> usize {
        self.dst.len() - self.pos
    }

    /// True if no space remains.
    pub fn is_full(&self) -> bool {
        self.pos >= self.dst.len()
    }

    /// The filled prefix of the region.
    pub fn filled(&self) -> &[u8] {
        &self.dst[..self.pos]
    }

    /// The unfilled tail of the region, for the engine to write into.
    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.dst[self.pos..]
    }

    /// Mark `count` more bytes as filled, saturating at capacity.
    pub fn produce(&mut self, count: usize) {
        self.pos = self.pos.saturating_add(count).min(self.dst.len());
    }

    /// Copy as much of `bytes` as fits and mark it filled. Returns bytes copied.
    pub fn write_from(&mut self, bytes: &[u8]) -> usize {
        let n = bytes.len().min(self.available());
        self.dst[self.pos..self.pos + n].copy_from_slice(&bytes[..n]);
        self.pos += n;
        n
    }
}
