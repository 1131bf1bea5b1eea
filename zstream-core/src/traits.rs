//! Core traits for step-driven engines.
//!
//! An [`Engine`] is the process-wide handle that opens sessions. A session is
//! a [`Compressor`] or [`Decompressor`]: it advances by one bounded step per
//! call, reading from an [`InputCursor`] and writing into an
//! [`OutputCursor`], and never blocks. Releasing a session is dropping it.

use crate::config::CodecOptions;
use crate::cursor::{InputCursor, OutputCursor};
use crate::error::{EngineFault, Result};

/// End directive for a compression step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushMode {
    /// More input will follow; buffer for best compression.
    #[default]
    Continue,
    /// Emit everything buffered without ending the frame.
    Flush,
    /// Emit everything and close the frame.
    End,
}

/// What the engine reported for one step, classified.
///
/// Computed per step by the session wrappers and never stored past the loop
/// iteration that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinuationHint {
    /// The step made progress and the engine wants another call.
    MoreWork,
    /// The step neither consumed nor produced anything, yet is not finished.
    NoProgress,
    /// The flush, frame end, or decompressed frame is complete.
    FrameComplete,
}

impl ContinuationHint {
    /// Classify a raw engine return.
    ///
    /// `terminal_allowed` is false for compression in [`FlushMode::Continue`],
    /// where a zero return only means nothing is left to flush and never
    /// completes a frame.
    pub fn classify(raw: usize, progressed: bool, terminal_allowed: bool) -> Self {
        if raw == 0 && terminal_allowed {
            ContinuationHint::FrameComplete
        } else if progressed {
            ContinuationHint::MoreWork
        } else {
            ContinuationHint::NoProgress
        }
    }

    /// True for [`ContinuationHint::FrameComplete`].
    pub fn is_complete(self) -> bool {
        matches!(self, ContinuationHint::FrameComplete)
    }
}

/// A streaming compression session.
pub trait Compressor {
    /// Advance the engine by one step.
    ///
    /// # Arguments
    ///
    /// * `output` - Space for compressed bytes; the engine advances its position
    /// * `input` - Uncompressed bytes; the engine advances its position
    /// * `mode` - End directive
    ///
    /// # Returns
    ///
    /// The raw engine hint: `0` once a flush or frame end has completed,
    /// otherwise a non-zero amount of work still pending.
    fn compress_step(
        &mut self,
        output: &mut OutputCursor<'_>,
        input: &mut InputCursor<'_>,
        mode: FlushMode,
    ) -> std::result::Result<usize, EngineFault>;
}

/// A streaming decompression session.
pub trait Decompressor {
    /// Advance the engine by one step.
    ///
    /// # Returns
    ///
    /// The raw engine hint: `0` once a frame is fully decoded and flushed,
    /// otherwise a non-zero amount of work still pending.
    fn decompress_step(
        &mut self,
        output: &mut OutputCursor<'_>,
        input: &mut InputCursor<'_>,
    ) -> std::result::Result<usize, EngineFault>;
}

/// Handle to an engine capable of opening sessions.
///
/// The handle is shared read-only; every session it opens is independently
/// owned by exactly one stream.
pub trait Engine {
    /// Compression session type.
    type Compressor: Compressor;
    /// Decompression session type.
    type Decompressor: Decompressor;
    /// Opaque pre-trained dictionary handle.
    type Dictionary;

    /// Open a compression session.
    fn create_compressor(
        &self,
        options: &CodecOptions,
        dictionary: Option<&Self::Dictionary>,
    ) -> Result<Self::Compressor>;

    /// Open a decompression session.
    fn create_decompressor(
        &self,
        options: &CodecOptions,
        dictionary: Option<&Self::Dictionary>,
    ) -> Result<Self::Decompressor>;
}
