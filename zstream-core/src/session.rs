//! Session wrappers shared by every stream adapter.
//!
//! The wrappers own one engine session each, translate engine faults into
//! [`ZstreamError::Codec`], and classify every raw step result into a
//! [`ContinuationHint`] by comparing cursor positions before and after the
//! call. The session is released when the wrapper is dropped.

use tracing::{debug, trace};

use crate::config::CodecOptions;
use crate::cursor::{InputCursor, OutputCursor};
use crate::error::{Result, ZstreamError};
use crate::traits::{Compressor, ContinuationHint, Decompressor, Engine, FlushMode};

/// An open compression session.
#[derive(Debug)]
pub struct CompressionSession<C> {
    inner: C,
    steps: u64,
}

impl<C: Compressor> CompressionSession<C> {
    /// Open a compression session on `engine`.
    pub fn open<E>(
        engine: &E,
        options: &CodecOptions,
        dictionary: Option<&E::Dictionary>,
    ) -> Result<Self>
    where
        E: Engine<Compressor = C>,
    {
        let inner = engine.create_compressor(options, dictionary)?;
        debug!(
            level = options.level.level(),
            checksum = options.checksum,
            dictionary = dictionary.is_some(),
            "opened compression session"
        );
        Ok(Self::from_inner(inner))
    }

    /// Wrap an already-open engine session.
    pub fn from_inner(inner: C) -> Self {
        Self { inner, steps: 0 }
    }

    /// Run one compression step.
    ///
    /// In [`FlushMode::Continue`] the result is never
    /// [`ContinuationHint::FrameComplete`].
    pub fn step(
        &mut self,
        output: &mut OutputCursor<'_>,
        input: &mut InputCursor<'_>,
        mode: FlushMode,
    ) -> Result<ContinuationHint> {
        let in_before = input.pos();
        let out_before = output.pos();
        self.steps += 1;

        let raw = self
            .inner
            .compress_step(output, input, mode)
            .map_err(ZstreamError::from)?;

        let consumed = input.pos() - in_before;
        let produced = output.pos() - out_before;
        let hint =
            ContinuationHint::classify(raw, consumed + produced > 0, mode != FlushMode::Continue);
        trace!(?mode, consumed, produced, raw, ?hint, "compress step");
        Ok(hint)
    }

    /// Number of steps run so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

/// An open decompression session.
#[derive(Debug)]
pub struct DecompressionSession<D> {
    inner: D,
    steps: u64,
}

impl<D: Decompressor> DecompressionSession<D> {
    /// Open a decompression session on `engine`.
    pub fn open<E>(
        engine: &E,
        options: &CodecOptions,
        dictionary: Option<&E::Dictionary>,
    ) -> Result<Self>
    where
        E: Engine<Decompressor = D>,
    {
        let inner = engine.create_decompressor(options, dictionary)?;
        debug!(dictionary = dictionary.is_some(), "opened decompression session");
        Ok(Self::from_inner(inner))
    }

    /// Wrap an already-open engine session.
    pub fn from_inner(inner: D) -> Self {
        Self { inner, steps: 0 }
    }

    /// Run one decompression step.
    pub fn step(
        &mut self,
        output: &mut OutputCursor<'_>,
        input: &mut InputCursor<'_>,
    ) -> Result<ContinuationHint> {
        let in_before = input.pos();
        let out_before = output.pos();
        self.steps += 1;

        let raw = self
            .inner
            .decompress_step(output, input)
            .map_err(ZstreamError::from)?;

        let consumed = input.pos() - in_before;
        let produced = output.pos() - out_before;
        let hint = ContinuationHint::classify(raw, consumed + produced > 0, true);
        trace!(consumed, produced, raw, ?hint, "decompress step");
        Ok(hint)
    }

    /// Number of steps run so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}
