//! Pull-based decompressing reader.

use std::io::{self, Read};

use tracing::{debug, warn};

use zstream_core::config::{CodecOptions, StreamConfig};
use zstream_core::cursor::{InputCursor, OutputCursor};
use zstream_core::error::{Result, ZstreamError};
use zstream_core::session::DecompressionSession;
use zstream_core::staging::StagingBuffer;
use zstream_core::termination::Termination;
use zstream_core::traits::Engine;
use zstream_native::NativeEngine;

/// A reader that decompresses one frame pulled from a source.
///
/// `read` returns `Ok(0)` only at the end of the frame. When the source
/// reports [`io::ErrorKind::WouldBlock`] or [`io::ErrorKind::Interrupted`]
/// the error is passed through and the reader stays usable; any other
/// source error, and every codec fault, closes it.
///
/// Bytes following the end of the frame are left unread. When
/// [`CodecOptions::max_decompress_size`] is set, a frame that decodes to more
/// than that fails with [`ZstreamError::SizeLimitExceeded`].
pub struct StreamReader<R: Read, E: Engine = NativeEngine> {
    source: R,
    engine: E,
    options: CodecOptions,
    dictionary: Option<E::Dictionary>,
    /// Compressed bytes pulled from the source, not yet consumed by the engine.
    intake: StagingBuffer,
    /// Decompressed bytes not yet handed to the caller.
    decoded: StagingBuffer,
    session: Option<DecompressionSession<E::Decompressor>>,
    termination: Termination,
    source_eof: bool,
    received_any: bool,
    /// The last step filled the whole output region; the engine may hold more.
    output_pending: bool,
    /// Decompressed bytes produced by the engine so far.
    produced_total: usize,
    ended: bool,
    closed: bool,
    total_in: u64,
    total_out: u64,
}

impl<R: Read> StreamReader<R> {
    /// Create a reader with default buffering.
    pub fn new(source: R) -> Self {
        Self::build(
            source,
            NativeEngine,
            CodecOptions::default(),
            StreamConfig::default(),
        )
    }

    /// Create a reader with specific codec options and buffering.
    pub fn with_config(source: R, options: CodecOptions, config: StreamConfig) -> Result<Self> {
        Self::with_engine(source, NativeEngine, options, config)
    }
}

impl<R: Read, E: Engine> StreamReader<R, E> {
    /// Create a reader driving an arbitrary engine.
    pub fn with_engine(
        source: R,
        engine: E,
        options: CodecOptions,
        config: StreamConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(source, engine, options, config))
    }

    fn build(source: R, engine: E, options: CodecOptions, config: StreamConfig) -> Self {
        Self {
            source,
            engine,
            options,
            dictionary: None,
            intake: StagingBuffer::new(config.read_staging_capacity),
            decoded: StagingBuffer::new(config.read_staging_capacity),
            session: None,
            termination: Termination::new(config.max_idle_steps),
            source_eof: false,
            received_any: false,
            output_pending: false,
            produced_total: 0,
            ended: false,
            closed: false,
            total_in: 0,
            total_out: 0,
        }
    }

    /// Decompress with a pre-trained dictionary.
    ///
    /// Takes effect only if set before the first read; afterwards the
    /// dictionary is dropped.
    pub fn dictionary(mut self, dictionary: E::Dictionary) -> Self {
        if self.session.is_some() || self.closed {
            debug!("dictionary set after decompression started; ignored");
            return self;
        }
        self.dictionary = Some(dictionary);
        self
    }

    /// Release the session. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.teardown();
        }
        Ok(())
    }

    /// Get a reference to the source.
    pub fn get_ref(&self) -> &R {
        &self.source
    }

    /// Get a mutable reference to the source.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.source
    }

    /// Return the source. Buffered compressed bytes are lost.
    pub fn into_inner(self) -> R {
        self.source
    }

    /// True once closed, either explicitly or by a fault.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// True once the frame has ended and every decompressed byte was served.
    pub fn is_finished(&self) -> bool {
        self.ended && self.decoded.is_empty()
    }

    /// Compressed bytes pulled from the source so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Decompressed bytes handed to the caller so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    fn read_decoded(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.closed {
            return Err(ZstreamError::Closed);
        }
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            if !self.decoded.is_empty() {
                let n = self.decoded.copy_to(buf);
                self.total_out += n as u64;
                return Ok(n);
            }
            if self.ended {
                return Ok(0);
            }
            self.fill()?;
        }
    }

    /// Run the refill loop until decoded bytes are staged or the frame ends.
    fn fill(&mut self) -> Result<()> {
        loop {
            if self.intake.is_empty() && !self.source_eof && !self.output_pending {
                self.pull_source()?;
            }
            if self.source_eof && !self.received_any {
                debug!("source ended before any compressed byte; empty stream");
                self.ended = true;
                return Ok(());
            }

            match self.decode_step() {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(error) => {
                    warn!(%error, "decompression failed; closing stream");
                    self.teardown();
                    return Err(error);
                }
            }
        }
    }

    fn pull_source(&mut self) -> Result<()> {
        match self.source.read(self.intake.region_mut()) {
            Ok(0) => {
                debug!(total_in = self.total_in, "source reached end of input");
                self.source_eof = true;
                self.termination.request();
                Ok(())
            }
            Ok(n) => {
                self.intake.set_filled(n);
                self.received_any = true;
                self.total_in += n as u64;
                Ok(())
            }
            Err(e) => {
                let error = ZstreamError::from(e);
                if !error.is_retryable() {
                    warn!(%error, "source read failed; closing stream");
                    self.teardown();
                }
                Err(error)
            }
        }
    }

    /// One engine step. Returns true once output is staged or the frame ended.
    fn decode_step(&mut self) -> Result<bool> {
        if self.session.is_none() {
            let session =
                DecompressionSession::open(&self.engine, &self.options, self.dictionary.as_ref())?;
            self.session = Some(session);
        }

        let Self {
            options,
            session,
            intake,
            decoded,
            termination,
            output_pending,
            produced_total,
            ended,
            ..
        } = self;
        let session = session.as_mut().ok_or(ZstreamError::Closed)?;

        let mut input = if intake.is_empty() {
            InputCursor::empty()
        } else {
            InputCursor::at(intake.filled(), intake.start())
        };
        let start = input.pos();

        let mut output = OutputCursor::new(decoded.region_mut());
        let hint = session.step(&mut output, &mut input)?;
        let produced = output.pos();
        *output_pending = output.is_full();

        let consumed = input.pos() - start;
        intake.consume(consumed);
        decoded.set_filled(produced);

        *produced_total = produced_total.saturating_add(produced);
        if let Some(limit) = options
            .max_decompress_size
            .filter(|&limit| *produced_total > limit)
        {
            return Err(ZstreamError::size_limit(limit, *produced_total));
        }

        termination.observe(hint)?;
        if hint.is_complete() {
            debug!(steps = session.steps(), "frame complete");
            *ended = true;
            return Ok(true);
        }
        Ok(produced > 0)
    }

    /// The single release path for the session.
    fn teardown(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(steps = session.steps(), "releasing decompression session");
        }
        self.intake.clear();
        self.decoded.clear();
        self.closed = true;
    }
}

impl<R: Read, E: Engine> Read for StreamReader<R, E> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_decoded(buf)?)
    }
}
