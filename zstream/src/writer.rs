//! Push-based compressing writer.

use std::io::{self, Write};

use tracing::{debug, warn};

use zstream_core::config::{CodecOptions, CompressionLevel, StreamConfig};
use zstream_core::cursor::{InputCursor, OutputCursor};
use zstream_core::error::{PartialWrite, Result, ZstreamError};
use zstream_core::session::CompressionSession;
use zstream_core::staging::StagingBuffer;
use zstream_core::termination::{ProgressGuard, Termination};
use zstream_core::traits::{ContinuationHint, Engine, FlushMode};
use zstream_native::NativeEngine;

/// Holds the compression session; warns if a frame is dropped unfinished.
struct FrameSlot<C> {
    session: Option<CompressionSession<C>>,
}

impl<C> Drop for FrameSlot<C> {
    fn drop(&mut self) {
        if self.session.is_some() {
            warn!("compressing writer dropped before close; frame left unfinished");
        }
    }
}

/// A writer that compresses everything written to it into one frame.
///
/// The compression session is opened on the first non-empty write. Call
/// [`close`](Self::close) or [`finish`](Self::finish) to end the frame;
/// dropping the writer releases the session without ending it.
///
/// # Example
///
/// ```rust
/// use std::io::Write;
/// use zstream::StreamWriter;
///
/// let mut writer = StreamWriter::new(Vec::new());
/// writer.write_all(b"Hello, streaming!").unwrap();
/// let compressed = writer.finish().unwrap();
/// assert_eq!(zstream::decompress_from_slice(&compressed).unwrap(), b"Hello, streaming!");
/// ```
pub struct StreamWriter<W: Write, E: Engine = NativeEngine> {
    sink: W,
    engine: E,
    options: CodecOptions,
    dictionary: Option<E::Dictionary>,
    config: StreamConfig,
    staging: StagingBuffer,
    frame: FrameSlot<E::Compressor>,
    termination: Termination,
    /// Fault held back after a short write, reported by the next call.
    pending: Option<ZstreamError>,
    closed: bool,
    total_in: u64,
    total_out: u64,
}

impl<W: Write> StreamWriter<W> {
    /// Create a writer with the default level and buffering.
    pub fn new(sink: W) -> Self {
        Self::build(
            sink,
            NativeEngine,
            CodecOptions::default(),
            StreamConfig::default(),
        )
    }

    /// Create a writer with a specific compression level.
    pub fn with_level(sink: W, level: CompressionLevel) -> Self {
        Self::with_options(sink, CodecOptions::default().with_level(level))
    }

    /// Create a writer with specific codec options.
    pub fn with_options(sink: W, options: CodecOptions) -> Self {
        Self::build(sink, NativeEngine, options, StreamConfig::default())
    }

    /// Create a writer with specific codec options and buffering.
    pub fn with_config(sink: W, options: CodecOptions, config: StreamConfig) -> Result<Self> {
        Self::with_engine(sink, NativeEngine, options, config)
    }
}

impl<W: Write, E: Engine> StreamWriter<W, E> {
    /// Create a writer driving an arbitrary engine.
    pub fn with_engine(
        sink: W,
        engine: E,
        options: CodecOptions,
        config: StreamConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(sink, engine, options, config))
    }

    fn build(sink: W, engine: E, options: CodecOptions, config: StreamConfig) -> Self {
        Self {
            sink,
            engine,
            options,
            dictionary: None,
            staging: StagingBuffer::new(config.write_staging_capacity),
            config,
            frame: FrameSlot { session: None },
            termination: Termination::new(config.max_idle_steps),
            pending: None,
            closed: false,
            total_in: 0,
            total_out: 0,
        }
    }

    /// Compress with a pre-trained dictionary.
    ///
    /// Takes effect only if set before the first write; afterwards the
    /// dictionary is dropped.
    pub fn dictionary(mut self, dictionary: E::Dictionary) -> Self {
        if self.frame.session.is_some() || self.closed {
            debug!("dictionary set after the frame started; ignored");
            return self;
        }
        self.dictionary = Some(dictionary);
        self
    }

    /// Compress `buf` and forward the output to the sink.
    ///
    /// On success the whole slice is consumed. On failure the error reports
    /// how many leading bytes of `buf` were compressed and fully forwarded to
    /// the sink before the fault; the writer is then closed.
    pub fn try_write(&mut self, buf: &[u8]) -> std::result::Result<usize, PartialWrite> {
        self.check_usable().map_err(|e| PartialWrite::new(0, e))?;
        if buf.is_empty() {
            return Ok(0);
        }
        if let Err(error) = self.open_session() {
            warn!(%error, "could not open compression session");
            self.teardown();
            return Err(PartialWrite::new(0, error));
        }

        let mut input = InputCursor::new(buf);
        let mut guard = ProgressGuard::new(self.config.max_idle_steps);
        let mut durable = 0;

        while !input.is_exhausted() {
            let result = self
                .step_and_forward(&mut input, FlushMode::Continue)
                .and_then(|hint| guard.record(hint));
            if let Err(error) = result {
                warn!(consumed = durable, %error, "write failed; closing stream");
                self.total_in += durable as u64;
                self.teardown();
                return Err(PartialWrite::new(durable, error));
            }
            durable = input.pos();
        }

        self.total_in += buf.len() as u64;
        Ok(buf.len())
    }

    /// Emit every buffered byte without ending the frame, then flush the sink.
    pub fn flush_frame(&mut self) -> Result<()> {
        self.check_usable()?;
        if self.frame.session.is_none() {
            return Ok(self.sink.flush()?);
        }

        let result = self
            .drain(FlushMode::Flush)
            .and_then(|()| self.sink.flush().map_err(ZstreamError::from));
        match result {
            Ok(()) => {
                self.termination.resume();
                Ok(())
            }
            Err(error) => {
                warn!(%error, "flush failed; closing stream");
                self.teardown();
                Err(error)
            }
        }
    }

    /// End the frame, flush the sink, and release the session.
    ///
    /// Idempotent. A writer that was never written to emits nothing. The
    /// session is released even when ending the frame fails.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        if self.frame.session.is_none() {
            debug!("closing writer that never opened a session");
            self.closed = true;
            return Ok(());
        }

        let result = self
            .drain(FlushMode::End)
            .and_then(|()| self.sink.flush().map_err(ZstreamError::from));
        if let Err(error) = &result {
            warn!(%error, "close failed");
        }
        self.teardown();
        result
    }

    /// Close the writer and return the sink.
    pub fn finish(mut self) -> Result<W> {
        self.close()?;
        Ok(self.sink)
    }

    /// Get a reference to the sink.
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Get a mutable reference to the sink.
    ///
    /// Writing to the sink directly corrupts the compressed stream.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Return the sink without ending the frame.
    pub fn into_inner(self) -> W {
        self.sink
    }

    /// True once closed, either explicitly or by a fault.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Uncompressed bytes accepted so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Compressed bytes forwarded to the sink so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Codec options in effect.
    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    fn check_usable(&mut self) -> Result<()> {
        if let Some(error) = self.pending.take() {
            return Err(error);
        }
        if self.closed {
            return Err(ZstreamError::Closed);
        }
        Ok(())
    }

    fn open_session(&mut self) -> Result<()> {
        if self.frame.session.is_none() {
            let session =
                CompressionSession::open(&self.engine, &self.options, self.dictionary.as_ref())?;
            self.frame.session = Some(session);
        }
        Ok(())
    }

    /// Run one step into the staging buffer and forward its output.
    fn step_and_forward(
        &mut self,
        input: &mut InputCursor<'_>,
        mode: FlushMode,
    ) -> Result<ContinuationHint> {
        let Self {
            sink,
            staging,
            frame,
            total_out,
            ..
        } = self;
        let session = frame.session.as_mut().ok_or(ZstreamError::Closed)?;

        let mut output = OutputCursor::new(staging.region_mut());
        let hint = session.step(&mut output, input, mode)?;
        let produced = output.pos();

        staging.set_filled(produced);
        if !staging.is_empty() {
            sink.write_all(staging.pending())?;
            *total_out += produced as u64;
            staging.clear();
        }
        Ok(hint)
    }

    /// Drive the engine with no input until the flush or end completes.
    fn drain(&mut self, mode: FlushMode) -> Result<()> {
        self.termination.request();
        let mut empty = InputCursor::empty();
        while !self.termination.is_complete() {
            let hint = self.step_and_forward(&mut empty, mode)?;
            self.termination.observe(hint)?;
        }
        Ok(())
    }

    /// The single release path for the session.
    fn teardown(&mut self) {
        if let Some(session) = self.frame.session.take() {
            debug!(steps = session.steps(), "releasing compression session");
        }
        self.staging.clear();
        self.closed = true;
    }
}

impl<W: Write, E: Engine> Write for StreamWriter<W, E> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.try_write(buf) {
            Ok(n) => Ok(n),
            Err(PartialWrite { consumed, error }) if consumed > 0 => {
                self.pending = Some(error);
                Ok(consumed)
            }
            Err(partial) => Err(partial.error.into()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(self.flush_frame()?)
    }
}
