//! Streaming sessions over libzstd contexts.

use tracing::debug;
use zstd_safe::zstd_sys::ZSTD_EndDirective;
use zstd_safe::{CCtx, CParameter, DCtx, DParameter, InBuffer, OutBuffer};

use zstream_core::config::CodecOptions;
use zstream_core::cursor::{InputCursor, OutputCursor};
use zstream_core::error::{EngineFault, Result, SessionKind, ZstreamError};
use zstream_core::traits::{Compressor, Decompressor, Engine, FlushMode};

use crate::dict::Dictionary;

/// Translate a raw libzstd error code.
pub(crate) fn fault(code: usize) -> EngineFault {
    EngineFault::new(code, zstd_safe::get_error_name(code))
}

fn end_directive(mode: FlushMode) -> ZSTD_EndDirective {
    match mode {
        FlushMode::Continue => ZSTD_EndDirective::ZSTD_e_continue,
        FlushMode::Flush => ZSTD_EndDirective::ZSTD_e_flush,
        FlushMode::End => ZSTD_EndDirective::ZSTD_e_end,
    }
}

/// Handle to the statically linked libzstd.
///
/// The handle carries no state; every session it opens owns its own context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NativeEngine;

impl NativeEngine {
    /// Create an engine handle.
    pub fn new() -> Self {
        Self
    }
}

impl Engine for NativeEngine {
    type Compressor = NativeCompressor;
    type Decompressor = NativeDecompressor;
    type Dictionary = Dictionary;

    fn create_compressor(
        &self,
        options: &CodecOptions,
        dictionary: Option<&Dictionary>,
    ) -> Result<NativeCompressor> {
        let mut cctx = CCtx::try_create()
            .ok_or_else(|| ZstreamError::session_creation(SessionKind::Compression))?;

        cctx.set_parameter(CParameter::CompressionLevel(options.level.level()))
            .map_err(fault)?;
        cctx.set_parameter(CParameter::ChecksumFlag(options.checksum))
            .map_err(fault)?;
        if let Some(window_log) = options.window_log {
            cctx.set_parameter(CParameter::WindowLog(window_log))
                .map_err(fault)?;
        }
        if let Some(dict) = dictionary {
            cctx.load_dictionary(dict.as_bytes()).map_err(fault)?;
        }

        Ok(NativeCompressor { cctx })
    }

    fn create_decompressor(
        &self,
        options: &CodecOptions,
        dictionary: Option<&Dictionary>,
    ) -> Result<NativeDecompressor> {
        let mut dctx = DCtx::try_create()
            .ok_or_else(|| ZstreamError::session_creation(SessionKind::Decompression))?;

        if let Some(window_log) = options.window_log {
            dctx.set_parameter(DParameter::WindowLogMax(window_log))
                .map_err(fault)?;
        }
        if let Some(dict) = dictionary {
            dctx.load_dictionary(dict.as_bytes()).map_err(fault)?;
        }

        Ok(NativeDecompressor { dctx })
    }
}

/// A libzstd compression context.
pub struct NativeCompressor {
    cctx: CCtx<'static>,
}

impl Compressor for NativeCompressor {
    fn compress_step(
        &mut self,
        output: &mut OutputCursor<'_>,
        input: &mut InputCursor<'_>,
        mode: FlushMode,
    ) -> std::result::Result<usize, EngineFault> {
        let mut in_buf = InBuffer::around(input.unconsumed());
        let (raw, produced) = {
            let mut out_buf = OutBuffer::around(output.spare_mut());
            let raw = self
                .cctx
                .compress_stream2(&mut out_buf, &mut in_buf, end_directive(mode));
            (raw, out_buf.pos())
        };
        input.consume(in_buf.pos());
        output.produce(produced);
        raw.map_err(fault)
    }
}

impl Drop for NativeCompressor {
    fn drop(&mut self) {
        debug!("released compression context");
    }
}

/// A libzstd decompression context.
pub struct NativeDecompressor {
    dctx: DCtx<'static>,
}

impl Decompressor for NativeDecompressor {
    fn decompress_step(
        &mut self,
        output: &mut OutputCursor<'_>,
        input: &mut InputCursor<'_>,
    ) -> std::result::Result<usize, EngineFault> {
        let mut in_buf = InBuffer::around(input.unconsumed());
        let (raw, produced) = {
            let mut out_buf = OutBuffer::around(output.spare_mut());
            let raw = self.dctx.decompress_stream(&mut out_buf, &mut in_buf);
            (raw, out_buf.pos())
        };
        input.consume(in_buf.pos());
        output.produce(produced);
        raw.map_err(fault)
    }
}

impl Drop for NativeDecompressor {
    fn drop(&mut self) {
        debug!("released decompression context");
    }
}
