//! One-shot compression of whole buffers.

use tracing::debug;

use zstream_core::config::{CodecOptions, CompressionLevel, DEFAULT_MAX_IDLE_STEPS};
use zstream_core::cursor::{InputCursor, OutputCursor};
use zstream_core::error::{Result, ZstreamError};
use zstream_core::session::DecompressionSession;
use zstream_core::termination::ProgressGuard;

use crate::MAX_BLOCK_SIZE;
use crate::dict::Dictionary;
use crate::engine::{NativeEngine, fault};

/// Largest expansion over the compressed length for which a declared content
/// size is pre-allocated. Bigger declared sizes are decoded step by step.
const PREALLOCATION_RATIO: usize = 128;

/// Worst-case compressed size for `len` input bytes.
pub fn compress_bound(len: usize) -> usize {
    zstd_safe::compress_bound(len)
}

/// Compress `src` into a single frame.
///
/// Empty input still produces a valid (empty) frame.
pub fn compress(src: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
    let mut dst = Vec::with_capacity(compress_bound(src.len()));
    zstd_safe::compress(&mut dst, src, level.level()).map_err(fault)?;
    Ok(dst)
}

/// Decompress a single frame.
///
/// Frames that declare a plausible content size are decoded in one call.
/// Frames without it, such as those written by a streaming writer, and frames
/// declaring more than their length can plausibly expand to, are decoded step
/// by step into a growing buffer. Either way the output is capped at
/// `max_size`.
pub fn decompress(src: &[u8], max_size: Option<usize>) -> Result<Vec<u8>> {
    if src.is_empty() {
        return Ok(Vec::new());
    }

    match declared_capacity(src, max_size)? {
        Some(capacity) => {
            let mut dst = Vec::with_capacity(capacity);
            zstd_safe::decompress(&mut dst, src).map_err(fault)?;
            Ok(dst)
        }
        None => decompress_unsized(src, None, max_size),
    }
}

/// Capacity to pre-allocate for a one-call decode of `src`.
///
/// A declared size above `max_size` is rejected. `Ok(None)` means the frame
/// must be decoded step by step: it declares no size, or one too large to
/// trust before any data has been decoded.
pub(crate) fn declared_capacity(src: &[u8], max_size: Option<usize>) -> Result<Option<usize>> {
    let declared = zstd_safe::get_frame_content_size(src)
        .map_err(|_| ZstreamError::codec(0, "Invalid frame header"))?;

    let Some(size) = declared else {
        return Ok(None);
    };
    let size = usize::try_from(size).unwrap_or(usize::MAX);
    if let Some(limit) = max_size.filter(|&limit| size > limit) {
        return Err(ZstreamError::size_limit(limit, size));
    }
    if size > preallocation_ceiling(src.len()) {
        debug!(declared = size, len = src.len(), "declared size not trusted for pre-allocation");
        return Ok(None);
    }
    Ok(Some(size))
}

fn preallocation_ceiling(compressed_len: usize) -> usize {
    compressed_len
        .saturating_mul(PREALLOCATION_RATIO)
        .max(MAX_BLOCK_SIZE)
}

/// Decode `src` through a decompression session into a growing buffer.
pub(crate) fn decompress_unsized(
    src: &[u8],
    dictionary: Option<&Dictionary>,
    max_size: Option<usize>,
) -> Result<Vec<u8>> {
    debug!(len = src.len(), "decoding frame step by step");

    let mut session =
        DecompressionSession::open(&NativeEngine, &CodecOptions::default(), dictionary)?;
    let mut guard = ProgressGuard::new(DEFAULT_MAX_IDLE_STEPS);
    let mut input = InputCursor::new(src);
    let mut chunk = vec![0u8; MAX_BLOCK_SIZE];
    let mut dst = Vec::new();

    loop {
        let mut output = OutputCursor::new(&mut chunk);
        let hint = session.step(&mut output, &mut input)?;
        let produced = output.pos();

        let needed = dst.len() + produced;
        if let Some(limit) = max_size.filter(|&limit| needed > limit) {
            return Err(ZstreamError::size_limit(limit, needed));
        }
        dst.extend_from_slice(&chunk[..produced]);

        if hint.is_complete() {
            return Ok(dst);
        }
        guard.record(hint)?;
    }
}
