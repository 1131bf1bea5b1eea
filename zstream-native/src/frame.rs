//! Frame header inspection and version reporting.

use zstream_core::error::{Result, ZstreamError};

use crate::ZSTD_MAGIC;

/// Facts read from a frame header without decoding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameInfo {
    /// Decompressed size, when the header declares it.
    pub content_size: Option<u64>,
    /// Id of the dictionary the frame was compressed with.
    pub dictionary_id: Option<u32>,
    /// Compressed size of the first frame, when `src` holds all of it.
    pub compressed_size: Option<usize>,
}

/// True if `src` starts with the Zstandard frame magic.
pub fn is_zstd_frame(src: &[u8]) -> bool {
    src.len() >= ZSTD_MAGIC.len() && src[..ZSTD_MAGIC.len()] == ZSTD_MAGIC
}

/// Inspect the first frame in `src`.
pub fn frame_info(src: &[u8]) -> Result<FrameInfo> {
    if !is_zstd_frame(src) {
        return Err(ZstreamError::codec(0, "Unknown frame descriptor"));
    }
    let content_size = zstd_safe::get_frame_content_size(src)
        .map_err(|_| ZstreamError::codec(0, "Invalid frame header"))?;

    Ok(FrameInfo {
        content_size,
        dictionary_id: zstd_safe::get_dict_id_from_frame(src).map(|id| id.get()),
        compressed_size: zstd_safe::find_frame_compressed_size(src).ok(),
    })
}

/// Linked libzstd version as a number, e.g. `10507` for 1.5.7.
pub fn version_number() -> u32 {
    zstd_safe::version_number()
}

/// Linked libzstd version string, e.g. `"1.5.7"`.
pub fn version_string() -> &'static str {
    zstd_safe::version_string()
}

/// Version of this crate.
pub fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
