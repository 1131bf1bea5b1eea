//! Pre-trained dictionaries.
//!
//! A [`Dictionary`] is the opaque handle passed to session creation. Training
//! dictionaries is out of scope; bytes come from an external trainer such as
//! `zstd --train`.

use std::sync::Arc;

use zstd_safe::{CCtx, DCtx};

use zstream_core::config::CompressionLevel;
use zstream_core::error::{Result, SessionKind, ZstreamError};

use crate::engine::fault;

/// Raw dictionary content plus its embedded id.
#[derive(Debug, Clone)]
pub struct Dictionary {
    bytes: Arc<[u8]>,
    id: Option<u32>,
}

impl Dictionary {
    /// Load a dictionary from raw bytes.
    ///
    /// Bytes without the dictionary magic are accepted as raw content
    /// dictionaries and carry no id.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(ZstreamError::EmptyDictionary);
        }
        let id = zstd_safe::get_dict_id_from_dict(bytes).map(|id| id.get());
        Ok(Self {
            bytes: Arc::from(bytes),
            id,
        })
    }

    /// Dictionary content.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Dictionary id, if the content declares one.
    pub fn id(&self) -> Option<u32> {
        self.id
    }

    /// Content length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; empty dictionaries are rejected by [`Dictionary::load`].
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Compress `src` into a single frame using `dict`.
pub fn compress_with_dictionary(
    src: &[u8],
    dict: &Dictionary,
    level: CompressionLevel,
) -> Result<Vec<u8>> {
    let mut cctx = CCtx::try_create()
        .ok_or_else(|| ZstreamError::session_creation(SessionKind::Compression))?;
    let mut dst = Vec::with_capacity(zstd_safe::compress_bound(src.len()));
    cctx.compress_using_dict(&mut dst, src, dict.as_bytes(), level.level())
        .map_err(fault)?;
    Ok(dst)
}

/// Decompress a frame produced with `dict`.
///
/// Frames without a trustworthy declared size are decoded step by step, as
/// in [`decompress`](crate::decompress). The output is capped at `max_size`.
pub fn decompress_with_dictionary(
    src: &[u8],
    dict: &Dictionary,
    max_size: Option<usize>,
) -> Result<Vec<u8>> {
    if src.is_empty() {
        return Ok(Vec::new());
    }
    let Some(capacity) = crate::bulk::declared_capacity(src, max_size)? else {
        return crate::bulk::decompress_unsized(src, Some(dict), max_size);
    };

    let mut dctx = DCtx::try_create()
        .ok_or_else(|| ZstreamError::session_creation(SessionKind::Decompression))?;
    let mut dst = Vec::with_capacity(capacity);
    dctx.decompress_using_dict(&mut dst, src, dict.as_bytes())
        .map_err(fault)?;
    Ok(dst)
}
