//! # zstream Native
//!
//! Zstandard engine for zstream, backed by the libzstd that `zstd-safe` links.
//!
//! [`NativeEngine`] implements the step-driven [`Engine`](zstream_core::Engine)
//! trait, so the stream adapters can drive libzstd one bounded call at a
//! time. Alongside it this crate offers whole-buffer helpers that need no
//! state machine.
//!
//! ## Features
//!
//! - Streaming compression and decompression sessions
//! - One-shot compress/decompress with an optional output size cap
//! - Pre-trained dictionaries
//! - Frame header inspection
//! - Engine and crate version reporting
//!
//! ## Example
//!
//! ```rust
//! use zstream_core::CompressionLevel;
//! use zstream_native::{compress, decompress};
//!
//! let data = b"Hello, Zstandard!";
//! let compressed = compress(data, CompressionLevel::DEFAULT).unwrap();
//! let decompressed = decompress(&compressed, None).unwrap();
//! assert_eq!(decompressed, data);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod bulk;
mod dict;
mod engine;
mod frame;

pub use bulk::{compress, compress_bound, decompress};
pub use dict::{Dictionary, compress_with_dictionary, decompress_with_dictionary};
pub use engine::{NativeCompressor, NativeDecompressor, NativeEngine};
pub use frame::{FrameInfo, crate_version, frame_info, is_zstd_frame, version_number, version_string};

/// Zstandard magic number (0xFD2FB528 little-endian).
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Maximum block size (128 KB).
pub const MAX_BLOCK_SIZE: usize = 128 * 1024;
