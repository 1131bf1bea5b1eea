//! # zstream
//!
//! Streaming Zstandard compression as standard [`Read`](std::io::Read) and
//! [`Write`](std::io::Write) adapters.
//!
//! The engine underneath works one bounded step at a time: it consumes some
//! input, produces some output, and reports whether more calls are needed.
//! [`StreamWriter`] and [`StreamReader`] turn that into ordinary blocking
//! reads and writes that never lose or duplicate bytes, detect the end of a
//! frame, and release the engine session on every exit path.
//!
//! ## Example
//!
//! ```rust
//! use std::io::{Read, Write};
//! use zstream::{StreamReader, StreamWriter};
//!
//! let mut writer = StreamWriter::new(Vec::new());
//! writer.write_all(b"Hello, ").unwrap();
//! writer.flush().unwrap();
//! writer.write_all(b"streaming!").unwrap();
//! let compressed = writer.finish().unwrap();
//!
//! let mut reader = StreamReader::new(&compressed[..]);
//! let mut text = String::new();
//! reader.read_to_string(&mut text).unwrap();
//! assert_eq!(text, "Hello, streaming!");
//! ```
//!
//! ## Non-blocking sources
//!
//! A source that returns [`WouldBlock`](std::io::ErrorKind::WouldBlock) has
//! its error passed straight through; the reader keeps its state and the next
//! `read` picks up where it stopped. `Ok(0)` from [`StreamReader`] always
//! means the frame is over.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod reader;
mod stream;
mod writer;

pub use reader::StreamReader;
pub use stream::{compress_stream, compress_to_vec, decompress_from_slice, decompress_stream};
pub use writer::StreamWriter;

pub use zstream_core::{
    CodecOptions, CompressionLevel, Engine, PartialWrite, Result, SessionKind, StreamConfig,
    ZstreamError,
};
pub use zstream_native::{Dictionary, NativeEngine};
