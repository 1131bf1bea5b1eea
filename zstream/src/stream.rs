//! Whole-stream helpers built on the adapters.

use std::io::{self, Read, Write};

use zstream_core::config::CodecOptions;
use zstream_core::error::{Result, ZstreamError};

use crate::reader::StreamReader;
use crate::writer::StreamWriter;

/// Compress everything from `reader` into `writer` as one frame.
///
/// Returns the number of uncompressed bytes read.
pub fn compress_stream<R: Read, W: Write>(
    mut reader: R,
    writer: W,
    options: CodecOptions,
) -> Result<u64> {
    let mut encoder = StreamWriter::with_options(writer, options);
    let copied = io::copy(&mut reader, &mut encoder).map_err(ZstreamError::from_io_error)?;
    encoder.finish()?;
    Ok(copied)
}

/// Decompress one frame from `reader` into `writer`.
///
/// Returns the number of decompressed bytes written.
pub fn decompress_stream<R: Read, W: Write>(reader: R, mut writer: W) -> Result<u64> {
    let mut decoder = StreamReader::new(reader);
    let copied = io::copy(&mut decoder, &mut writer).map_err(ZstreamError::from_io_error)?;
    decoder.close()?;
    Ok(copied)
}

/// Compress `data` into a new buffer through the streaming writer.
pub fn compress_to_vec(data: &[u8], options: CodecOptions) -> Result<Vec<u8>> {
    let mut encoder = StreamWriter::with_options(Vec::new(), options);
    encoder.write_all(data).map_err(ZstreamError::from_io_error)?;
    encoder.finish()
}

/// Decompress one frame from `data` through the streaming reader.
pub fn decompress_from_slice(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = StreamReader::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(ZstreamError::from_io_error)?;
    decoder.close()?;
    Ok(out)
}
