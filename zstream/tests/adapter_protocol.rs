//! Adapter behavior against the call-counting fake engine.

mod common;

use std::io::{self, Read, Write};

use common::{
    Behavior, FailingSink, FakeEngine, ScriptedSource, fake_frame, read_all_retrying,
};
use proptest::prelude::*;
use zstream::{CodecOptions, StreamConfig, StreamReader, StreamWriter, ZstreamError};

// ============================================================================
// Helpers
// ============================================================================

fn writer<W: Write>(sink: W, engine: &FakeEngine, capacity: usize) -> StreamWriter<W, FakeEngine> {
    StreamWriter::with_engine(
        sink,
        engine.clone(),
        CodecOptions::default(),
        StreamConfig::default().with_capacity(capacity),
    )
    .unwrap()
}

fn reader<R: Read>(source: R, engine: &FakeEngine, capacity: usize) -> StreamReader<R, FakeEngine> {
    StreamReader::with_engine(
        source,
        engine.clone(),
        CodecOptions::default(),
        StreamConfig::default().with_capacity(capacity),
    )
    .unwrap()
}

fn fake_roundtrip(data: &[u8], chunk: usize, capacity: usize) -> Vec<u8> {
    let engine = FakeEngine::new().max_record(7);
    let mut w = writer(Vec::new(), &engine, capacity);
    for piece in data.chunks(chunk.max(1)) {
        w.write_all(piece).unwrap();
    }
    let frame = w.finish().unwrap();

    let mut r = reader(&frame[..], &engine, capacity);
    let mut out = Vec::new();
    r.read_to_end(&mut out).unwrap();
    out
}

// ============================================================================
// Writer lifecycle
// ============================================================================

#[test]
fn test_writer_close_is_idempotent() {
    let engine = FakeEngine::new();
    let mut w = writer(Vec::new(), &engine, 4);
    w.write_all(b"Hello, streaming!").unwrap();
    w.close().unwrap();

    let after_first = engine.counters.snapshot();
    assert_eq!(after_first.0, 1);
    assert_eq!(after_first.1, 1);

    w.close().unwrap();
    assert_eq!(engine.counters.snapshot(), after_first);
    assert_eq!(w.get_ref(), &fake_frame(b"Hello, streaming!", 255));
}

#[test]
fn test_never_opened_writer_makes_no_native_calls() {
    let engine = FakeEngine::new();
    let mut w = writer(Vec::new(), &engine, 4);
    w.flush().unwrap();
    w.close().unwrap();
    w.close().unwrap();
    assert_eq!(engine.counters.snapshot(), (0, 0, 0));
    assert!(w.get_ref().is_empty());
}

#[test]
fn test_session_opened_lazily() {
    let engine = FakeEngine::new();
    let w = writer(Vec::new(), &engine, 4);
    assert_eq!(engine.counters.created(), 0);
    drop(w);
    assert_eq!(engine.counters.freed(), 0);
}

#[test]
fn test_drop_releases_session() {
    let engine = FakeEngine::new();
    let mut w = writer(Vec::new(), &engine, 4);
    w.write_all(b"unfinished").unwrap();
    drop(w);
    assert_eq!(engine.counters.created(), 1);
    assert_eq!(engine.counters.freed(), 1);
}

#[test]
fn test_write_after_close_is_misuse() {
    let engine = FakeEngine::new();
    let mut w = writer(Vec::new(), &engine, 4);
    w.write_all(b"x").unwrap();
    w.close().unwrap();
    let steps = engine.counters.steps();

    let err = w.try_write(b"y").unwrap_err();
    assert_eq!(err.consumed, 0);
    assert!(matches!(err.error, ZstreamError::Closed));
    assert!(matches!(w.flush_frame(), Err(ZstreamError::Closed)));
    assert_eq!(engine.counters.steps(), steps);
}

#[test]
fn test_flush_does_not_end_frame() {
    let engine = FakeEngine::new();
    let mut w = writer(Vec::new(), &engine, 3);
    w.write_all(b"first").unwrap();
    w.flush().unwrap();

    // Everything written so far is on the sink, but no terminator yet
    assert_eq!(w.get_ref(), &fake_frame(b"first", 255)[..6]);

    w.write_all(b"second").unwrap();
    let frame = w.finish().unwrap();
    assert_eq!(engine.counters.created(), 1);

    let mut r = reader(&frame[..], &engine, 3);
    let mut out = Vec::new();
    r.read_to_end(&mut out).unwrap();
    assert_eq!(out, b"firstsecond");
}

// ============================================================================
// Writer faults
// ============================================================================

#[test]
fn test_partial_progress_reporting() {
    // Records of 3 payload bytes are 4 bytes each; the sink takes 10 bytes,
    // so only the first two records (6 input bytes) arrive in full.
    let engine = FakeEngine::new().max_record(3);
    let mut w = writer(FailingSink::new(10), &engine, 4);

    let err = w.try_write(b"abcdefghij").unwrap_err();
    assert_eq!(err.consumed, 6);
    assert!(matches!(err.error, ZstreamError::Io(_)));
    assert!(w.is_closed());
    assert_eq!(engine.counters.freed(), 1);
    assert_eq!(w.total_in(), 6);
}

#[test]
fn test_short_write_then_error() {
    let engine = FakeEngine::new().max_record(3);
    let mut w = writer(FailingSink::new(10), &engine, 4);

    assert_eq!(w.write(b"abcdefghij").unwrap(), 6);
    let err = w.write(b"ghij").unwrap_err();
    assert_eq!(err.to_string(), "sink full");

    let steps = engine.counters.steps();
    w.close().unwrap();
    assert_eq!(engine.counters.steps(), steps);
    assert!(matches!(w.try_write(b"j").unwrap_err().error, ZstreamError::Closed));
}

#[test]
fn test_write_all_surfaces_sink_error() {
    let engine = FakeEngine::new().max_record(3);
    let mut w = writer(FailingSink::new(10), &engine, 4);
    let err = w.write_all(b"abcdefghij").unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::Other);
}

#[test]
fn test_codec_fault_releases_session() {
    let engine = FakeEngine::with_behavior(Behavior::FailAtStep(3)).max_record(2);
    let mut w = writer(Vec::new(), &engine, 4);

    let err = w.try_write(b"abcdefgh").unwrap_err();
    assert_eq!(err.consumed, 4);
    assert!(matches!(err.error, ZstreamError::Codec { code: 99, .. }));
    assert_eq!(engine.counters.freed(), 1);

    let steps = engine.counters.steps();
    w.close().unwrap();
    assert_eq!(engine.counters.snapshot(), (1, 1, steps));
}

#[test]
fn test_close_fault_still_releases() {
    // The write takes one step; the first end step fails
    let engine = FakeEngine::with_behavior(Behavior::FailAtStep(2));
    let mut w = writer(Vec::new(), &engine, 64);
    w.write_all(b"payload").unwrap();

    let err = w.close().unwrap_err();
    assert!(matches!(err, ZstreamError::Codec { .. }));
    assert_eq!(engine.counters.freed(), 1);
    assert!(w.is_closed());
    w.close().unwrap();
}

#[test]
fn test_session_creation_failure() {
    let engine = FakeEngine::with_behavior(Behavior::FailCreate);
    let mut w = writer(Vec::new(), &engine, 4);

    let err = w.write(b"data").unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::OutOfMemory);
    assert!(matches!(
        ZstreamError::from_io(&err),
        Some(ZstreamError::SessionCreation { .. })
    ));
    assert!(w.is_closed());
    w.close().unwrap();
    assert_eq!(engine.counters.snapshot(), (0, 0, 0));
}

#[test]
fn test_writer_stall_detected() {
    let engine = FakeEngine::with_behavior(Behavior::Stall);
    let mut w = writer(Vec::new(), &engine, 4);

    let err = w.try_write(b"data").unwrap_err();
    assert_eq!(err.consumed, 0);
    assert!(matches!(err.error, ZstreamError::ProgressStall { idle_steps: 8 }));
    assert_eq!(engine.counters.steps(), 8);
    assert_eq!(engine.counters.freed(), 1);
}

// ============================================================================
// Reader
// ============================================================================

#[test]
fn test_reader_close_is_idempotent() {
    let engine = FakeEngine::new();
    let frame = fake_frame(b"some data", 255);
    let mut r = reader(&frame[..], &engine, 4);
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf).unwrap();

    r.close().unwrap();
    let after_first = engine.counters.snapshot();
    assert_eq!((after_first.0, after_first.1), (1, 1));
    r.close().unwrap();
    assert_eq!(engine.counters.snapshot(), after_first);

    let err = r.read(&mut buf).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
}

#[test]
fn test_reader_serves_leftovers_without_native_calls() {
    let engine = FakeEngine::new();
    let frame = fake_frame(b"abcdefgh", 255);
    let mut r = reader(&frame[..], &engine, 64);

    let mut one = [0u8; 1];
    r.read_exact(&mut one).unwrap();
    let steps = engine.counters.steps();
    let mut rest = [0u8; 7];
    r.read_exact(&mut rest).unwrap();
    assert_eq!(engine.counters.steps(), steps);
    assert_eq!(&rest, b"bcdefgh");
}

#[test]
fn test_empty_source_is_empty_stream() {
    let engine = FakeEngine::new();
    let mut r = reader(&b""[..], &engine, 4);
    let mut buf = [0u8; 8];
    assert_eq!(r.read(&mut buf).unwrap(), 0);
    assert!(r.is_finished());
    r.close().unwrap();
    assert_eq!(engine.counters.snapshot(), (0, 0, 0));
}

#[test]
fn test_no_data_is_not_end_of_stream() {
    let engine = FakeEngine::new().max_record(5);
    let data: Vec<u8> = (0..100u8).collect();
    let source = ScriptedSource::new(fake_frame(&data, 5), 3).alternating();
    let mut r = reader(source, &engine, 4);

    let (out, retries) = read_all_retrying(&mut r).unwrap();
    assert_eq!(out, data);
    assert!(retries > 0);
    assert!(r.is_finished());
}

#[test]
fn test_would_block_keeps_reader_usable() {
    let engine = FakeEngine::new();
    let source = ScriptedSource::new(fake_frame(b"xyz", 255), 64).alternating();
    let mut r = reader(source, &engine, 16);
    let mut buf = [0u8; 16];

    let err = r.read(&mut buf).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
    assert!(!r.is_closed());
    assert_eq!(engine.counters.created(), 0);

    assert_eq!(r.read(&mut buf).unwrap(), 3);
    assert_eq!(&buf[..3], b"xyz");
    assert_eq!(r.read(&mut buf).unwrap(), 0);
}

#[test]
fn test_reader_stall_detected() {
    let engine = FakeEngine::with_behavior(Behavior::Stall);
    let mut r = reader(&b"\x03abc\x00"[..], &engine, 4);
    let mut buf = [0u8; 4];

    let err = r.read(&mut buf).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    assert!(matches!(
        ZstreamError::from_io(&err),
        Some(ZstreamError::ProgressStall { idle_steps: 8 })
    ));
    assert_eq!(engine.counters.steps(), 8);
    assert_eq!(engine.counters.freed(), 1);
    assert!(r.is_closed());
}

#[test]
fn test_truncated_frame_stalls_at_eof() {
    let engine = FakeEngine::new();
    let mut frame = fake_frame(b"cut short", 255);
    frame.pop();
    let mut r = reader(&frame[..], &engine, 4);

    let mut out = Vec::new();
    let err = r.read_to_end(&mut out).unwrap_err();
    assert!(matches!(
        ZstreamError::from_io(&err),
        Some(ZstreamError::ProgressStall { .. })
    ));
    assert_eq!(out, b"cut short");
}

#[test]
fn test_reader_codec_fault() {
    let engine = FakeEngine::with_behavior(Behavior::FailAtStep(1));
    let frame = fake_frame(b"abc", 255);
    let mut r = reader(&frame[..], &engine, 4);

    let err = r.read(&mut [0u8; 4]).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    assert_eq!(engine.counters.freed(), 1);
    r.close().unwrap();
    assert_eq!(engine.counters.snapshot(), (1, 1, 1));
}

#[test]
fn test_source_error_is_fatal() {
    let engine = FakeEngine::new();
    let mut frame = fake_frame(b"abc", 255);
    frame.pop();
    let source = ScriptedSource::new(frame, 64).fail_at_end(io::ErrorKind::TimedOut);
    let mut r = reader(source, &engine, 16);

    let mut buf = [0u8; 16];
    assert_eq!(r.read(&mut buf).unwrap(), 3);
    let err = r.read(&mut buf).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    assert!(r.is_closed());
    assert_eq!(engine.counters.freed(), 1);
}

#[test]
fn test_interrupted_source_keeps_reader_usable() {
    let engine = FakeEngine::new();
    let mut frame = fake_frame(b"abc", 255);
    frame.pop();
    let source = ScriptedSource::new(frame, 64).fail_at_end(io::ErrorKind::Interrupted);
    let mut r = reader(source, &engine, 16);

    let mut buf = [0u8; 16];
    assert_eq!(r.read(&mut buf).unwrap(), 3);
    let err = r.read(&mut buf).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::Interrupted);
    assert!(!r.is_closed());
    assert_eq!(engine.counters.freed(), 0);

    r.close().unwrap();
    assert_eq!(engine.counters.freed(), 1);
}

#[test]
fn test_reader_size_limit() {
    let engine = FakeEngine::new();
    let frame = fake_frame(b"0123456789", 255);
    let mut r = StreamReader::with_engine(
        &frame[..],
        engine.clone(),
        CodecOptions::default().with_max_decompress_size(5),
        StreamConfig::default().with_capacity(4),
    )
    .unwrap();

    let mut out = Vec::new();
    let err = r.read_to_end(&mut out).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    assert!(matches!(
        ZstreamError::from_io(&err),
        Some(ZstreamError::SizeLimitExceeded { limit: 5, .. })
    ));
    assert!(out.len() <= 5);
    assert!(r.is_closed());
    assert_eq!(engine.counters.freed(), 1);
}

#[test]
fn test_reader_size_limit_exact() {
    let engine = FakeEngine::new();
    let frame = fake_frame(b"0123456789", 255);
    let mut r = StreamReader::with_engine(
        &frame[..],
        engine.clone(),
        CodecOptions::default().with_max_decompress_size(10),
        StreamConfig::default().with_capacity(4),
    )
    .unwrap();

    let mut out = Vec::new();
    r.read_to_end(&mut out).unwrap();
    assert_eq!(out, b"0123456789");
}

#[test]
fn test_trailing_bytes_ignored() {
    let engine = FakeEngine::new();
    let mut frame = fake_frame(b"frame one", 255);
    frame.extend_from_slice(b"\x03zzz\x00");
    let mut r = reader(&frame[..], &engine, 64);

    let mut out = Vec::new();
    r.read_to_end(&mut out).unwrap();
    assert_eq!(out, b"frame one");
}

// ============================================================================
// Chunking
// ============================================================================

#[test]
fn test_one_byte_chunks() {
    let data = b"Hello, streaming! Hello, streaming!";
    assert_eq!(fake_roundtrip(data, 1, 1), data);
}

proptest! {
    #[test]
    fn prop_chunking_does_not_change_content(
        data in prop::collection::vec(any::<u8>(), 0..512),
        chunk in 1usize..64,
        capacity in 1usize..32,
    ) {
        prop_assert_eq!(fake_roundtrip(&data, chunk, capacity), data);
    }
}
