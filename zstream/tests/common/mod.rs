//! Shared fixtures for the adapter tests.
//!
//! [`FakeEngine`] frames data as `[len][payload]` records ended by a single
//! `0` byte, counts every session it opens, frees, and steps, and can be told
//! to misbehave.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use zstream_core::{
    CodecOptions, Compressor, Decompressor, Engine, EngineFault, FlushMode, InputCursor,
    OutputCursor, Result, SessionKind, ZstreamError,
};

// ============================================================================
// Fake engine
// ============================================================================

/// Native-call counters shared between an engine and its sessions.
#[derive(Debug, Default)]
pub struct Counters {
    pub created: AtomicUsize,
    pub freed: AtomicUsize,
    pub steps: AtomicUsize,
}

impl Counters {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn freed(&self) -> usize {
        self.freed.load(Ordering::SeqCst)
    }

    pub fn steps(&self) -> usize {
        self.steps.load(Ordering::SeqCst)
    }

    /// Snapshot of (created, freed, steps).
    pub fn snapshot(&self) -> (usize, usize, usize) {
        (self.created(), self.freed(), self.steps())
    }
}

/// How the fake engine behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Well-behaved record framing.
    Normal,
    /// Session creation returns nothing.
    FailCreate,
    /// The n-th step of a session (1-based) reports a fault.
    FailAtStep(usize),
    /// Every step reports more work without moving a byte.
    Stall,
}

#[derive(Debug, Clone)]
pub struct FakeEngine {
    pub counters: Arc<Counters>,
    pub behavior: Behavior,
    /// Largest payload per record.
    pub max_record: usize,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::with_behavior(Behavior::Normal)
    }

    pub fn with_behavior(behavior: Behavior) -> Self {
        Self {
            counters: Arc::new(Counters::default()),
            behavior,
            max_record: 255,
        }
    }

    pub fn max_record(mut self, max_record: usize) -> Self {
        self.max_record = max_record.clamp(1, 255);
        self
    }

    fn open(&self, kind: SessionKind) -> Result<FakeSession> {
        if self.behavior == Behavior::FailCreate {
            return Err(ZstreamError::session_creation(kind));
        }
        self.counters.created.fetch_add(1, Ordering::SeqCst);
        Ok(FakeSession {
            counters: Arc::clone(&self.counters),
            behavior: self.behavior,
            max_record: self.max_record,
            steps: 0,
            queue: VecDeque::new(),
            ended: false,
            intake: Vec::new(),
        })
    }
}

impl Engine for FakeEngine {
    type Compressor = FakeSession;
    type Decompressor = FakeSession;
    type Dictionary = ();

    fn create_compressor(&self, _options: &CodecOptions, _dictionary: Option<&()>) -> Result<FakeSession> {
        self.open(SessionKind::Compression)
    }

    fn create_decompressor(
        &self,
        _options: &CodecOptions,
        _dictionary: Option<&()>,
    ) -> Result<FakeSession> {
        self.open(SessionKind::Decompression)
    }
}

pub struct FakeSession {
    counters: Arc<Counters>,
    behavior: Behavior,
    max_record: usize,
    steps: usize,
    /// Bytes produced but not yet handed out.
    queue: VecDeque<u8>,
    /// Terminator emitted (compression) or seen (decompression).
    ended: bool,
    /// Compressed bytes accepted but not yet parsed.
    intake: Vec<u8>,
}

impl FakeSession {
    /// Count the step and apply fault injection.
    fn begin_step(&mut self) -> std::result::Result<bool, EngineFault> {
        self.steps += 1;
        self.counters.steps.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::FailAtStep(n) if self.steps >= n => {
                Err(EngineFault::new(99, "Injected fault"))
            }
            Behavior::Stall => Ok(false),
            _ => Ok(true),
        }
    }

    fn drain_queue(&mut self, output: &mut OutputCursor<'_>) {
        while !output.is_full() {
            match self.queue.pop_front() {
                Some(byte) => {
                    output.write_from(&[byte]);
                }
                None => break,
            }
        }
    }

    /// Parse complete records out of the intake.
    fn parse_records(&mut self) -> std::result::Result<(), EngineFault> {
        let mut pos = 0;
        while !self.ended && pos < self.intake.len() {
            let len = self.intake[pos] as usize;
            if len == 0 {
                self.ended = true;
                pos += 1;
                break;
            }
            if pos + 1 + len > self.intake.len() {
                break;
            }
            self.queue
                .extend(&self.intake[pos + 1..pos + 1 + len]);
            pos += 1 + len;
        }
        self.intake.drain(..pos);
        Ok(())
    }
}

impl Compressor for FakeSession {
    fn compress_step(
        &mut self,
        output: &mut OutputCursor<'_>,
        input: &mut InputCursor<'_>,
        mode: FlushMode,
    ) -> std::result::Result<usize, EngineFault> {
        if !self.begin_step()? {
            return Ok(1);
        }

        self.drain_queue(output);
        if self.queue.is_empty() && !input.is_exhausted() {
            let take = input.remaining().min(self.max_record);
            self.queue.push_back(take as u8);
            self.queue.extend(&input.unconsumed()[..take]);
            input.consume(take);
            self.drain_queue(output);
        }
        if mode == FlushMode::End && input.is_exhausted() && !self.ended && self.queue.is_empty()
        {
            self.queue.push_back(0);
            self.ended = true;
            self.drain_queue(output);
        }

        let mut pending = self.queue.len() + input.remaining();
        if mode == FlushMode::End && !self.ended {
            pending += 1;
        }
        Ok(pending)
    }
}

impl Decompressor for FakeSession {
    fn decompress_step(
        &mut self,
        output: &mut OutputCursor<'_>,
        input: &mut InputCursor<'_>,
    ) -> std::result::Result<usize, EngineFault> {
        if !self.begin_step()? {
            return Ok(1);
        }

        if !self.ended {
            self.intake.extend_from_slice(input.unconsumed());
            input.consume(input.remaining());
            self.parse_records()?;
        }
        self.drain_queue(output);

        if self.ended && self.queue.is_empty() {
            Ok(0)
        } else {
            Ok(self.queue.len() + 1)
        }
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.counters.freed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Frame `data` the way the fake compressor does, in one go.
pub fn fake_frame(data: &[u8], max_record: usize) -> Vec<u8> {
    let mut frame = Vec::new();
    for chunk in data.chunks(max_record) {
        frame.push(chunk.len() as u8);
        frame.extend_from_slice(chunk);
    }
    frame.push(0);
    frame
}

// ============================================================================
// Scripted sources and sinks
// ============================================================================

/// A source that hands out `chunk`-sized pieces, optionally answering
/// `WouldBlock` before every piece.
pub struct ScriptedSource {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
    would_block: bool,
    blocked: bool,
    /// Error returned once all data has been delivered, instead of EOF.
    fail_at_end: Option<io::ErrorKind>,
}

impl ScriptedSource {
    pub fn new(data: Vec<u8>, chunk: usize) -> Self {
        Self {
            data,
            pos: 0,
            chunk: chunk.max(1),
            would_block: false,
            blocked: false,
            fail_at_end: None,
        }
    }

    /// Answer `WouldBlock` before every real chunk.
    pub fn alternating(mut self) -> Self {
        self.would_block = true;
        self
    }

    /// Fail with `kind` instead of reporting end of input.
    pub fn fail_at_end(mut self, kind: io::ErrorKind) -> Self {
        self.fail_at_end = Some(kind);
        self
    }
}

impl Read for ScriptedSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.data.len() {
            return match self.fail_at_end {
                Some(kind) => Err(io::Error::new(kind, "scripted source failure")),
                None => Ok(0),
            };
        }
        if self.would_block {
            self.blocked = !self.blocked;
            if self.blocked {
                return Err(io::ErrorKind::WouldBlock.into());
            }
        }
        let n = self.chunk.min(buf.len()).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// A sink that accepts `limit` bytes and then fails.
#[derive(Debug, Default)]
pub struct FailingSink {
    pub accepted: Vec<u8>,
    pub limit: usize,
    pub flushes: usize,
}

impl FailingSink {
    pub fn new(limit: usize) -> Self {
        Self {
            accepted: Vec::new(),
            limit,
            flushes: 0,
        }
    }
}

impl Write for FailingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.limit.saturating_sub(self.accepted.len());
        if room == 0 {
            return Err(io::Error::other("sink full"));
        }
        let n = room.min(buf.len());
        self.accepted.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

/// Read everything, retrying on `WouldBlock`, and count the retries.
pub fn read_all_retrying<R: Read>(reader: &mut R) -> io::Result<(Vec<u8>, usize)> {
    let mut out = Vec::new();
    let mut buf = [0u8; 5];
    let mut retries = 0;
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok((out, retries)),
            Ok(n) => out.extend_from_slice(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => retries += 1,
            Err(e) => return Err(e),
        }
    }
}
