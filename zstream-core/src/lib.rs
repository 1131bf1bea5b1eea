//! # zstream Core
//!
//! Core components for the zstream streaming compression library.
//!
//! This crate provides the engine-independent building blocks shared by the
//! stream adapters:
//!
//! - [`cursor`]: Input/output cursors passed into every engine step
//! - [`staging`]: Fixed-capacity staging buffers
//! - [`traits`]: Engine and session traits, flush modes, step hints
//! - [`session`]: Session wrappers that classify step results
//! - [`termination`]: Flush/end state machine and stall detection
//! - [`config`]: Stream and codec configuration
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Adapters                                            │
//! │     StreamWriter (Write), StreamReader (Read), CLI      │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Engine                                              │
//! │     Native zstd sessions, one-shot codec, dictionaries  │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Step protocol (this crate)                          │
//! │     Cursors, sessions, termination, errors              │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use zstream_core::cursor::{InputCursor, OutputCursor};
//! use zstream_core::staging::StagingBuffer;
//!
//! let mut input = InputCursor::new(b"Hello, World!");
//! let mut staging = StagingBuffer::new(8);
//!
//! let mut output = OutputCursor::new(staging.region_mut());
//! let copied = output.write_from(input.unconsumed());
//! input.consume(copied);
//! staging.set_filled(copied);
//!
//! assert_eq!(staging.pending(), b"Hello, W");
//! assert_eq!(input.remaining(), 5);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod cursor;
pub mod error;
pub mod session;
pub mod staging;
pub mod termination;
pub mod traits;

// Re-exports for convenience
pub use config::{CodecOptions, CompressionLevel, DEFAULT_MAX_IDLE_STEPS, StreamConfig};
pub use cursor::{InputCursor, OutputCursor};
pub use error::{EngineFault, PartialWrite, Result, SessionKind, ZstreamError};
pub use session::{CompressionSession, DecompressionSession};
pub use staging::StagingBuffer;
pub use termination::{ProgressGuard, Termination, TerminationState};
pub use traits::{Compressor, ContinuationHint, Decompressor, Engine, FlushMode};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{CodecOptions, CompressionLevel, StreamConfig};
    pub use crate::cursor::{InputCursor, OutputCursor};
    pub use crate::error::{Result, ZstreamError};
    pub use crate::traits::{Compressor, ContinuationHint, Decompressor, Engine, FlushMode};
}
