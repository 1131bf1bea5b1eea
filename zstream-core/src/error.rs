//! Error types for zstream operations.
//!
//! Every fault a stream can raise is one variant of [`ZstreamError`]. Faults
//! reported by the engine itself arrive as [`EngineFault`] values and are
//! translated into [`ZstreamError::Codec`] by the session wrappers.

use std::fmt;
use std::io;
use thiserror::Error;

/// Which kind of session failed to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    /// A compression session.
    Compression,
    /// A decompression session.
    Decompression,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKind::Compression => f.write_str("compression"),
            SessionKind::Decompression => f.write_str("decompression"),
        }
    }
}

/// The main error type for zstream operations.
#[derive(Debug, Error)]
pub enum ZstreamError {
    /// I/O error from the underlying source or sink, kept verbatim.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The engine reported a fault code during a step.
    #[error("Codec fault: {message} (code: {code})")]
    Codec {
        /// Raw engine fault code.
        code: usize,
        /// Engine diagnostic for the code.
        message: String,
    },

    /// The engine could not allocate a session.
    #[error("Failed to create {kind} session")]
    SessionCreation {
        /// Which session failed.
        kind: SessionKind,
    },

    /// The stream was used after it was closed or torn down by a fault.
    #[error("Stream is closed")]
    Closed,

    /// The engine kept reporting more work without consuming or producing bytes.
    #[error("Stream stalled: {idle_steps} engine steps without progress")]
    ProgressStall {
        /// Consecutive steps that made no progress.
        idle_steps: u32,
    },

    /// Compression level outside the supported range.
    #[error("Invalid compression level {level}: must be within {min}..={max}")]
    InvalidLevel {
        /// Requested level.
        level: i32,
        /// Smallest accepted level.
        min: i32,
        /// Largest accepted level.
        max: i32,
    },

    /// Configuration value rejected by validation.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What was wrong.
        message: String,
    },

    /// Decompressed output would exceed the caller's size limit.
    #[error("Size limit exceeded: need at least {needed} bytes, limit is {limit}")]
    SizeLimitExceeded {
        /// Configured limit.
        limit: usize,
        /// Bytes required so far.
        needed: usize,
    },

    /// A dictionary was loaded from zero bytes.
    #[error("Dictionary data is empty")]
    EmptyDictionary,
}

/// Result type alias for zstream operations.
pub type Result<T> = std::result::Result<T, ZstreamError>;

impl ZstreamError {
    /// Create a codec fault error.
    pub fn codec(code: usize, message: impl Into<String>) -> Self {
        Self::Codec {
            code,
            message: message.into(),
        }
    }

    /// Create a session creation error.
    pub fn session_creation(kind: SessionKind) -> Self {
        Self::SessionCreation { kind }
    }

    /// Create a progress stall error.
    pub fn progress_stall(idle_steps: u32) -> Self {
        Self::ProgressStall { idle_steps }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a size limit error.
    pub fn size_limit(limit: usize, needed: usize) -> Self {
        Self::SizeLimitExceeded { limit, needed }
    }

    /// True for source/sink errors that leave the stream usable.
    ///
    /// `WouldBlock` means the source has no data yet; `Interrupted` means the
    /// call should simply be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Io(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted)
        )
    }

    /// Recover the typed fault carried by an [`io::Error`] built from a
    /// [`ZstreamError`].
    pub fn from_io(err: &io::Error) -> Option<&ZstreamError> {
        err.get_ref()
            .and_then(|inner| inner.downcast_ref::<ZstreamError>())
    }

    /// Convert an [`io::Error`] back into a [`ZstreamError`], unwrapping a
    /// typed fault if it carries one.
    pub fn from_io_error(err: io::Error) -> Self {
        if Self::from_io(&err).is_none() {
            return Self::Io(err);
        }
        let kind = err.kind();
        match err.into_inner() {
            Some(inner) => match inner.downcast::<ZstreamError>() {
                Ok(typed) => *typed,
                Err(other) => Self::Io(io::Error::new(kind, other)),
            },
            None => Self::Io(kind.into()),
        }
    }
}

impl From<ZstreamError> for io::Error {
    fn from(err: ZstreamError) -> Self {
        match err {
            ZstreamError::Io(inner) => inner,
            other => {
                let kind = match &other {
                    ZstreamError::Codec { .. } => io::ErrorKind::InvalidData,
                    ZstreamError::ProgressStall { .. } => io::ErrorKind::UnexpectedEof,
                    ZstreamError::Closed => io::ErrorKind::BrokenPipe,
                    ZstreamError::SessionCreation { .. } => io::ErrorKind::OutOfMemory,
                    _ => io::ErrorKind::InvalidInput,
                };
                io::Error::new(kind, other)
            }
        }
    }
}

/// A fault reported by the engine for a single step or parameter call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineFault {
    /// Raw fault code.
    pub code: usize,
    /// Engine diagnostic string for the code.
    pub message: String,
}

impl EngineFault {
    /// Create a new engine fault.
    pub fn new(code: usize, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<EngineFault> for ZstreamError {
    fn from(fault: EngineFault) -> Self {
        ZstreamError::Codec {
            code: fault.code,
            message: fault.message,
        }
    }
}

/// A write that failed after part of the caller's slice was handed off.
///
/// `consumed` counts the caller bytes whose compressed output reached the sink
/// in full before `error` occurred.
#[derive(Debug, Error)]
#[error("write failed after {consumed} bytes: {error}")]
pub struct PartialWrite {
    /// Caller bytes durably forwarded before the fault.
    pub consumed: usize,
    /// The fault that stopped the write.
    #[source]
    pub error: ZstreamError,
}

impl PartialWrite {
    /// Create a partial write report.
    pub fn new(consumed: usize, error: ZstreamError) -> Self {
        Self { consumed, error }
    }
}
