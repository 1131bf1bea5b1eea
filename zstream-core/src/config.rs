//! Stream and codec configuration.

use crate::error::{Result, ZstreamError};
use crate::staging::sizes;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default bound on consecutive steps without progress.
pub const DEFAULT_MAX_IDLE_STEPS: u32 = 8;

/// Buffering configuration for the stream adapters.
///
/// Both capacities are performance knobs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StreamConfig {
    /// Staging capacity for the reader's compressed intake and decoded output.
    pub read_staging_capacity: usize,
    /// Staging capacity for the writer's compressed output.
    pub write_staging_capacity: usize,
    /// Consecutive no-progress steps tolerated before a stall is reported.
    pub max_idle_steps: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            read_staging_capacity: sizes::READ,
            write_staging_capacity: sizes::WRITE,
            max_idle_steps: DEFAULT_MAX_IDLE_STEPS,
        }
    }
}

impl StreamConfig {
    /// Set the read-side staging capacity.
    pub fn with_read_capacity(mut self, capacity: usize) -> Self {
        self.read_staging_capacity = capacity;
        self
    }

    /// Set the write-side staging capacity.
    pub fn with_write_capacity(mut self, capacity: usize) -> Self {
        self.write_staging_capacity = capacity;
        self
    }

    /// Set both staging capacities.
    pub fn with_capacity(self, capacity: usize) -> Self {
        self.with_read_capacity(capacity)
            .with_write_capacity(capacity)
    }

    /// Set the stall bound.
    pub fn with_max_idle_steps(mut self, steps: u32) -> Self {
        self.max_idle_steps = steps;
        self
    }

    /// Reject zero capacities and a zero stall bound.
    pub fn validate(&self) -> Result<()> {
        if self.read_staging_capacity == 0 {
            return Err(ZstreamError::invalid_config(
                "read staging capacity must be at least 1 byte",
            ));
        }
        if self.write_staging_capacity == 0 {
            return Err(ZstreamError::invalid_config(
                "write staging capacity must be at least 1 byte",
            ));
        }
        if self.max_idle_steps == 0 {
            return Err(ZstreamError::invalid_config(
                "max idle steps must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Compression level, 1 (fastest) through 22 (smallest output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompressionLevel(i32);

impl CompressionLevel {
    /// Smallest accepted level.
    pub const MIN: i32 = 1;
    /// Largest accepted level.
    pub const MAX: i32 = 22;

    /// Fastest compression.
    pub const FAST: Self = Self(1);
    /// Default compression (balanced).
    pub const DEFAULT: Self = Self(3);
    /// Better ratio at moderate cost.
    pub const BETTER: Self = Self(7);
    /// Highest practical level.
    pub const BEST: Self = Self(19);
    /// Maximum level; very slow and memory hungry.
    pub const ULTRA: Self = Self(22);

    /// Create a validated compression level.
    pub fn new(level: i32) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(Self(level))
        } else {
            Err(ZstreamError::InvalidLevel {
                level,
                min: Self::MIN,
                max: Self::MAX,
            })
        }
    }

    /// Create a level, saturating into the accepted range.
    pub fn clamped(level: i32) -> Self {
        Self(level.clamp(Self::MIN, Self::MAX))
    }

    /// Get the level value.
    pub fn level(&self) -> i32 {
        self.0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i32> for CompressionLevel {
    type Error = ZstreamError;

    fn try_from(level: i32) -> Result<Self> {
        Self::new(level)
    }
}

/// Codec parameters applied when a session is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CodecOptions {
    /// Compression level.
    pub level: CompressionLevel,
    /// Append a content checksum to each frame.
    pub checksum: bool,
    /// Window size as a power of two (`None` = engine default).
    ///
    /// Also used as the decoder's window limit.
    pub window_log: Option<u32>,
    /// Upper bound on the decompressed size of a frame read through a
    /// stream reader (`None` = no limit).
    pub max_decompress_size: Option<usize>,
}

impl CodecOptions {
    /// Options optimized for speed.
    pub fn fast() -> Self {
        Self {
            level: CompressionLevel::FAST,
            ..Self::default()
        }
    }

    /// Options optimized for compression ratio.
    pub fn best() -> Self {
        Self {
            level: CompressionLevel::BEST,
            ..Self::default()
        }
    }

    /// Set the compression level.
    pub fn with_level(mut self, level: CompressionLevel) -> Self {
        self.level = level;
        self
    }

    /// Enable or disable frame checksums.
    pub fn with_checksum(mut self, enabled: bool) -> Self {
        self.checksum = enabled;
        self
    }

    /// Set the window log.
    pub fn with_window_log(mut self, window_log: u32) -> Self {
        self.window_log = Some(window_log);
        self
    }

    /// Set the decompressed size limit for stream readers.
    pub fn with_max_decompress_size(mut self, limit: usize) -> Self {
        self.max_decompress_size = Some(limit);
        self
    }
}
