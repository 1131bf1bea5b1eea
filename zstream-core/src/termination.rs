//! Termination tracking and stall detection.
//!
//! A stream moves through [`TerminationState`] as it finishes: a flush or end
//! is requested, the engine is driven until it reports completion, and the
//! stream is then complete. [`ProgressGuard`] bounds how many consecutive
//! steps may pass without moving any bytes, so a truncated input or a broken
//! engine surfaces as [`ZstreamError::ProgressStall`] instead of spinning.

use tracing::{debug, warn};

use crate::error::{Result, ZstreamError};
use crate::traits::ContinuationHint;

/// Counts consecutive steps that made no progress.
#[derive(Debug, Clone, Copy)]
pub struct ProgressGuard {
    idle: u32,
    limit: u32,
}

impl ProgressGuard {
    /// Create a guard that trips after `limit` idle steps.
    pub fn new(limit: u32) -> Self {
        Self {
            idle: 0,
            limit: limit.max(1),
        }
    }

    /// Record one step outcome.
    ///
    /// Any progress or completion resets the idle count.
    pub fn record(&mut self, hint: ContinuationHint) -> Result<()> {
        match hint {
            ContinuationHint::NoProgress => {
                self.idle += 1;
                if self.idle >= self.limit {
                    warn!(idle_steps = self.idle, "engine made no progress");
                    return Err(ZstreamError::progress_stall(self.idle));
                }
            }
            ContinuationHint::MoreWork | ContinuationHint::FrameComplete => self.idle = 0,
        }
        Ok(())
    }

    /// Current idle count.
    pub fn idle(&self) -> u32 {
        self.idle
    }

    /// Forget past idle steps.
    pub fn reset(&mut self) {
        self.idle = 0;
    }
}

/// Where a stream is in finishing its current unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TerminationState {
    /// Normal operation.
    #[default]
    Streaming,
    /// A flush or end was requested; no step has run for it yet.
    FlushRequested,
    /// Steps are running and the engine still reports pending work.
    Draining,
    /// The engine reported completion.
    Complete,
}

/// Termination state machine with an embedded stall guard.
#[derive(Debug, Clone, Copy)]
pub struct Termination {
    state: TerminationState,
    guard: ProgressGuard,
}

impl Termination {
    /// Create a tracker in [`TerminationState::Streaming`].
    pub fn new(max_idle_steps: u32) -> Self {
        Self {
            state: TerminationState::Streaming,
            guard: ProgressGuard::new(max_idle_steps),
        }
    }

    /// Current state.
    pub fn state(&self) -> TerminationState {
        self.state
    }

    /// True once the engine reported completion.
    pub fn is_complete(&self) -> bool {
        self.state == TerminationState::Complete
    }

    /// Ask for termination. Has no effect once complete.
    pub fn request(&mut self) {
        if self.state == TerminationState::Streaming {
            debug!("termination requested");
            self.state = TerminationState::FlushRequested;
            self.guard.reset();
        }
    }

    /// Feed one step outcome into the state machine.
    pub fn observe(&mut self, hint: ContinuationHint) -> Result<TerminationState> {
        self.guard.record(hint)?;
        self.state = match (self.state, hint) {
            (_, ContinuationHint::FrameComplete) => TerminationState::Complete,
            (TerminationState::FlushRequested, _) => TerminationState::Draining,
            (state, _) => state,
        };
        Ok(self.state)
    }

    /// Return to streaming after a completed flush.
    pub fn resume(&mut self) {
        self.state = TerminationState::Streaming;
        self.guard.reset();
    }
}
