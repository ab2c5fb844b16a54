//! Bounded busy-poll helper.
//!
//! Every wait in the harness (transmit vacancy, transmit done, receive
//! occupancy) spins on a capability query under a [`PollBudget`]. The budget
//! counts iterations rather than wall-clock time, so it must be recalibrated
//! if the per-iteration cost of a poll changes.

use thiserror::Error;

/// A poll budget expired before the condition held.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("condition not met within {0} poll iterations")]
pub struct PollExpired(pub u32);

/// Iteration-bounded spin wait.
///
/// The budget itself is a reusable policy value; each [`wait`](Self::wait)
/// call runs a fresh countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
    iterations: u32,
}

impl PollBudget {
    /// Default receive-timeout budget of the reference design.
    pub const DEFAULT_ITERATIONS: u32 = 1 << 20;

    /// Create a budget of `iterations` condition checks per wait.
    ///
    /// A zero budget is clamped to one so every wait observes the
    /// condition at least once.
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    /// Configured iterations per wait.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Spin until `cond` returns true, checking it at most
    /// `iterations` times.
    pub fn wait(&self, mut cond: impl FnMut() -> bool) -> Result<(), PollExpired> {
        let mut remaining = self.iterations;
        loop {
            if cond() {
                return Ok(());
            }
            remaining -= 1;
            if remaining == 0 {
                return Err(PollExpired(self.iterations));
            }
        }
    }
}

impl Default for PollBudget {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ITERATIONS)
    }
}
