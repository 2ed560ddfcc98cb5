//! Retry/poll policy for waiting on response bytes
//!
//! The executor polls the transport for availability instead of blocking
//! on a read: [`RetryPolicy`] bounds how many polls happen and how long
//! the caller sleeps between them, and [`PollWait`] is the pure state
//! machine driven by those polls. Keeping the state machine free of I/O
//! lets tests assert the exact poll count.

use std::time::Duration;

use crate::constants::{DEFAULT_READ_RETRY, READ_RETRY_SLEEP_MS};

/// Poll budget configuration
///
/// Held by the command executor, not process-global, so a caller can
/// tighten it for a fast-fail probe and restore the previous value
/// afterwards (`RetryPolicy` is `Copy`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum availability polls before declaring a timeout.
    /// Zero means a single immediate check with no retry.
    pub max_wait_polls: u32,

    /// Cooperative sleep between polls
    pub poll_interval: Duration,
}

impl RetryPolicy {
    /// Create a policy with an explicit poll budget
    pub const fn new(max_wait_polls: u32, poll_interval: Duration) -> Self {
        Self {
            max_wait_polls,
            poll_interval,
        }
    }

    /// Single immediate availability check, no retry.
    ///
    /// Used for initialization probes where delayed failure is worse
    /// than fast failure: the device should already be responsive.
    pub const fn fast_fail() -> Self {
        Self::new(0, Duration::from_millis(READ_RETRY_SLEEP_MS))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_READ_RETRY,
            Duration::from_millis(READ_RETRY_SLEEP_MS),
        )
    }
}

/// Outcome of one availability poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollVerdict {
    /// Bytes are available, stop polling
    Ready,

    /// No bytes yet, sleep and poll again
    Waiting,

    /// Poll budget exhausted with no data
    TimedOut,
}

/// Wait-loop state for one command dispatch
#[derive(Debug)]
pub struct PollWait {
    budget: u32,
    polls: u32,
}

impl PollWait {
    /// Start a new wait with the policy's poll budget
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            // A zero budget still gets its single immediate check
            budget: policy.max_wait_polls.max(1),
            polls: 0,
        }
    }

    /// Record one availability check and decide what happens next
    pub fn tick(&mut self, available: usize) -> PollVerdict {
        self.polls += 1;

        if available > 0 {
            PollVerdict::Ready
        } else if self.polls >= self.budget {
            PollVerdict::TimedOut
        } else {
            PollVerdict::Waiting
        }
    }

    /// Number of availability checks performed so far
    pub fn polls(&self) -> u32 {
        self.polls
    }
}
