//! Pacing of assistant replies.
//!
//! A reply is held back behind a typing placeholder for a moment before it is
//! revealed. The wait is a trait so a streaming implementation can replace
//! the fixed delay without touching the turn state machine.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tracing::trace;

/// Delay used when none is configured.
pub const DEFAULT_TYPING_DELAY: Duration = Duration::from_millis(1500);

/// How a pacing wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaceOutcome {
    /// The full delay elapsed.
    Elapsed,
    /// The wait was cut short by [`ResponsePacer::skip`].
    Skipped,
}

/// Decides when a ready reply may be revealed.
#[async_trait]
pub trait ResponsePacer: Send + Sync {
    /// Wait before revealing `text`.
    async fn pace(&self, text: &str) -> PaceOutcome;

    /// End any wait in progress. Waits that start later are unaffected.
    fn skip(&self) {}
}

/// Waits a fixed amount of time regardless of the reply.
pub struct FixedDelayPacer {
    delay: Duration,
    skip: Notify,
}

impl FixedDelayPacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            skip: Notify::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for FixedDelayPacer {
    fn default() -> Self {
        Self::new(DEFAULT_TYPING_DELAY)
    }
}

#[async_trait]
impl ResponsePacer for FixedDelayPacer {
    async fn pace(&self, text: &str) -> PaceOutcome {
        trace!(delay_ms = self.delay.as_millis() as u64, len = text.len(), "Pacing reply");
        tokio::select! {
            _ = tokio::time::sleep(self.delay) => PaceOutcome::Elapsed,
            _ = self.skip.notified() => PaceOutcome::Skipped,
        }
    }

    fn skip(&self) {
        self.skip.notify_waiters();
    }
}
