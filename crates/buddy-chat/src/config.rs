//! Chat controller configuration.

use std::time::Duration;

use crate::pacer::DEFAULT_TYPING_DELAY;

/// What to do with a backend reply whose session is no longer current.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StaleTurnPolicy {
    /// Drop the reply; the originating session returns to idle.
    #[default]
    Discard,
    /// Append the reply to the originating session anyway.
    Apply,
}

/// Chat controller configuration.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// How long the typing placeholder is shown before a reply.
    pub typing_delay: Duration,

    /// Upper bound on a single backend chat call.
    pub request_timeout: Duration,

    /// Handling of replies that arrive after the user switched sessions.
    pub stale_turn_policy: StaleTurnPolicy,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            typing_delay: DEFAULT_TYPING_DELAY,
            request_timeout: Duration::from_secs(30),
            stale_turn_policy: StaleTurnPolicy::Discard,
        }
    }
}
