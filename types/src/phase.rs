//! Lifecycle of a producer/consumer pair.
//!
//! ```text
//! Running -> Closing -> Draining -> Terminated
//!               \_______________________/
//! ```
//!
//! `Closing` is entered when the channel is closed, either by a producer
//! that reached its threshold or by shutdown. `Draining` covers a closed
//! channel that still buffers unread items. A closed channel that is
//! already empty goes straight to `Terminated`.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Running,
    Closing,
    Draining,
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid phase transition from {from} to {to}")]
pub struct PhaseTransitionError {
    pub from: Phase,
    pub to: Phase,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Running => "running",
            Phase::Closing => "closing",
            Phase::Draining => "draining",
            Phase::Terminated => "terminated",
        }
    }

    #[must_use]
    pub const fn can_transition_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Running, Phase::Closing)
                | (Phase::Closing, Phase::Draining | Phase::Terminated)
                | (Phase::Draining, Phase::Terminated)
        )
    }

    pub fn transition(self, next: Phase) -> Result<Phase, PhaseTransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(PhaseTransitionError {
                from: self,
                to: next,
            })
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Phase::Terminated)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
