//! Core domain types for Sluice.
//!
//! This crate has no IO and no async. It defines the vocabulary shared by
//! the channel, the strategies that drive it, and the presentation layer:
//! items, report events, strategy kinds, run settings and pipeline phases.

mod kinds;
mod phase;
mod settings;

pub use kinds::{ConsumerKind, EnumKind, EnumParseError, FullPolicy, ProducerKind};
pub use phase::{Phase, PhaseTransitionError};
pub use settings::{RunSettings, Timing};

use std::fmt;

/// A produced value. Carries no identity beyond its number.
pub type Item = u64;

/// Category tag attached to every report line.
///
/// The presentation layer decides how a category is rendered; the core only
/// says what kind of event happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Read,
    Write,
    Drop,
    Info,
}

impl Category {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Read => "read",
            Category::Write => "write",
            Category::Drop => "drop",
            Category::Info => "info",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single line of output emitted by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    text: String,
    category: Category,
}

impl Report {
    #[must_use]
    pub fn new(text: impl Into<String>, category: Category) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }

    #[must_use]
    pub fn read(item: Item) -> Self {
        Self::new(format!("Read {item}"), Category::Read)
    }

    #[must_use]
    pub fn written(item: Item) -> Self {
        Self::new(format!("Writing {item}"), Category::Write)
    }

    #[must_use]
    pub fn dropped(item: Item) -> Self {
        Self::new(format!("Dropping {item}"), Category::Drop)
    }

    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(text, Category::Info)
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }
}

/// Sink for report lines.
///
/// Implementations must be stateless from the caller's point of view: every
/// call carries the full message and its category. Shared between the
/// producer and consumer tasks, hence `Send + Sync`.
pub trait Reporter: Send + Sync {
    fn report(&self, report: &Report);
}
