//! Full-queue policy and strategy selection enums.
//!
//! All three enums parse from the short, case-insensitive names used in the
//! config file and environment overrides. Deserialization goes through the
//! same `parse` so aliases behave identically everywhere.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumKind {
    FullPolicy,
    Producer,
    Consumer,
}

impl EnumKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EnumKind::FullPolicy => "full policy",
            EnumKind::Producer => "producer strategy",
            EnumKind::Consumer => "consumer strategy",
        }
    }
}

impl fmt::Display for EnumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} value '{raw}'; expected one of: {expected:?}")]
pub struct EnumParseError {
    kind: EnumKind,
    raw: String,
    expected: &'static [&'static str],
}

impl EnumParseError {
    #[must_use]
    pub fn new(kind: EnumKind, raw: impl Into<String>, expected: &'static [&'static str]) -> Self {
        Self {
            kind,
            raw: raw.into(),
            expected,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> EnumKind {
        self.kind
    }

    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub const fn expected(&self) -> &'static [&'static str] {
        self.expected
    }
}

fn deserialize_parsed<'de, D, T>(
    deserializer: D,
    parse: fn(&str) -> Result<T, EnumParseError>,
) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(D::Error::custom)
}

// ── FullPolicy ───────────────────────────────────────────────

const FULL_POLICY_PARSE_VALUES: &[&str] = &["wait", "block", "drop-write", "drop"];

/// What a bounded channel does with a write when its buffer is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FullPolicy {
    /// The writer suspends until there is room. Nothing is ever lost.
    #[default]
    Wait,
    /// The writer never suspends; the newest item is discarded.
    DropWrite,
}

impl FullPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FullPolicy::Wait => "wait",
            FullPolicy::DropWrite => "drop-write",
        }
    }

    pub fn parse(s: &str) -> Result<Self, EnumParseError> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "wait" | "block" => Ok(FullPolicy::Wait),
            "drop-write" | "drop_write" | "dropwrite" | "drop" => Ok(FullPolicy::DropWrite),
            _ => Err(EnumParseError::new(
                EnumKind::FullPolicy,
                trimmed,
                FULL_POLICY_PARSE_VALUES,
            )),
        }
    }
}

impl fmt::Display for FullPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FullPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_parsed(deserializer, Self::parse)
    }
}

// ── ProducerKind ─────────────────────────────────────────────

const PRODUCER_PARSE_VALUES: &[&str] = &[
    "try-write",
    "try",
    "blocking-write",
    "blocking",
    "probe-then-write",
    "probe",
];

/// Producer strategy selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProducerKind {
    /// Non-suspending insert; a full buffer is reported as a drop.
    #[default]
    TryWrite,
    /// Suspending insert; may close the channel after a threshold item.
    BlockingWrite,
    /// Wait for capacity, then insert without suspending.
    ProbeThenWrite,
}

impl ProducerKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ProducerKind::TryWrite => "try-write",
            ProducerKind::BlockingWrite => "blocking-write",
            ProducerKind::ProbeThenWrite => "probe-then-write",
        }
    }

    /// First value in the sequence this producer emits.
    #[must_use]
    pub const fn first_item(self) -> u64 {
        match self {
            ProducerKind::ProbeThenWrite => 1,
            ProducerKind::TryWrite | ProducerKind::BlockingWrite => 0,
        }
    }

    /// Whether a configured close threshold applies to this producer.
    ///
    /// `TryWrite` runs until the channel is closed from outside.
    #[must_use]
    pub const fn honours_close_after(self) -> bool {
        !matches!(self, ProducerKind::TryWrite)
    }

    pub fn parse(s: &str) -> Result<Self, EnumParseError> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "try-write" | "try_write" | "trywrite" | "try" => Ok(ProducerKind::TryWrite),
            "blocking-write" | "blocking_write" | "blockingwrite" | "blocking" => {
                Ok(ProducerKind::BlockingWrite)
            }
            "probe-then-write" | "probe_then_write" | "probethenwrite" | "probe" => {
                Ok(ProducerKind::ProbeThenWrite)
            }
            _ => Err(EnumParseError::new(
                EnumKind::Producer,
                trimmed,
                PRODUCER_PARSE_VALUES,
            )),
        }
    }
}

impl fmt::Display for ProducerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProducerKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_parsed(deserializer, Self::parse)
    }
}

// ── ConsumerKind ─────────────────────────────────────────────

const CONSUMER_PARSE_VALUES: &[&str] = &["blocking-read", "blocking", "probe-then-read", "probe"];

/// Consumer strategy selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConsumerKind {
    /// Suspending read; end of stream arrives as a closed error.
    #[default]
    BlockingRead,
    /// Wait for an item, then read without suspending. Never errors on close.
    ProbeThenRead,
}

impl ConsumerKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ConsumerKind::BlockingRead => "blocking-read",
            ConsumerKind::ProbeThenRead => "probe-then-read",
        }
    }

    pub fn parse(s: &str) -> Result<Self, EnumParseError> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "blocking-read" | "blocking_read" | "blockingread" | "blocking" => {
                Ok(ConsumerKind::BlockingRead)
            }
            "probe-then-read" | "probe_then_read" | "probethenread" | "probe" => {
                Ok(ConsumerKind::ProbeThenRead)
            }
            _ => Err(EnumParseError::new(
                EnumKind::Consumer,
                trimmed,
                CONSUMER_PARSE_VALUES,
            )),
        }
    }
}

impl fmt::Display for ConsumerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ConsumerKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_parsed(deserializer, Self::parse)
    }
}
