//! Resume inference: the heuristic engine, the provider abstraction, and the
//! validation boundary every provider's output passes through.

pub mod classify;
pub mod contacts;
pub mod dates;
pub mod heuristic;
pub mod prompts;
pub mod provider;
pub mod schema;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

pub use provider::{build_provider, ResumeProvider};

#[cfg(test)]
pub use provider::HeuristicProvider;

/// The two notions of "now" a parse depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseClock {
    /// Resolves "Present" / "Current" in date ranges.
    pub today: NaiveDate,
    /// Stamped into `metadata.parsed_at`.
    pub now: DateTime<Utc>,
}

impl ParseClock {
    pub fn system() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            today: now.date_naive(),
            now,
        }
    }

    /// RFC 3339, microsecond precision, `Z` suffix.
    pub fn timestamp(&self) -> String {
        self.now.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}
