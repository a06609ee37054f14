use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a completed game.
///
/// The id is the completion timestamp in epoch milliseconds. Its string form is the
/// round-trip key used by history lookups (e.g. a detail route parameter).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameRecordId(i64);

impl GameRecordId {
    /// Creates a new `GameRecordId` from epoch milliseconds.
    #[must_use]
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    /// Derives the id from a completion timestamp.
    #[must_use]
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self(at.timestamp_millis())
    }
}

impl fmt::Debug for GameRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GameRecordId({})", self.0)
    }
}

impl fmt::Display for GameRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    raw: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse GameRecordId from {:?}", self.raw)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for GameRecordId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(GameRecordId::new)
            .map_err(|_| ParseIdError { raw: s.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn string_form_round_trips() {
        let id = GameRecordId::from_timestamp(fixed_now());
        let parsed: GameRecordId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(id.to_string(), "1700000000000");
    }

    #[test]
    fn rejects_non_numeric_keys() {
        assert!("abc".parse::<GameRecordId>().is_err());
        assert!("".parse::<GameRecordId>().is_err());
    }
}
