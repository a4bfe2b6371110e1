//! Record identity using prefixed ULIDs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use thiserror::Error;
use ulid::{Generator, Ulid};

/// Prefix shared by every paint can id
pub const RECORD_PREFIX: &str = "BOTE";

/// Monotonic within the process, so ids minted in the same millisecond
/// still sort in creation order
static GENERATOR: Mutex<Generator> = Mutex::new(Generator::new());

/// A store-assigned record identifier (`BOTE-<ULID>`)
///
/// ULIDs are lexicographically ordered by creation time, so sorting ids
/// yields insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId {
    ulid: Ulid,
}

impl RecordId {
    /// Generate a fresh id
    pub fn new() -> Self {
        let ulid = GENERATOR
            .lock()
            .ok()
            .and_then(|mut generator| generator.generate().ok())
            .unwrap_or_else(Ulid::new);
        Self { ulid }
    }

    /// Create a RecordId from an existing ULID
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self { ulid }
    }

    /// Get the ULID component
    pub fn ulid(&self) -> Ulid {
        self.ulid
    }

    /// Parse a RecordId from a string
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", RECORD_PREFIX, self.ulid)
    }
}

impl FromStr for RecordId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, ulid_str) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingDelimiter(s.to_string()))?;

        if !prefix.eq_ignore_ascii_case(RECORD_PREFIX) {
            return Err(IdParseError::InvalidPrefix(prefix.to_string()));
        }

        let ulid = Ulid::from_string(ulid_str)
            .map_err(|e| IdParseError::InvalidUlid(ulid_str.to_string(), e.to_string()))?;

        Ok(Self { ulid })
    }
}

impl Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing record ids
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("invalid record prefix: '{0}' (expected BOTE)")]
    InvalidPrefix(String),

    #[error("missing '-' delimiter in record ID: '{0}'")]
    MissingDelimiter(String),

    #[error("invalid ULID '{0}': {1}")]
    InvalidUlid(String, String),
}
