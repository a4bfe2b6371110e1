//! Paint can entity type

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::color::ColorHex;
use crate::core::identity::RecordId;

/// Largest remaining-quantity value
pub const PERCENT_MAX: u8 = 100;

/// Granularity of the remaining-quantity value
pub const PERCENT_STEP: u8 = 5;

/// Whether the paint has been mixed with water
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixState {
    Pure,
    Diluted,
}

impl std::fmt::Display for MixState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MixState::Pure => write!(f, "pure"),
            MixState::Diluted => write!(f, "mixed"),
        }
    }
}

/// Content of a paint can record, everything except the store id
///
/// Every field has a default so that incomplete documents still load:
/// a missing `mixed` reads as pure, a missing `percent` as empty, and a
/// missing `color` as the neutral gray.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paint {
    /// Display name
    #[serde(default)]
    pub name: String,

    /// Manufacturer / reference code
    #[serde(default)]
    pub code: String,

    /// Display color; an unreadable stored value loads as the neutral gray
    #[serde(default, deserialize_with = "stored_color")]
    pub color: ColorHex,

    /// Mixed with water
    #[serde(default)]
    pub mixed: bool,

    /// Remaining quantity, 0-100
    #[serde(default)]
    pub percent: u8,
}

impl Paint {
    pub fn new(name: impl Into<String>, code: impl Into<String>, color: ColorHex) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            color,
            mixed: false,
            percent: PERCENT_MAX,
        }
    }

    pub fn with_mixed(mut self, mixed: bool) -> Self {
        self.mixed = mixed;
        self
    }

    pub fn with_percent(mut self, percent: u8) -> Self {
        self.percent = percent;
        self
    }

    pub fn mix_state(&self) -> MixState {
        if self.mixed {
            MixState::Diluted
        } else {
            MixState::Pure
        }
    }

    /// Check the fields a new or replaced record must satisfy
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.name.trim().is_empty() {
            return Err(RecordError::EmptyName);
        }
        if self.code.trim().is_empty() {
            return Err(RecordError::EmptyCode);
        }
        check_percent(u32::from(self.percent))?;
        Ok(())
    }
}

/// Read a stored color without rejecting the whole record
fn stored_color<'de, D>(deserializer: D) -> Result<ColorHex, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stored {
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    match Stored::deserialize(deserializer)? {
        Stored::Text(text) => Ok(text.parse().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "unreadable stored color, using neutral");
            ColorHex::NEUTRAL
        })),
        Stored::Other(_) => {
            tracing::warn!("stored color is not a string, using neutral");
            Ok(ColorHex::NEUTRAL)
        }
    }
}

/// A persisted paint can
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaintCan {
    /// Store-assigned identifier
    pub id: RecordId,

    #[serde(flatten)]
    pub paint: Paint,
}

impl PaintCan {
    pub fn new(id: RecordId, paint: Paint) -> Self {
        Self { id, paint }
    }
}

/// Validate a remaining-quantity value: 0-100 in steps of 5
pub fn check_percent(value: u32) -> Result<u8, RecordError> {
    if value > u32::from(PERCENT_MAX) {
        return Err(RecordError::PercentOutOfRange(value));
    }
    if value % u32::from(PERCENT_STEP) != 0 {
        return Err(RecordError::PercentStep(value));
    }
    Ok(value as u8)
}

/// Reasons a record is rejected before it reaches the store
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("code must not be empty")]
    EmptyCode,

    #[error("percent {0} is out of range (0-100)")]
    PercentOutOfRange(u32),

    #[error("percent {0} is not a multiple of 5")]
    PercentStep(u32),
}
