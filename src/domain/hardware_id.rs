// Copyright (c) 2025 - Cowboy AI, Inc.
//! Hardware Identifier Value Object

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Hardware identifier validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HardwareIdError {
    #[error("Hardware id is empty")]
    Empty,

    #[error("Hardware id exceeds maximum length of 128 characters: {0}")]
    TooLong(usize),

    #[error("Hardware id must have at least three '-' separated segments: {0}")]
    TooFewSegments(String),

    #[error("Empty segment in hardware id: {0}")]
    EmptySegment(String),

    #[error("Invalid character in hardware id segment: {0}")]
    InvalidCharacter(char),
}

/// Externally derived hardware identifier
///
/// A hardware id is computed from the physical device (e.g. from
/// manufacturer, model and serial number) and is globally unique when
/// present. Invariants:
/// - Total length ≤ 128 characters
/// - At least three segments joined by `-`
/// - Segments contain only alphanumerics and underscores
///
/// # Examples
///
/// ```rust
/// use device_ledger::domain::HardwareId;
///
/// let hid = HardwareId::new("XPS13-9333-1234").unwrap();
/// assert_eq!(hid.as_str(), "XPS13-9333-1234");
///
/// assert!(HardwareId::new("").is_err());
/// assert!(HardwareId::new("one-two").is_err());
/// assert!(HardwareId::new("bad char-two-three").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HardwareId(String);

impl HardwareId {
    /// Maximum total length
    pub const MAX_LENGTH: usize = 128;

    /// Minimum number of `-` separated segments
    pub const MIN_SEGMENTS: usize = 3;

    /// Create a new hardware id with validation
    pub fn new(value: impl Into<String>) -> Result<Self, HardwareIdError> {
        let value = value.into();

        if value.is_empty() {
            return Err(HardwareIdError::Empty);
        }

        if value.len() > Self::MAX_LENGTH {
            return Err(HardwareIdError::TooLong(value.len()));
        }

        let segments: Vec<&str> = value.split('-').collect();
        if segments.len() < Self::MIN_SEGMENTS {
            return Err(HardwareIdError::TooFewSegments(value));
        }

        for segment in &segments {
            if segment.is_empty() {
                return Err(HardwareIdError::EmptySegment(value.clone()));
            }
            for ch in segment.chars() {
                if !ch.is_ascii_alphanumeric() && ch != '_' {
                    return Err(HardwareIdError::InvalidCharacter(ch));
                }
            }
        }

        Ok(Self(value))
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HardwareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for HardwareId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for HardwareId {
    type Error = HardwareIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for HardwareId {
    type Error = HardwareIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
