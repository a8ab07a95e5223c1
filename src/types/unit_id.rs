// ABOUTME: Identifier for a logical deployable unit.
// ABOUTME: Lowercase alphanumeric plus hyphen, bounded length.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UnitIdError {
    #[error("unit id cannot be empty")]
    Empty,

    #[error("unit id exceeds maximum length of 64 characters")]
    TooLong,

    #[error("unit id must be lowercase alphanumeric or '-': '{0}'")]
    InvalidChar(char),
}

/// The caller-facing name of a deployable unit (`backend`, `monitoring`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(String);

impl UnitId {
    pub fn new(value: &str) -> Result<Self, UnitIdError> {
        if value.is_empty() {
            return Err(UnitIdError::Empty);
        }
        if value.len() > 64 {
            return Err(UnitIdError::TooLong);
        }
        if let Some(c) = value
            .chars()
            .find(|c| !c.is_ascii_lowercase() && !c.is_ascii_digit() && *c != '-')
        {
            return Err(UnitIdError::InvalidChar(c));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for UnitId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        UnitId::new(&raw).map_err(serde::de::Error::custom)
    }
}
