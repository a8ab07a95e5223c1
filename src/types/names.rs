// ABOUTME: Validated names for swarm services and stacks.
// ABOUTME: Both follow the engine's name charset; stacks also name volumes and networks.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

// Swarm accepts [a-zA-Z0-9][a-zA-Z0-9_.-]* for service and stack names.
fn check_engine_name(value: &str) -> Result<(), NameFault> {
    let mut chars = value.chars();
    match chars.next() {
        None => return Err(NameFault::Empty),
        Some(c) if !c.is_ascii_alphanumeric() => return Err(NameFault::BadStart(c)),
        Some(_) => {}
    }
    for c in chars {
        if !c.is_ascii_alphanumeric() && c != '_' && c != '.' && c != '-' {
            return Err(NameFault::InvalidChar(c));
        }
    }
    if value.len() > 63 {
        return Err(NameFault::TooLong);
    }
    Ok(())
}

enum NameFault {
    Empty,
    TooLong,
    BadStart(char),
    InvalidChar(char),
}

#[derive(Debug, Error)]
pub enum ServiceNameError {
    #[error("service name cannot be empty")]
    Empty,

    #[error("service name exceeds maximum length of 63 characters")]
    TooLong,

    #[error("service name must start with an alphanumeric character, got '{0}'")]
    BadStart(char),

    #[error("invalid character in service name: '{0}'")]
    InvalidChar(char),
}

/// The cluster-side name of a running service, e.g. `rmw_backend`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceName(String);

impl ServiceName {
    pub fn new(value: &str) -> Result<Self, ServiceNameError> {
        check_engine_name(value).map_err(|fault| match fault {
            NameFault::Empty => ServiceNameError::Empty,
            NameFault::TooLong => ServiceNameError::TooLong,
            NameFault::BadStart(c) => ServiceNameError::BadStart(c),
            NameFault::InvalidChar(c) => ServiceNameError::InvalidChar(c),
        })?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for ServiceName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ServiceName::new(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Error)]
pub enum StackNameError {
    #[error("stack name cannot be empty")]
    Empty,

    #[error("stack name exceeds maximum length of 63 characters")]
    TooLong,

    #[error("stack name must start with an alphanumeric character, got '{0}'")]
    BadStart(char),

    #[error("invalid character in stack name: '{0}'")]
    InvalidChar(char),
}

/// The name under which a group of services is deployed and removed
/// together. The engine prefixes volumes and networks it creates for the
/// stack with this name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StackName(String);

impl StackName {
    pub fn new(value: &str) -> Result<Self, StackNameError> {
        check_engine_name(value).map_err(|fault| match fault {
            NameFault::Empty => StackNameError::Empty,
            NameFault::TooLong => StackNameError::TooLong,
            NameFault::BadStart(c) => StackNameError::BadStart(c),
            NameFault::InvalidChar(c) => StackNameError::InvalidChar(c),
        })?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StackName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for StackName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        StackName::new(&raw).map_err(serde::de::Error::custom)
    }
}
